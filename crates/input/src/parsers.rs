//! Ready-made parsers for bodies implementing [`http_body::Body`].
//!
//! Every parser except [`chunks`] buffers the whole body before decoding it.
//!
//! # Example
//! ```
//! # use bytes::Bytes;
//! # use http_body_util::Full;
//! # use serde::Deserialize;
//! use micro_input::{parsers, Input};
//!
//! #[derive(Deserialize, Debug)]
//! struct Params {
//!     name: String,
//!     zip: String,
//! }
//!
//! let input = Input::<Full<Bytes>, Params>::builder()
//!     .parser("application/json", parsers::json::<Full<Bytes>, Params>())
//!     .parser("application/x-www-form-urlencoded", parsers::form::<Full<Bytes>, Params>())
//!     .build()
//!     .unwrap();
//! # let _ = input;
//! ```

use bytes::Bytes;
use http_body::Body;
use http_body_util::BodyExt;
use serde::de::DeserializeOwned;

use crate::error::BoxError;
use crate::media_type::MediaParams;
use crate::parser::{BodyParser, ParseOutcome, fn_parser};

/// Buffers the whole body.
pub async fn collect<B>(body: B) -> Result<Bytes, BoxError>
where
    B: Body<Data = Bytes>,
    B::Error: Into<BoxError>,
{
    Ok(body.collect().await.map_err(Into::<BoxError>::into)?.to_bytes())
}

/// The raw body bytes.
pub fn bytes<B>() -> impl BodyParser<B, Bytes>
where
    B: Body<Data = Bytes> + Send + 'static,
    B::Error: Into<BoxError>,
{
    fn_parser(|body: B, _params: &MediaParams| Ok(ParseOutcome::future(collect(body))))
}

/// The body as text. Only UTF-8 compatible charsets are supported, so the bytes must be valid
/// UTF-8.
pub fn text<B>() -> impl BodyParser<B, String>
where
    B: Body<Data = Bytes> + Send + 'static,
    B::Error: Into<BoxError>,
{
    fn_parser(|body: B, _params: &MediaParams| {
        Ok(ParseOutcome::future(async move {
            let bytes = collect(body).await?;
            String::from_utf8(bytes.into()).map_err(BoxError::from)
        }))
    })
}

/// The body decoded as JSON.
pub fn json<B, V>() -> impl BodyParser<B, V>
where
    B: Body<Data = Bytes> + Send + 'static,
    B::Error: Into<BoxError>,
    V: DeserializeOwned + Send + 'static,
{
    fn_parser(|body: B, _params: &MediaParams| {
        Ok(ParseOutcome::future(async move {
            let bytes = collect(body).await?;
            serde_json::from_slice::<V>(&bytes).map_err(BoxError::from)
        }))
    })
}

/// The body decoded as `application/x-www-form-urlencoded`.
pub fn form<B, V>() -> impl BodyParser<B, V>
where
    B: Body<Data = Bytes> + Send + 'static,
    B::Error: Into<BoxError>,
    V: DeserializeOwned + Send + 'static,
{
    fn_parser(|body: B, _params: &MediaParams| {
        Ok(ParseOutcome::future(async move {
            let bytes = collect(body).await?;
            serde_urlencoded::from_bytes::<V>(&bytes).map_err(BoxError::from)
        }))
    })
}

/// The body data frames as they arrive, without buffering.
pub fn chunks<B>() -> impl BodyParser<B, Bytes>
where
    B: Body<Data = Bytes> + Send + 'static,
    B::Error: Into<BoxError>,
{
    fn_parser(|body: B, _params: &MediaParams| Ok(ParseOutcome::stream(body.into_data_stream())))
}
