//! The parsed body published on a request.
//!
//! In immediate mode the dispatcher runs the parser and stores either the parsed value or the
//! stream it produced. In deferred mode it stores a [`DeferredBody`] instead, leaving the moment
//! of consumption to the request handler.

mod deferred;

pub use deferred::DeferredBody;
pub use deferred::DeferredOutcome;
pub use deferred::SharedFuture;
pub use deferred::SharedStream;

use std::fmt;

use crate::error::DispatchError;
use crate::media_type::MediaParams;
use crate::parser::{BodyParser, BodyStream, ParseOutcome};

/// The body published on a request by [`Input::dispatch`](crate::Input::dispatch).
///
/// Handlers read it through their request context, e.g. [`RequestContext::body`](crate::RequestContext::body).
///
/// ```
/// use micro_input::RequestBody;
///
/// let body = RequestBody::Value("parsed".to_string());
/// assert_eq!(body.as_value().map(String::as_str), Some("parsed"));
/// assert!(!body.is_deferred());
/// ```
pub enum RequestBody<T> {
    /// The parsed value, or the awaited value of a parser future.
    Value(T),
    /// The stream a parser returned, untouched.
    Stream(BodyStream<T>),
    /// The parser has not run yet, see [`DeferredBody::resolve`].
    Deferred(DeferredBody<T>),
}

impl<T> RequestBody<T> {
    pub fn as_value(&self) -> Option<&T> {
        match self {
            RequestBody::Value(value) => Some(value),
            _ => None,
        }
    }

    pub fn into_value(self) -> Option<T> {
        match self {
            RequestBody::Value(value) => Some(value),
            _ => None,
        }
    }

    pub fn into_stream(self) -> Option<BodyStream<T>> {
        match self {
            RequestBody::Stream(stream) => Some(stream),
            _ => None,
        }
    }

    pub fn as_deferred(&self) -> Option<&DeferredBody<T>> {
        match self {
            RequestBody::Deferred(deferred) => Some(deferred),
            _ => None,
        }
    }

    pub fn is_deferred(&self) -> bool {
        matches!(self, RequestBody::Deferred(_))
    }
}

impl<T: fmt::Debug> fmt::Debug for RequestBody<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestBody::Value(value) => f.debug_tuple("Value").field(value).finish(),
            RequestBody::Stream(_) => f.write_str("Stream(..)"),
            RequestBody::Deferred(deferred) => f.debug_tuple("Deferred").field(deferred).finish(),
        }
    }
}

/// Runs `parser` once and waits for its value if it returned a future.
pub(crate) async fn resolve_now<B, T, P>(
    parser: &P,
    body: B,
    params: &MediaParams,
) -> Result<RequestBody<T>, DispatchError>
where
    P: BodyParser<B, T> + ?Sized,
{
    let body = match parser.parse(body, params).map_err(DispatchError::parser)? {
        ParseOutcome::Value(value) => RequestBody::Value(value),
        ParseOutcome::Stream(stream) => RequestBody::Stream(stream),
        ParseOutcome::Future(future) => RequestBody::Value(future.await.map_err(DispatchError::parser)?),
    };
    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BoxError;
    use crate::parser::fn_parser;
    use futures::{TryStreamExt, stream};

    #[tokio::test]
    async fn value_is_stored() {
        let parser = fn_parser(|body: u32, _params: &MediaParams| Ok(ParseOutcome::value(body + 1)));

        let body = resolve_now(&parser, 41, &MediaParams::new()).await.unwrap();
        assert_eq!(body.as_value(), Some(&42));
    }

    #[tokio::test]
    async fn future_is_awaited() {
        let parser = fn_parser(|body: u32, _params: &MediaParams| {
            Ok(ParseOutcome::future(async move { Ok::<_, BoxError>(body * 2) }))
        });

        let body = resolve_now(&parser, 21, &MediaParams::new()).await.unwrap();
        assert_eq!(body.into_value(), Some(42));
    }

    #[tokio::test]
    async fn stream_is_stored_as_is() {
        let parser = fn_parser(|body: Vec<u32>, _params: &MediaParams| {
            Ok(ParseOutcome::stream(stream::iter(body.into_iter().map(Ok::<_, BoxError>))))
        });

        let body = resolve_now(&parser, vec![1, 2, 3], &MediaParams::new()).await.unwrap();
        let items = body.into_stream().unwrap().try_collect::<Vec<_>>().await.unwrap();
        assert_eq!(items, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn synchronous_failure_propagates() {
        let parser =
            fn_parser(|_body: (), _params: &MediaParams| -> Result<ParseOutcome<()>, BoxError> { Err("bad body".into()) });

        let err = resolve_now(&parser, (), &MediaParams::new()).await.unwrap_err();
        assert!(matches!(err, DispatchError::Parser { .. }));
        assert_eq!(err.to_string(), "body parser failed: bad body");
    }

    #[tokio::test]
    async fn rejected_future_propagates() {
        let parser = fn_parser(|_body: (), _params: &MediaParams| {
            Ok(ParseOutcome::<()>::future(async { Err::<(), BoxError>("truncated".into()) }))
        });

        let err = resolve_now(&parser, (), &MediaParams::new()).await.unwrap_err();
        assert_eq!(err.to_string(), "body parser failed: truncated");
    }
}
