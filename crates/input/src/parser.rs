//! The contract between the dispatcher and body parsers.
//!
//! A parser receives the request body and the parameters of the request media type, and either
//! fails right away or returns a [`ParseOutcome`]:
//!
//! - [`ParseOutcome::Value`]: the body was parsed synchronously
//! - [`ParseOutcome::Stream`]: the body is exposed as a stream of parsed items
//! - [`ParseOutcome::Future`]: the parsed body will be available once the future completes

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::stream::BoxStream;
use futures::{FutureExt, Stream, StreamExt, TryFutureExt, TryStreamExt};

use crate::error::BoxError;
use crate::media_type::MediaParams;

/// A stream of parsed items.
pub type BodyStream<T> = BoxStream<'static, Result<T, BoxError>>;

/// A parsed body that is not available yet.
pub type BodyFuture<T> = BoxFuture<'static, Result<T, BoxError>>;

/// A parser shared between the registry and the default slot.
pub type SharedParser<B, T> = Arc<dyn BodyParser<B, T>>;

/// What a parser hands back to the dispatcher.
pub enum ParseOutcome<T> {
    Value(T),
    Stream(BodyStream<T>),
    Future(BodyFuture<T>),
}

impl<T> ParseOutcome<T> {
    pub fn value(value: T) -> Self {
        ParseOutcome::Value(value)
    }

    pub fn stream<S, E>(stream: S) -> Self
    where
        S: Stream<Item = Result<T, E>> + Send + 'static,
        E: Into<BoxError> + 'static,
    {
        ParseOutcome::Stream(stream.map_err(Into::<BoxError>::into).boxed())
    }

    pub fn future<F, E>(future: F) -> Self
    where
        F: Future<Output = Result<T, E>> + Send + 'static,
        E: Into<BoxError> + 'static,
    {
        ParseOutcome::Future(future.map_err(Into::<BoxError>::into).boxed())
    }

    /// Maps the parsed value, whatever shape the outcome has.
    pub fn map<U, F>(self, f: F) -> ParseOutcome<U>
    where
        T: Send + 'static,
        U: Send + 'static,
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        match self {
            ParseOutcome::Value(value) => ParseOutcome::Value(f(value)),
            ParseOutcome::Stream(stream) => ParseOutcome::Stream(stream.map_ok(f).boxed()),
            ParseOutcome::Future(future) => ParseOutcome::Future(future.map_ok(f).boxed()),
        }
    }

    pub fn is_stream(&self) -> bool {
        matches!(self, ParseOutcome::Stream(_))
    }
}

impl<T: fmt::Debug> fmt::Debug for ParseOutcome<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseOutcome::Value(value) => f.debug_tuple("Value").field(value).finish(),
            ParseOutcome::Stream(_) => f.write_str("Stream(..)"),
            ParseOutcome::Future(_) => f.write_str("Future(..)"),
        }
    }
}

/// Parses a request body of type `B` into `T`.
///
/// `parse` is called at most once per request, and owns the body: a body can only be read once.
/// Returning `Err` is a synchronous failure; a failure of a returned future or stream is reported
/// through that future or stream.
pub trait BodyParser<B, T>: Send + Sync {
    fn parse(&self, body: B, params: &MediaParams) -> Result<ParseOutcome<T>, BoxError>;
}

/// a closure holder which represents a [`BodyParser`]
pub struct FnParser<F> {
    f: F,
}

impl<F> fmt::Debug for FnParser<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnParser").finish_non_exhaustive()
    }
}

impl<B, T, F> BodyParser<B, T> for FnParser<F>
where
    F: Fn(B, &MediaParams) -> Result<ParseOutcome<T>, BoxError> + Send + Sync,
{
    #[inline]
    fn parse(&self, body: B, params: &MediaParams) -> Result<ParseOutcome<T>, BoxError> {
        (self.f)(body, params)
    }
}

/// Wraps a closure into a [`BodyParser`].
///
/// ```
/// use micro_input::{fn_parser, MediaParams, ParseOutcome};
///
/// let parser = fn_parser(|body: Vec<u8>, _params: &MediaParams| Ok(ParseOutcome::value(body.len())));
/// # let _ = parser;
/// ```
pub fn fn_parser<B, T, F>(f: F) -> FnParser<F>
where
    F: Fn(B, &MediaParams) -> Result<ParseOutcome<T>, BoxError> + Send + Sync,
{
    FnParser { f }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;

    #[tokio::test]
    async fn map_applies_to_every_shape() {
        let value = ParseOutcome::value(2).map(|v| v * 10);
        assert!(matches!(value, ParseOutcome::Value(20)));

        let future = ParseOutcome::future(async { Ok::<_, BoxError>(3) }).map(|v| v * 10);
        let ParseOutcome::Future(future) = future else { panic!("expected a future") };
        assert_eq!(future.await.unwrap(), 30);

        let stream = ParseOutcome::stream(stream::iter(vec![Ok::<_, BoxError>(1), Ok(2)])).map(|v| v * 10);
        let ParseOutcome::Stream(stream) = stream else { panic!("expected a stream") };
        let items = stream.try_collect::<Vec<_>>().await.unwrap();
        assert_eq!(items, vec![10, 20]);
    }

    #[test]
    fn fn_parser_receives_params() {
        let parser = fn_parser(|body: &'static str, params: &MediaParams| {
            Ok(ParseOutcome::value(format!("{body}:{}", params.get("charset").unwrap_or("none"))))
        });

        let params = MediaParams::from_iter([("charset", "utf-8")]);
        let ParseOutcome::Value(value) = parser.parse("hello", &params).unwrap() else { panic!("expected a value") };
        assert_eq!(value, "hello:utf-8");
    }

    #[test]
    fn fn_parser_failure() {
        let parser = fn_parser(|_body: (), _params: &MediaParams| -> Result<ParseOutcome<()>, BoxError> {
            Err("broken".into())
        });

        let err = parser.parse((), &MediaParams::new()).unwrap_err();
        assert_eq!(err.to_string(), "broken");
    }
}
