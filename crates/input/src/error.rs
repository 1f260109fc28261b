use std::error::Error;
use std::sync::Arc;

use http::header::CONTENT_TYPE;
use http::{HeaderValue, Response, StatusCode};
use thiserror::Error;

/// Error type produced by body parsers.
pub type BoxError = Box<dyn Error + Send + Sync>;

/// Errors raised while configuring an [`Input`](crate::Input). None of them can happen once the
/// dispatcher is built.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("expected at least one input parser to be defined")]
    NoParsers,

    #[error("unknown input parser: {name}")]
    InvalidParser { name: String },

    #[error("invalid media type: {media_type}")]
    MalformedMediaType { media_type: String },

    #[error("duplicate media parameter `{key}` in {media_type}")]
    DuplicateParameter { key: String, media_type: String },

    #[error("duplicate media type: {media_type}")]
    DuplicateDefinition { media_type: String },

    #[error("default parser \"{name}\" is not defined")]
    UnknownDefault { name: String },

    #[error("invalid input config: {source}")]
    Config {
        #[from]
        source: serde_json::Error,
    },
}

impl BuildError {
    pub fn invalid_parser<S: ToString>(name: S) -> Self {
        Self::InvalidParser { name: name.to_string() }
    }

    pub fn malformed_media_type<S: ToString>(media_type: S) -> Self {
        Self::MalformedMediaType { media_type: media_type.to_string() }
    }

    pub fn duplicate_parameter<K: ToString, S: ToString>(key: K, media_type: S) -> Self {
        Self::DuplicateParameter { key: key.to_string(), media_type: media_type.to_string() }
    }

    pub fn duplicate_definition<S: ToString>(media_type: S) -> Self {
        Self::DuplicateDefinition { media_type: media_type.to_string() }
    }

    pub fn unknown_default<S: ToString>(name: S) -> Self {
        Self::UnknownDefault { name: name.to_string() }
    }
}

/// A request refused before any parser ran.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("Malformed Content-Type Header")]
    MalformedContentType,

    #[error("unsupported charset: {charset}")]
    UnsupportedCharset { charset: String },

    #[error("unsupported media type: {media_type}")]
    UnsupportedMediaType { media_type: String },
}

impl Rejection {
    pub fn unsupported_charset<S: ToString>(charset: S) -> Self {
        Self::UnsupportedCharset { charset: charset.to_string() }
    }

    pub fn unsupported_media_type<S: ToString>(media_type: S) -> Self {
        Self::UnsupportedMediaType { media_type: media_type.to_string() }
    }

    /// `400` for a malformed header, `415` for everything else.
    pub fn status(&self) -> StatusCode {
        match self {
            Rejection::MalformedContentType => StatusCode::BAD_REQUEST,
            Rejection::UnsupportedCharset { .. } | Rejection::UnsupportedMediaType { .. } => {
                StatusCode::UNSUPPORTED_MEDIA_TYPE
            }
        }
    }

    /// Converts the rejection into a plain text response.
    ///
    /// A malformed header carries the fixed `Malformed Content-Type Header` message, the `415`
    /// variants only carry the canonical reason phrase.
    pub fn into_response(self) -> Response<String> {
        let status = self.status();
        let body = match self {
            Rejection::MalformedContentType => self.to_string(),
            _ => status.canonical_reason().unwrap_or_default().to_string(),
        };

        let mut response = Response::new(body);
        *response.status_mut() = status;
        if let Ok(content_type) = HeaderValue::from_str(mime::TEXT_PLAIN_UTF_8.as_ref()) {
            response.headers_mut().insert(CONTENT_TYPE, content_type);
        }
        response
    }
}

/// Failure of a single [`Input::dispatch`](crate::Input::dispatch) call.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Rejected(#[from] Rejection),

    #[error("body parser failed: {source}")]
    Parser { source: BoxError },

    #[error("request body has been consumed")]
    BodyConsumed,
}

impl DispatchError {
    pub fn parser<E: Into<BoxError>>(e: E) -> Self {
        Self::Parser { source: e.into() }
    }

    /// Returns the rejection, if the request was refused before parsing.
    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            DispatchError::Rejected(rejection) => Some(rejection),
            _ => None,
        }
    }
}

/// A memoized parser failure, shared by every handle of a deferred body.
#[derive(Debug, Clone, Error)]
#[error("body parser failed: {source}")]
pub struct ParserFailure {
    source: Arc<dyn Error + Send + Sync>,
}

impl ParserFailure {
    pub fn inner(&self) -> &(dyn Error + Send + Sync + 'static) {
        self.source.as_ref()
    }
}

impl From<BoxError> for ParserFailure {
    fn from(e: BoxError) -> Self {
        Self { source: Arc::from(e) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_header_response() {
        let response = Rejection::MalformedContentType.into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(response.body(), "Malformed Content-Type Header");
        assert_eq!(response.headers().get(CONTENT_TYPE).unwrap(), "text/plain; charset=utf-8");
    }

    #[test]
    fn unsupported_responses_are_415() {
        let charset = Rejection::unsupported_charset("iso-8859-1").into_response();
        let media_type = Rejection::unsupported_media_type("text/html").into_response();

        assert_eq!(charset.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert_eq!(media_type.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert_eq!(media_type.body(), "Unsupported Media Type");
        assert_eq!(media_type.headers().get(CONTENT_TYPE).unwrap(), mime::TEXT_PLAIN_UTF_8.as_ref());
    }

    #[test]
    fn parser_failure_keeps_message() {
        let failure = ParserFailure::from(BoxError::from("unexpected end of input"));
        let cloned = failure.clone();

        assert_eq!(cloned.inner().to_string(), "unexpected end of input");
        assert_eq!(failure.to_string(), "body parser failed: unexpected end of input");
    }
}
