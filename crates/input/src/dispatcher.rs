use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::body::{self, DeferredBody, RequestBody};
use crate::charset::CharsetGuard;
use crate::error::{BuildError, DispatchError, Rejection};
use crate::media_type::{MediaType, ParamCase};
use crate::parser::{BodyParser, SharedParser};
use crate::registry::{DefaultParser, Registry};
use crate::request::InputRequest;

/// Selects a body parser from the `Content-Type` of a request and runs it.
///
/// An `Input` is built once and shared by every request: its registry is read-only and cloning
/// it is cheap.
pub struct Input<B, T> {
    registry: Arc<Registry<B, T>>,
    charset_guard: CharsetGuard,
    param_case: ParamCase,
    deferred: bool,
}

impl<B, T> Input<B, T>
where
    B: Send + 'static,
    T: Send + Sync + 'static,
{
    pub fn builder() -> InputBuilder<B, T> {
        InputBuilder::new()
    }

    /// Parses the `Content-Type` of `req`, defaulting to `application/octet-stream`.
    pub fn media_type<R>(&self, req: &R) -> Result<MediaType, Rejection>
    where
        R: InputRequest<B, T>,
    {
        let content_type = req.content_type();
        MediaType::from_content_type(content_type, self.param_case).inspect_err(|_| {
            warn!(content_type = ?content_type, "rejecting malformed content-type header");
        })
    }

    /// Picks the parser for `media_type`, after enforcing the charset policy.
    pub fn select(&self, media_type: &MediaType) -> Result<&SharedParser<B, T>, Rejection> {
        self.charset_guard.check(media_type.charset())?;
        self.registry.select(media_type).ok_or_else(|| {
            warn!(media_type = %media_type, "no input parser for media type");
            Rejection::unsupported_media_type(media_type.essence())
        })
    }

    /// Parses the body of `req` and publishes it through [`InputRequest::set_body`].
    ///
    /// In immediate mode the parser runs right away; if it returns a future, this call waits
    /// for it. In deferred mode a [`DeferredBody`] is published instead and the parser does not
    /// run until the handler resolves it.
    ///
    /// # Errors
    ///
    /// - [`Rejection::MalformedContentType`] (`400`) when the header does not parse
    /// - [`Rejection::UnsupportedCharset`] (`415`) when the charset is not allowed
    /// - [`Rejection::UnsupportedMediaType`] (`415`) when no parser matches and there is no
    ///   default parser
    /// - [`DispatchError::Parser`] when the parser or its future fails
    /// - [`DispatchError::BodyConsumed`] when the body was already taken
    pub async fn dispatch<R>(&self, req: &mut R) -> Result<(), DispatchError>
    where
        R: InputRequest<B, T>,
    {
        let media_type = self.media_type(req)?;
        let parser = Arc::clone(self.select(&media_type)?);
        let raw_body = req.take_body().ok_or(DispatchError::BodyConsumed)?;
        let params = media_type.into_params();

        if self.deferred {
            debug!("installing deferred body");
            req.set_body(RequestBody::Deferred(DeferredBody::new(parser, raw_body, params)));
            return Ok(());
        }

        let parsed = body::resolve_now(&*parser, raw_body, &params).await?;
        req.set_body(parsed);
        Ok(())
    }

    pub fn registry(&self) -> &Registry<B, T> {
        &self.registry
    }

    pub fn is_deferred(&self) -> bool {
        self.deferred
    }
}

impl<B, T> Clone for Input<B, T> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
            charset_guard: self.charset_guard,
            param_case: self.param_case,
            deferred: self.deferred,
        }
    }
}

impl<B, T> fmt::Debug for Input<B, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Input")
            .field("registry", &self.registry)
            .field("charset_guard", &self.charset_guard)
            .field("param_case", &self.param_case)
            .field("deferred", &self.deferred)
            .finish()
    }
}

/// Builder for [`Input`]. Registrations keep their declaration order.
pub struct InputBuilder<B, T> {
    deferred: bool,
    any_charset: bool,
    strict_parameters: bool,
    parsers: Vec<(String, SharedParser<B, T>)>,
    default_parser: Option<DefaultParser<B, T>>,
}

impl<B, T> InputBuilder<B, T>
where
    B: Send + 'static,
    T: Send + Sync + 'static,
{
    fn new() -> Self {
        Self { deferred: false, any_charset: false, strict_parameters: false, parsers: vec![], default_parser: None }
    }

    /// Publish a [`DeferredBody`] instead of parsing during dispatch.
    pub fn deferred(mut self, deferred: bool) -> Self {
        self.deferred = deferred;
        self
    }

    /// Accept any `charset` parameter instead of UTF-8 compatible ones only.
    pub fn any_charset(mut self, any_charset: bool) -> Self {
        self.any_charset = any_charset;
        self
    }

    /// Compare parameter values case-sensitively instead of lowercasing them.
    pub fn strict_parameters(mut self, strict_parameters: bool) -> Self {
        self.strict_parameters = strict_parameters;
        self
    }

    pub fn parser<P>(self, media_type: impl Into<String>, parser: P) -> Self
    where
        P: BodyParser<B, T> + 'static,
    {
        self.shared_parser(media_type, Arc::new(parser))
    }

    pub fn shared_parser(mut self, media_type: impl Into<String>, parser: SharedParser<B, T>) -> Self {
        self.parsers.push((media_type.into(), parser));
        self
    }

    pub fn default_parser<P>(mut self, parser: P) -> Self
    where
        P: BodyParser<B, T> + 'static,
    {
        self.default_parser = Some(DefaultParser::direct(parser));
        self
    }

    /// Falls back to the parser registered under `media_type`.
    pub fn default_named(mut self, media_type: impl Into<String>) -> Self {
        self.default_parser = Some(DefaultParser::named(media_type));
        self
    }

    pub fn build(self) -> Result<Input<B, T>, BuildError> {
        let param_case = ParamCase::from_strict(self.strict_parameters);
        let registry = Registry::build(self.parsers, self.default_parser, param_case)?;
        Ok(Input {
            registry: Arc::new(registry),
            charset_guard: CharsetGuard::new(self.any_charset),
            param_case,
            deferred: self.deferred,
        })
    }
}

impl<B, T> fmt::Debug for InputBuilder<B, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InputBuilder")
            .field("deferred", &self.deferred)
            .field("any_charset", &self.any_charset)
            .field("strict_parameters", &self.strict_parameters)
            .field("parsers", &self.parsers.iter().map(|(media_type, _)| media_type).collect::<Vec<_>>())
            .field("default_parser", &self.default_parser)
            .finish()
    }
}
