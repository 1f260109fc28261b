//! The host side of the dispatcher.
//!
//! The dispatcher does not own requests. It talks to them through [`InputRequest`], which gives
//! it the `Content-Type` header, the single-use body and a slot to publish the parsed body in.
//! [`RequestContext`] is a ready-made implementation on top of [`http::Request`].

use std::fmt;

use http::request::Parts;
use http::{HeaderMap, HeaderValue, Method, Request, Uri, Version};

use crate::body::RequestBody;

/// What the dispatcher needs from a host request.
pub trait InputRequest<B, T> {
    /// The raw `Content-Type` header, if any.
    fn content_type(&self) -> Option<&HeaderValue>;

    /// Takes the request body. Returns `None` once the body has been taken.
    fn take_body(&mut self) -> Option<B>;

    /// Publishes the parsed (or deferred) body.
    fn set_body(&mut self, body: RequestBody<T>);
}

/// A request whose body is parsed by an [`Input`](crate::Input).
///
/// Downstream code reads the published body through [`RequestContext::body`].
pub struct RequestContext<B, T> {
    parts: Parts,
    raw_body: Option<B>,
    body: Option<RequestBody<T>>,
}

impl<B, T> RequestContext<B, T> {
    pub fn new(request: Request<B>) -> Self {
        let (parts, raw_body) = request.into_parts();
        Self { parts, raw_body: Some(raw_body), body: None }
    }

    /// Returns the HTTP method of the request
    pub fn method(&self) -> &Method {
        &self.parts.method
    }

    /// Returns the URI of the request
    pub fn uri(&self) -> &Uri {
        &self.parts.uri
    }

    /// Returns the HTTP version of the request
    pub fn version(&self) -> Version {
        self.parts.version
    }

    /// Returns the HTTP headers of the request
    pub fn headers(&self) -> &HeaderMap {
        &self.parts.headers
    }

    /// The parsed body, once the dispatcher ran.
    pub fn body(&self) -> Option<&RequestBody<T>> {
        self.body.as_ref()
    }

    /// Whether the raw body is still available.
    pub fn has_raw_body(&self) -> bool {
        self.raw_body.is_some()
    }

    /// Consumes the context, returning the request parts and the parsed body.
    pub fn into_parts(self) -> (Parts, Option<RequestBody<T>>) {
        (self.parts, self.body)
    }
}

impl<B, T> From<Request<B>> for RequestContext<B, T> {
    #[inline]
    fn from(request: Request<B>) -> Self {
        Self::new(request)
    }
}

impl<B, T> InputRequest<B, T> for RequestContext<B, T> {
    fn content_type(&self) -> Option<&HeaderValue> {
        self.parts.headers.get(http::header::CONTENT_TYPE)
    }

    fn take_body(&mut self) -> Option<B> {
        self.raw_body.take()
    }

    fn set_body(&mut self, body: RequestBody<T>) {
        self.body = Some(body);
    }
}

impl<B, T: fmt::Debug> fmt::Debug for RequestContext<B, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestContext")
            .field("parts", &self.parts)
            .field("has_raw_body", &self.raw_body.is_some())
            .field("body", &self.body)
            .finish()
    }
}
