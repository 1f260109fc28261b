//! Media types as seen by the dispatcher.
//!
//! Two parsing entry points share one grammar (see [`grammar`]):
//!
//! - registration strings, parsed once while building the registry, which must name a concrete
//!   type (no wildcards, no quality parameter)
//! - `Content-Type` header values, parsed for every request
//!
//! Type tokens and parameter keys are always lowercased. Parameter values are lowercased unless
//! the dispatcher was configured with strict parameters, see [`ParamCase`].

pub(crate) mod grammar;

use std::collections::HashMap;
use std::fmt;

use http::HeaderValue;

use crate::error::{BuildError, Rejection};
use crate::utils::ensure;
use grammar::{MediaRange, Origin};

/// How parameter values are normalized.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum ParamCase {
    /// Lowercase every value, the default.
    #[default]
    Fold,
    /// Keep values as written.
    Preserve,
}

impl ParamCase {
    pub fn from_strict(strict_parameters: bool) -> Self {
        if strict_parameters { ParamCase::Preserve } else { ParamCase::Fold }
    }

    #[inline]
    pub(crate) fn apply(self, value: String) -> String {
        match self {
            ParamCase::Fold => value.to_lowercase(),
            ParamCase::Preserve => value,
        }
    }
}

/// Parameters of a request media type. Keys are unique and lowercase.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaParams {
    inner: HashMap<String, String>,
}

impl MediaParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.inner.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str, value: &str) -> bool {
        self.get(key) == Some(value)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.inner.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Sets `key` to `value`, replacing any previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.inner.insert(key.into(), value.into());
    }
}

/// Later occurrences of a key win.
impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MediaParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = MediaParams::new();
        for (key, value) in iter {
            params.insert(key, value);
        }
        params
    }
}

/// A parsed `Content-Type` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaType {
    essence: String,
    params: MediaParams,
}

impl MediaType {
    /// The type assumed for requests without a `Content-Type` header.
    pub fn octet_stream() -> Self {
        Self { essence: mime::APPLICATION_OCTET_STREAM.essence_str().to_string(), params: MediaParams::new() }
    }

    /// Parses a request header value.
    pub fn parse_header(value: &[u8], case: ParamCase) -> Result<Self, Rejection> {
        let MediaRange { essence, params } =
            grammar::parse(value, Origin::Header, case).ok_or(Rejection::MalformedContentType)?;
        Ok(Self { essence, params: params.into_iter().collect() })
    }

    /// Parses the optional `Content-Type` header of a request. An empty header counts as absent.
    pub fn from_content_type(value: Option<&HeaderValue>, case: ParamCase) -> Result<Self, Rejection> {
        match value {
            Some(value) if !value.is_empty() => Self::parse_header(value.as_bytes(), case),
            _ => Ok(Self::octet_stream()),
        }
    }

    /// The lowercase `type/subtype` pair.
    pub fn essence(&self) -> &str {
        &self.essence
    }

    pub fn params(&self) -> &MediaParams {
        &self.params
    }

    pub fn charset(&self) -> Option<&str> {
        self.params.get("charset")
    }

    pub fn into_params(self) -> MediaParams {
        self.params
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.essence)?;
        for (key, value) in self.params.iter() {
            write!(f, "; {key}={value}")?;
        }
        Ok(())
    }
}

/// A media type declared by a parser registration. Parameters keep their declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaTypeDecl {
    essence: String,
    params: Vec<(String, String)>,
}

impl MediaTypeDecl {
    /// Parses a registration string, rejecting wildcards, quality values and repeated
    /// parameter keys.
    pub fn parse(media_type: &str, case: ParamCase) -> Result<Self, BuildError> {
        let MediaRange { essence, params } = grammar::parse(media_type.as_bytes(), Origin::Registration, case)
            .ok_or_else(|| BuildError::malformed_media_type(media_type))?;

        for (i, (key, _)) in params.iter().enumerate() {
            ensure!(!params[..i].iter().any(|(seen, _)| seen == key), BuildError::duplicate_parameter(key, media_type));
        }

        Ok(Self { essence, params })
    }

    pub fn essence(&self) -> &str {
        &self.essence
    }

    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    /// Number of declared parameters. More parameters rank first.
    pub fn specificity(&self) -> usize {
        self.params.len()
    }

    /// Identity of the declaration, independent of parameter order.
    pub(crate) fn identity(&self) -> String {
        let mut pairs = self.params.iter().map(|(k, v)| format!("{k}\r{v}")).collect::<Vec<_>>();
        pairs.sort();
        format!("{}\n{}", self.essence, pairs.join("\n"))
    }

    /// Whether a request media type satisfies this declaration. Request parameters that are
    /// not declared here are ignored.
    pub fn matches(&self, media_type: &MediaType) -> bool {
        self.essence == media_type.essence()
            && self.params.iter().all(|(key, value)| media_type.params().contains(key, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_header_is_octet_stream() {
        let media_type = MediaType::from_content_type(Some(&HeaderValue::from_static("")), ParamCase::Fold).unwrap();

        assert_eq!(media_type, MediaType::octet_stream());
        assert!(media_type.params().is_empty());
    }

    #[test]
    fn missing_header_is_octet_stream() {
        let media_type = MediaType::from_content_type(None, ParamCase::Fold).unwrap();

        assert_eq!(media_type.essence(), "application/octet-stream");
        assert!(media_type.params().is_empty());
        assert_eq!(media_type.charset(), None);
    }

    #[test]
    fn header_params_last_wins() {
        let value = HeaderValue::from_static("text/plain; foo=one; FOO=Two");
        let media_type = MediaType::from_content_type(Some(&value), ParamCase::Fold).unwrap();

        assert_eq!(media_type.params().len(), 1);
        assert_eq!(media_type.params().get("foo"), Some("two"));
    }

    #[test]
    fn malformed_header_is_rejected() {
        let value = HeaderValue::from_static("application/json;;");
        let err = MediaType::from_content_type(Some(&value), ParamCase::Fold).unwrap_err();

        assert_eq!(err, Rejection::MalformedContentType);
        assert_eq!(err.to_string(), "Malformed Content-Type Header");
    }

    #[test]
    fn declaration_rejects_duplicate_keys() {
        let err = MediaTypeDecl::parse("text/plain; a=1; A=2", ParamCase::Fold).unwrap_err();
        assert!(matches!(err, BuildError::DuplicateParameter { ref key, .. } if key == "a"));
    }

    #[test]
    fn declaration_identity_ignores_order() {
        let a = MediaTypeDecl::parse("text/plain; a=1; b=2", ParamCase::Fold).unwrap();
        let b = MediaTypeDecl::parse("Text/Plain;b=2;a=1", ParamCase::Fold).unwrap();
        let c = MediaTypeDecl::parse("text/plain; a=1", ParamCase::Fold).unwrap();

        assert_eq!(a.identity(), b.identity());
        assert_ne!(a.identity(), c.identity());
    }

    #[test]
    fn declaration_matching() {
        let decl = MediaTypeDecl::parse("text/plain; foo=bar", ParamCase::Fold).unwrap();
        let parse = |s: &'static str| MediaType::parse_header(s.as_bytes(), ParamCase::Fold).unwrap();

        assert!(decl.matches(&parse("text/plain; foo=bar")));
        assert!(decl.matches(&parse("TEXT/PLAIN; charset=utf-8; Foo=BAR")));
        assert!(!decl.matches(&parse("text/plain")));
        assert!(!decl.matches(&parse("text/plain; foo=baz")));
        assert!(!decl.matches(&parse("text/html; foo=bar")));
    }

    #[test]
    fn strict_parameters_keep_case() {
        let decl = MediaTypeDecl::parse("text/plain; foo=Bar", ParamCase::Preserve).unwrap();

        let exact = MediaType::parse_header(b"text/plain; foo=Bar", ParamCase::Preserve).unwrap();
        let folded = MediaType::parse_header(b"text/plain; foo=bar", ParamCase::Preserve).unwrap();

        assert!(decl.matches(&exact));
        assert!(!decl.matches(&folded));
    }
}
