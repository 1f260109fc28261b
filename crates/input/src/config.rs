//! Declarative configuration for an [`Input`] wired with the built-in parsers.
//!
//! ```
//! # use bytes::Bytes;
//! # use http_body_util::Full;
//! use micro_input::InputConfig;
//!
//! let config = InputConfig::from_json_str(r#"{
//!     "default": "application/octet-stream",
//!     "parsers": [
//!         { "media_type": "application/json", "parser": "json" },
//!         { "media_type": "application/octet-stream", "parser": "bytes" }
//!     ]
//! }"#).unwrap();
//!
//! let input = config.into_input::<Full<Bytes>>().unwrap();
//! assert_eq!(input.registry().len(), 2);
//! ```

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use bytes::Bytes;
use http_body::Body;
use serde::Deserialize;

use crate::dispatcher::Input;
use crate::error::{BoxError, BuildError};
use crate::media_type::MediaParams;
use crate::parser::{BodyParser, SharedParser, fn_parser};
use crate::parsers;

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct InputConfig {
    /// Publish a deferred body instead of parsing during dispatch.
    pub deferred: bool,

    /// Accept any `charset` parameter.
    pub any_charset: bool,

    /// Compare parameter values case-sensitively.
    pub strict_parameters: bool,

    /// Media type key of the parser used when nothing matches.
    pub default: Option<String>,

    /// Registrations, in declaration order.
    pub parsers: Vec<ParserEntry>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ParserEntry {
    pub media_type: String,
    pub parser: String,
}

impl InputConfig {
    pub fn from_json_str(json: &str) -> Result<Self, BuildError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Builds an [`Input`] for bodies of type `B`.
    ///
    /// # Errors
    ///
    /// [`BuildError::InvalidParser`] for a parser name that is not a built-in, plus every error
    /// [`InputBuilder::build`](crate::InputBuilder::build) reports.
    pub fn into_input<B>(self) -> Result<Input<B, ParsedBody>, BuildError>
    where
        B: Body<Data = Bytes> + Send + 'static,
        B::Error: Into<BoxError>,
    {
        let mut builder = Input::<B, ParsedBody>::builder()
            .deferred(self.deferred)
            .any_charset(self.any_charset)
            .strict_parameters(self.strict_parameters);

        for entry in self.parsers {
            let parser = entry.parser.parse::<BuiltinParser>()?;
            builder = builder.shared_parser(entry.media_type, parser.into_parser());
        }

        if let Some(name) = self.default {
            builder = builder.default_named(name);
        }

        builder.build()
    }
}

/// The parsers an [`InputConfig`] can refer to by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinParser {
    Bytes,
    Text,
    Json,
    Form,
    Chunks,
}

impl BuiltinParser {
    pub fn name(self) -> &'static str {
        match self {
            BuiltinParser::Bytes => "bytes",
            BuiltinParser::Text => "text",
            BuiltinParser::Json => "json",
            BuiltinParser::Form => "form",
            BuiltinParser::Chunks => "chunks",
        }
    }

    pub fn into_parser<B>(self) -> SharedParser<B, ParsedBody>
    where
        B: Body<Data = Bytes> + Send + 'static,
        B::Error: Into<BoxError>,
    {
        match self {
            BuiltinParser::Bytes => builtin(parsers::bytes::<B>(), ParsedBody::Bytes),
            BuiltinParser::Text => builtin(parsers::text::<B>(), ParsedBody::Text),
            BuiltinParser::Json => builtin(parsers::json::<B, serde_json::Value>(), ParsedBody::Json),
            BuiltinParser::Form => builtin(parsers::form::<B, Vec<(String, String)>>(), ParsedBody::Form),
            BuiltinParser::Chunks => builtin(parsers::chunks::<B>(), ParsedBody::Bytes),
        }
    }
}

impl FromStr for BuiltinParser {
    type Err = BuildError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.to_ascii_lowercase().as_str() {
            "bytes" => Ok(BuiltinParser::Bytes),
            "text" => Ok(BuiltinParser::Text),
            "json" => Ok(BuiltinParser::Json),
            "form" => Ok(BuiltinParser::Form),
            "chunks" => Ok(BuiltinParser::Chunks),
            _ => Err(BuildError::invalid_parser(name)),
        }
    }
}

impl fmt::Display for BuiltinParser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What the built-in parsers produce. A `chunks` parser yields one `Bytes` item per chunk.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedBody {
    Bytes(Bytes),
    Text(String),
    Json(serde_json::Value),
    Form(Vec<(String, String)>),
}

fn builtin<B, V, P>(parser: P, wrap: fn(V) -> ParsedBody) -> SharedParser<B, ParsedBody>
where
    B: 'static,
    V: Send + 'static,
    P: BodyParser<B, V> + 'static,
{
    Arc::new(fn_parser(move |body: B, params: &MediaParams| Ok(parser.parse(body, params)?.map(wrap))))
}
