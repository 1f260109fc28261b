//! A `Content-Type` driven request body dispatcher
//!
//! This crate picks a body parser for every incoming request from its `Content-Type` header,
//! enforces a charset policy, and runs the parser against the single-use request body, either
//! while dispatching or lazily once the request handler asks for the body.
//!
//! # Features
//!
//! - Exact media type matching with parameter constraints, most specific registration first
//! - Optional default parser for requests nothing else matches
//! - UTF-8 compatible charset guard
//! - Parsers may return a value, a future or a stream
//! - Deferred mode: the parser runs at most once, when the handler resolves the body
//! - Built-in bytes, text, JSON, form and chunk stream parsers
//! - Declarative configuration with serde
//!
//! # Example
//!
//! ```
//! use bytes::Bytes;
//! use http::Request;
//! use http_body_util::Full;
//! use serde::Deserialize;
//! use tracing::{Level, info};
//! use tracing_subscriber::FmtSubscriber;
//! use micro_input::{Input, RequestBody, RequestContext, parsers};
//!
//! #[derive(Deserialize, Debug)]
//! struct Params {
//!     name: String,
//!     zip: String,
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let subscriber = FmtSubscriber::builder().with_max_level(Level::DEBUG).finish();
//!     tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");
//!
//!     let input = Input::<Full<Bytes>, Params>::builder()
//!         .parser("application/json", parsers::json::<Full<Bytes>, Params>())
//!         .parser("application/x-www-form-urlencoded", parsers::form::<Full<Bytes>, Params>())
//!         .build()
//!         .unwrap();
//!
//!     let request = Request::post("/user")
//!         .header(http::header::CONTENT_TYPE, "application/json; charset=utf-8")
//!         .body(Full::new(Bytes::from_static(br#"{"name":"micro","zip":"200000"}"#)))
//!         .unwrap();
//!     let mut ctx = RequestContext::new(request);
//!
//!     match input.dispatch(&mut ctx).await {
//!         Ok(()) => {
//!             let params = ctx.body().and_then(RequestBody::as_value).unwrap();
//!             info!(name = %params.name, zip = %params.zip, "received user");
//!         }
//!         Err(e) => match e.rejection() {
//!             Some(rejection) => println!("{}", rejection.status()),
//!             None => println!("parser failed: {e}"),
//!         },
//!     }
//! }
//! ```
//!
//! # Architecture
//!
//! - [`media_type`]: the media range grammar, for registrations and `Content-Type` headers
//! - [`registry`]: validated registrations ranked by specificity, and parser selection
//! - [`charset`]: the charset guard
//! - [`parser`]: the [`BodyParser`] contract and the [`ParseOutcome`] a parser returns
//! - [`body`]: what gets published on the request, including [`DeferredBody`]
//! - [`request`]: the [`InputRequest`] host contract and [`RequestContext`]
//! - [`parsers`]: ready-made parsers
//! - [`config`]: [`InputConfig`]
//!
//! # Error Handling
//!
//! - [`BuildError`]: configuration errors, all reported by [`InputBuilder::build`]
//! - [`Rejection`]: requests refused before the parser runs, with their HTTP status
//! - [`DispatchError`]: everything [`Input::dispatch`] can fail with
//! - [`ParserFailure`]: a memoized failure of a deferred body
//!
//! # Limitations
//!
//! - No content negotiation: wildcards and quality values are rejected at registration
//! - Only UTF-8 compatible charsets pass the guard unless `any_charset` is set

pub mod body;
pub mod charset;
pub mod config;
pub mod media_type;
pub mod parser;
pub mod parsers;
pub mod registry;
pub mod request;

mod dispatcher;
mod error;
mod utils;

pub use body::{DeferredBody, DeferredOutcome, RequestBody, SharedFuture, SharedStream};
pub use charset::{ALLOWED_CHARSETS, CharsetGuard};
pub use config::{BuiltinParser, InputConfig, ParsedBody, ParserEntry};
pub use dispatcher::{Input, InputBuilder};
pub use error::{BoxError, BuildError, DispatchError, ParserFailure, Rejection};
pub use media_type::{MediaParams, MediaType, MediaTypeDecl, ParamCase};
pub use parser::{BodyFuture, BodyParser, BodyStream, FnParser, ParseOutcome, SharedParser, fn_parser};
pub use registry::{DefaultParser, Definition, Registry};
pub use request::{InputRequest, RequestContext};
