//! Lazily parsed request bodies.
//!
//! A [`DeferredBody`] holds the parser, the untouched body and the media parameters. The first
//! call to [`DeferredBody::resolve`] runs the parser and memoizes what it produced; every later
//! call, from any clone, returns a handle to that same outcome. The parser therefore runs at
//! most once and the body is read at most once.

use std::fmt;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};
use std::task::{Context, Poll, Waker};

use futures::future::{self, BoxFuture, Shared};
use futures::{FutureExt, Stream, TryFutureExt};
use once_cell::sync::OnceCell;
use tracing::debug;

use crate::error::{BoxError, ParserFailure};
use crate::media_type::MediaParams;
use crate::parser::{BodyStream, ParseOutcome, SharedParser};

/// The memoized value of a deferred body, awaitable from any number of handles.
pub type SharedFuture<T> = Shared<BoxFuture<'static, Result<Arc<T>, ParserFailure>>>;

type PendingParse<T> = Box<dyn FnOnce() -> Result<ParseOutcome<T>, BoxError> + Send>;

/// What a deferred body resolved to.
///
/// A parser that streamed its result stays a stream. Values, futures and synchronous failures
/// all become a [`SharedFuture`].
pub enum DeferredOutcome<T> {
    Future(SharedFuture<T>),
    Stream(SharedStream<T>),
}

impl<T> DeferredOutcome<T> {
    pub fn into_future(self) -> Option<SharedFuture<T>> {
        match self {
            DeferredOutcome::Future(future) => Some(future),
            DeferredOutcome::Stream(_) => None,
        }
    }

    pub fn into_stream(self) -> Option<SharedStream<T>> {
        match self {
            DeferredOutcome::Stream(stream) => Some(stream),
            DeferredOutcome::Future(_) => None,
        }
    }
}

impl<T> Clone for DeferredOutcome<T> {
    fn clone(&self) -> Self {
        match self {
            DeferredOutcome::Future(future) => DeferredOutcome::Future(future.clone()),
            DeferredOutcome::Stream(stream) => DeferredOutcome::Stream(stream.clone()),
        }
    }
}

impl<T> fmt::Debug for DeferredOutcome<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeferredOutcome::Future(_) => f.write_str("Future(..)"),
            DeferredOutcome::Stream(_) => f.write_str("Stream(..)"),
        }
    }
}

/// A parser result stream shared by every handle of a deferred body.
///
/// All handles poll the same underlying stream, so an item is observed by exactly one of them.
/// Handles left pending are woken whenever another handle receives an item.
pub struct SharedStream<T> {
    inner: Arc<Mutex<StreamState<T>>>,
}

struct StreamState<T> {
    stream: BodyStream<T>,
    waiting: Vec<Waker>,
}

impl<T> SharedStream<T> {
    fn new(stream: BodyStream<T>) -> Self {
        Self { inner: Arc::new(Mutex::new(StreamState { stream, waiting: Vec::new() })) }
    }

    /// Whether both handles refer to the same underlying stream.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<T> Clone for SharedStream<T> {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

impl<T> fmt::Debug for SharedStream<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedStream").finish_non_exhaustive()
    }
}

impl<T> Stream for SharedStream<T> {
    type Item = Result<T, BoxError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut state = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        match state.stream.as_mut().poll_next(cx) {
            Poll::Pending => {
                // the inner stream only keeps the last waker it was polled with
                if !state.waiting.iter().any(|waker| waker.will_wake(cx.waker())) {
                    state.waiting.push(cx.waker().clone());
                }
                Poll::Pending
            }
            Poll::Ready(item) => {
                state.waiting.drain(..).for_each(Waker::wake);
                Poll::Ready(item)
            }
        }
    }
}

/// A request body whose parsing is triggered by the request handler.
pub struct DeferredBody<T> {
    inner: Arc<Inner<T>>,
}

struct Inner<T> {
    pending: Mutex<Option<PendingParse<T>>>,
    outcome: OnceCell<DeferredOutcome<T>>,
}

impl<T> DeferredBody<T>
where
    T: Send + Sync + 'static,
{
    pub(crate) fn new<B>(parser: SharedParser<B, T>, body: B, params: MediaParams) -> Self
    where
        B: Send + 'static,
    {
        let pending: PendingParse<T> = Box::new(move || parser.parse(body, &params));
        Self { inner: Arc::new(Inner { pending: Mutex::new(Some(pending)), outcome: OnceCell::new() }) }
    }

    /// Parses the body on the first call and returns the memoized outcome on every call.
    pub fn resolve(&self) -> DeferredOutcome<T> {
        self.inner.outcome.get_or_init(|| self.inner.run()).clone()
    }

    /// Resolves the body and waits for its value.
    ///
    /// A streamed body has no single value and fails with a [`ParserFailure`].
    pub async fn value(&self) -> Result<Arc<T>, ParserFailure> {
        match self.resolve() {
            DeferredOutcome::Future(future) => future.await,
            DeferredOutcome::Stream(_) => Err(ParserFailure::from(BoxError::from("deferred body is a stream"))),
        }
    }

    /// Whether the parser already ran.
    pub fn is_resolved(&self) -> bool {
        self.inner.outcome.get().is_some()
    }
}

impl<T> Inner<T>
where
    T: Send + Sync + 'static,
{
    fn run(&self) -> DeferredOutcome<T> {
        let pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner).take();
        let result = match pending {
            Some(parse) => parse(),
            // only reachable when a previous parse panicked
            None => Err(BoxError::from("request body has been consumed")),
        };

        debug!(ok = result.is_ok(), "resolved deferred body");
        match result {
            Ok(ParseOutcome::Stream(stream)) => DeferredOutcome::Stream(SharedStream::new(stream)),
            Ok(ParseOutcome::Value(value)) => DeferredOutcome::Future(future::ready(Ok(Arc::new(value))).boxed().shared()),
            Ok(ParseOutcome::Future(future)) => {
                DeferredOutcome::Future(future.map_ok(Arc::new).map_err(ParserFailure::from).boxed().shared())
            }
            Err(e) => DeferredOutcome::Future(future::ready(Err(ParserFailure::from(e))).boxed().shared()),
        }
    }
}

impl<T> Clone for DeferredBody<T> {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

impl<T> fmt::Debug for DeferredBody<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeferredBody").field("resolved", &self.inner.outcome.get().is_some()).finish()
    }
}
