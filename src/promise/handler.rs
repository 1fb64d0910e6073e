//! Callback capability sets.
//!
//! A component that wants the terminal outcome of a promise implements
//! [`CompletionHandler`]. A component that wants body bytes as they arrive
//! implements [`ChunkHandler`]. A type may implement either or both.

use crate::base::neterror::FailureCause;
use bytes::Bytes;
use std::fmt;
use std::marker::PhantomData;

/// Receives the terminal outcome of a promise. Exactly one method is called,
/// exactly once.
pub trait CompletionHandler<V>: Send {
    fn completed(&mut self, value: &V);

    fn failed(&mut self, cause: &FailureCause);

    fn cancelled(&mut self, force: bool) {
        let _ = force;
    }
}

/// Receives body chunks in arrival order.
pub trait ChunkHandler: Send {
    /// Handle one chunk.
    ///
    /// Returning `true` asks the accumulator to call
    /// [`end_of_stream`](Self::end_of_stream) once the stream ends. Returning
    /// `false` means the handler will signal completion itself. Only the value
    /// returned for the most recent chunk counts.
    fn chunk(&mut self, chunk: Bytes) -> bool;

    fn end_of_stream(&mut self) {}
}

impl<F> ChunkHandler for F
where
    F: FnMut(Bytes) -> bool + Send,
{
    fn chunk(&mut self, chunk: Bytes) -> bool {
        self(chunk)
    }
}

type CompletedFn<V> = Box<dyn FnOnce(&V) + Send>;
type FailedFn = Box<dyn FnOnce(&FailureCause) + Send>;
type CancelledFn = Box<dyn FnOnce(bool) + Send>;

/// A [`CompletionHandler`] assembled from closures.
///
/// Outcomes without a closure are ignored.
///
/// ```rust,ignore
/// future.on_complete(
///     Callbacks::new()
///         .on_completed(|v: &String| println!("got {v}"))
///         .on_failed(|e| eprintln!("failed: {e}")),
/// );
/// ```
pub struct Callbacks<V> {
    completed: Option<CompletedFn<V>>,
    failed: Option<FailedFn>,
    cancelled: Option<CancelledFn>,
}

impl<V> Default for Callbacks<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Callbacks<V> {
    pub fn new() -> Self {
        Self { completed: None, failed: None, cancelled: None }
    }

    pub fn on_completed(mut self, f: impl FnOnce(&V) + Send + 'static) -> Self {
        self.completed = Some(Box::new(f));
        self
    }

    pub fn on_failed(mut self, f: impl FnOnce(&FailureCause) + Send + 'static) -> Self {
        self.failed = Some(Box::new(f));
        self
    }

    pub fn on_cancelled(mut self, f: impl FnOnce(bool) + Send + 'static) -> Self {
        self.cancelled = Some(Box::new(f));
        self
    }
}

impl<V> CompletionHandler<V> for Callbacks<V> {
    fn completed(&mut self, value: &V) {
        if let Some(f) = self.completed.take() {
            f(value);
        }
    }

    fn failed(&mut self, cause: &FailureCause) {
        if let Some(f) = self.failed.take() {
            f(cause);
        }
    }

    fn cancelled(&mut self, force: bool) {
        if let Some(f) = self.cancelled.take() {
            f(force);
        }
    }
}

impl<V> fmt::Debug for Callbacks<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callbacks")
            .field("completed", &self.completed.is_some())
            .field("failed", &self.failed.is_some())
            .field("cancelled", &self.cancelled.is_some())
            .finish()
    }
}

/// Handler that only traces what it receives.
///
/// Useful as a default when a caller does not care about an outcome but
/// still wants it visible in logs.
pub struct LoggingHandler<V> {
    name: &'static str,
    _value: PhantomData<fn(&V)>,
}

impl<V> LoggingHandler<V> {
    pub fn new(name: &'static str) -> Self {
        Self { name, _value: PhantomData }
    }
}

impl<V> Default for LoggingHandler<V> {
    fn default() -> Self {
        Self::new("promise")
    }
}

impl<V: fmt::Debug> CompletionHandler<V> for LoggingHandler<V> {
    fn completed(&mut self, value: &V) {
        tracing::debug!(handler = self.name, value = ?value, "completed");
    }

    fn failed(&mut self, cause: &FailureCause) {
        tracing::error!(handler = self.name, error = %cause, "failed");
    }

    fn cancelled(&mut self, force: bool) {
        tracing::warn!(handler = self.name, force, "cancelled");
    }
}

impl<V> ChunkHandler for LoggingHandler<V> {
    fn chunk(&mut self, chunk: Bytes) -> bool {
        tracing::debug!(handler = self.name, len = chunk.len(), "chunk");
        true
    }

    fn end_of_stream(&mut self) {
        tracing::debug!(handler = self.name, "end of stream");
    }
}
