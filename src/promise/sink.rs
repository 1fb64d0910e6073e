//! Producer face of a promise.

use crate::base::neterror::{FailureCause, NetError};
use crate::promise::future::CompletionFuture;
use crate::promise::shared::{Outcome, Shared};
use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

/// Deposits the terminal outcome of a promise.
///
/// There is exactly one sink per promise. The first of `resolve`, `fail` or
/// `cancel` wins; later calls return [`NetError::AlreadyCompleted`] and leave
/// the stored outcome alone. Dropping a sink that never completed cancels the
/// promise with `force = false`, so no handler or waiter is left pending.
pub struct CompletionSink<V> {
    shared: Arc<Shared<V>>,
}

impl<V> CompletionSink<V> {
    pub(crate) fn new(shared: Arc<Shared<V>>) -> Self {
        Self { shared }
    }

    /// Deposit a value and notify every registered handler.
    pub fn resolve(&self, value: V) -> Result<(), NetError> {
        self.shared.complete(Outcome::Resolved(value))
    }

    /// Deposit a failure.
    pub fn fail<E>(&self, error: E) -> Result<(), NetError>
    where
        E: StdError + Send + Sync + 'static,
    {
        self.fail_with(Arc::new(error))
    }

    /// Deposit an already shared failure cause.
    pub fn fail_with(&self, cause: FailureCause) -> Result<(), NetError> {
        self.shared.complete(Outcome::Failed(cause))
    }

    /// Deposit a cancellation. Fails if the promise already settled.
    pub fn cancel(&self, force: bool) -> Result<(), NetError> {
        self.shared.complete(Outcome::Cancelled { force })
    }

    /// True once the promise has settled either way.
    pub fn is_done(&self) -> bool {
        self.shared.is_done()
    }

    /// A consumer handle for the same promise.
    pub fn future(&self) -> CompletionFuture<V> {
        CompletionFuture::new(Arc::clone(&self.shared))
    }
}

impl<V> Drop for CompletionSink<V> {
    fn drop(&mut self) {
        if self.shared.is_done() {
            return;
        }
        if self.shared.complete(Outcome::Cancelled { force: false }).is_ok() {
            tracing::debug!("sink dropped before completion, promise cancelled");
        }
    }
}

impl<V> fmt::Debug for CompletionSink<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompletionSink").field("state", &self.shared.state()).finish()
    }
}
