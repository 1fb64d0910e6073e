//! Consumer face of a promise.

use crate::base::neterror::{FailureCause, NetError};
use crate::base::state::PromiseState;
use crate::promise::handler::CompletionHandler;
use crate::promise::shared::{Outcome, Shared};
use crate::promise::sink::CompletionSink;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Observes the terminal outcome of a promise.
///
/// Cheap to clone; every clone observes the same promise. Waiting never
/// changes the promise: a timed-out waiter leaves it pending for everyone
/// else.
pub struct CompletionFuture<V> {
    shared: Arc<Shared<V>>,
}

impl<V> Clone for CompletionFuture<V> {
    fn clone(&self) -> Self {
        Self { shared: Arc::clone(&self.shared) }
    }
}

impl<V> CompletionFuture<V> {
    pub(crate) fn new(shared: Arc<Shared<V>>) -> Self {
        Self { shared }
    }

    /// A future that is already resolved with `value`.
    pub fn resolved(value: V) -> Self {
        Self::new(Arc::new(Shared::with_outcome(Outcome::Resolved(value))))
    }

    /// A future that has already failed with `cause`.
    pub fn failed(cause: FailureCause) -> Self {
        Self::new(Arc::new(Shared::with_outcome(Outcome::Failed(cause))))
    }

    /// Register `handler` for the terminal outcome.
    ///
    /// If the promise has already settled the handler runs on the calling
    /// thread before this returns. Otherwise it runs on the thread that
    /// settles the promise, after every handler registered before it.
    pub fn on_complete<H>(&self, handler: H) -> &Self
    where
        H: CompletionHandler<V> + 'static,
    {
        self.shared.register(handler);
        self
    }

    /// Cancel from the consumer side. Fails if the promise already settled.
    pub fn cancel(&self, force: bool) -> Result<(), NetError> {
        self.shared.complete(Outcome::Cancelled { force })
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> PromiseState {
        self.shared.state()
    }

    /// True once the promise has settled either way.
    pub fn is_done(&self) -> bool {
        self.shared.is_done()
    }

    pub fn is_cancelled(&self) -> bool {
        self.shared.state() == PromiseState::Cancelled
    }

    /// Derive a promise whose value is `f` applied to this one's value.
    /// Failure and cancellation pass through unchanged.
    pub fn map<U, F>(&self, f: F) -> CompletionFuture<U>
    where
        F: FnOnce(&V) -> U + Send + 'static,
        U: Send + Sync + 'static,
    {
        let sink = CompletionSink::new(Arc::new(Shared::new()));
        let mapped = sink.future();
        self.on_complete(MapHandler { sink, f: Some(f) });
        mapped
    }
}

impl<V: Clone> CompletionFuture<V> {
    /// The outcome, if there is one, without waiting.
    pub fn try_result(&self) -> Option<Result<V, NetError>> {
        self.shared.outcome().map(Outcome::to_result)
    }

    /// Block the calling thread until the promise settles.
    pub fn wait(&self) -> Result<V, NetError> {
        self.shared.block_until_settled(None);
        self.try_result().unwrap_or(Err(NetError::TimedOut))
    }

    /// Block the calling thread for at most `timeout`.
    pub fn wait_timeout(&self, timeout: Duration) -> Result<V, NetError> {
        if !self.shared.block_until_settled(Some(timeout)) {
            return Err(NetError::TimedOut);
        }
        self.try_result().unwrap_or(Err(NetError::TimedOut))
    }

    /// Suspend the calling task for at most `timeout`.
    pub async fn wait_async(&self, timeout: Duration) -> Result<V, NetError> {
        tokio::time::timeout(timeout, self.shared.settled())
            .await
            .map_err(|_| NetError::TimedOut)?;
        self.try_result().unwrap_or(Err(NetError::TimedOut))
    }
}

impl<V> fmt::Debug for CompletionFuture<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompletionFuture").field("state", &self.shared.state()).finish()
    }
}

struct MapHandler<U, F> {
    sink: CompletionSink<U>,
    f: Option<F>,
}

impl<V, U, F> CompletionHandler<V> for MapHandler<U, F>
where
    F: FnOnce(&V) -> U + Send,
    U: Send + Sync,
{
    fn completed(&mut self, value: &V) {
        if let Some(f) = self.f.take() {
            let _ = self.sink.resolve(f(value));
        }
    }

    fn failed(&mut self, cause: &FailureCause) {
        let _ = self.sink.fail_with(cause.clone());
    }

    fn cancelled(&mut self, force: bool) {
        let _ = self.sink.cancel(force);
    }
}
