//! State shared by the two faces of a promise.

use crate::base::neterror::{FailureCause, NetError};
use crate::base::state::PromiseState;
use crate::promise::handler::CompletionHandler;
use std::sync::{Condvar, Mutex, MutexGuard, OnceLock, PoisonError};
use std::time::Duration;
use tokio::sync::Notify;

/// A terminal outcome.
pub(crate) enum Outcome<V> {
    Resolved(V),
    Failed(FailureCause),
    Cancelled { force: bool },
}

impl<V> Outcome<V> {
    pub(crate) fn state(&self) -> PromiseState {
        match self {
            Outcome::Resolved(_) => PromiseState::Resolved,
            Outcome::Failed(_) => PromiseState::Failed,
            Outcome::Cancelled { .. } => PromiseState::Cancelled,
        }
    }

    fn dispatch(&self, handler: &mut dyn CompletionHandler<V>) {
        match self {
            Outcome::Resolved(value) => handler.completed(value),
            Outcome::Failed(cause) => handler.failed(cause),
            Outcome::Cancelled { force } => handler.cancelled(*force),
        }
    }
}

impl<V: Clone> Outcome<V> {
    pub(crate) fn to_result(&self) -> Result<V, NetError> {
        match self {
            Outcome::Resolved(value) => Ok(value.clone()),
            Outcome::Failed(cause) => Err(NetError::upstream(cause.clone())),
            Outcome::Cancelled { force } => Err(NetError::Cancelled { force: *force }),
        }
    }
}

/// Handlers waiting for the terminal transition.
struct Registry<V> {
    done: bool,
    handlers: Vec<Box<dyn CompletionHandler<V>>>,
}

/// The single promise entity.
///
/// `registry` is the one critical section: the terminal transition and every
/// registration take it, so a handler is either queued before `done` flips
/// or sees `done` and runs against the stored outcome. The outcome itself is
/// written once, under that lock, and read lock-free afterwards, which lets
/// handlers run with the lock released.
pub(crate) struct Shared<V> {
    outcome: OnceLock<Outcome<V>>,
    registry: Mutex<Registry<V>>,
    settled: Condvar,
    notify: Notify,
}

impl<V> Shared<V> {
    pub(crate) fn new() -> Self {
        Self {
            outcome: OnceLock::new(),
            registry: Mutex::new(Registry { done: false, handlers: Vec::new() }),
            settled: Condvar::new(),
            notify: Notify::new(),
        }
    }

    pub(crate) fn with_outcome(outcome: Outcome<V>) -> Self {
        let shared = Self::new();
        let _ = shared.outcome.set(outcome);
        shared.lock().done = true;
        shared
    }

    // Handlers never run under the lock, so poisoning cannot leave the
    // registry half-updated.
    fn lock(&self) -> MutexGuard<'_, Registry<V>> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn outcome(&self) -> Option<&Outcome<V>> {
        self.outcome.get()
    }

    pub(crate) fn state(&self) -> PromiseState {
        self.outcome.get().map_or(PromiseState::Pending, Outcome::state)
    }

    pub(crate) fn is_done(&self) -> bool {
        self.outcome.get().is_some()
    }

    /// Perform the terminal transition, then run every queued handler in
    /// registration order.
    pub(crate) fn complete(&self, outcome: Outcome<V>) -> Result<(), NetError> {
        let state = outcome.state();
        let handlers = {
            let mut registry = self.lock();
            if registry.done || self.outcome.set(outcome).is_err() {
                tracing::trace!(attempted = ?state, "duplicate completion rejected");
                return Err(NetError::AlreadyCompleted);
            }
            registry.done = true;
            std::mem::take(&mut registry.handlers)
        };
        tracing::trace!(state = ?state, handlers = handlers.len(), "promise settled");

        self.settled.notify_all();
        self.notify.notify_waiters();

        if let Some(outcome) = self.outcome.get() {
            for mut handler in handlers {
                outcome.dispatch(handler.as_mut());
            }
        }
        Ok(())
    }

    /// Queue `handler`, or run it right away if the promise has settled.
    pub(crate) fn register<H>(&self, mut handler: H)
    where
        H: CompletionHandler<V> + 'static,
    {
        {
            let mut registry = self.lock();
            if !registry.done {
                registry.handlers.push(Box::new(handler));
                return;
            }
        }
        if let Some(outcome) = self.outcome.get() {
            outcome.dispatch(&mut handler);
        }
    }

    /// Block until settled. Returns `false` if `timeout` elapsed first.
    pub(crate) fn block_until_settled(&self, timeout: Option<Duration>) -> bool {
        let registry = self.lock();
        match timeout {
            Some(timeout) => {
                let (registry, _) = self
                    .settled
                    .wait_timeout_while(registry, timeout, |r| !r.done)
                    .unwrap_or_else(PoisonError::into_inner);
                registry.done
            }
            None => {
                self.settled
                    .wait_while(registry, |r| !r.done)
                    .unwrap_or_else(PoisonError::into_inner)
                    .done
            }
        }
    }

    /// Suspend until settled.
    pub(crate) async fn settled(&self) {
        loop {
            let notified = self.notify.notified();
            tokio::pin!(notified);
            // Register interest before checking, so a completion racing the
            // check still wakes this task.
            notified.as_mut().enable();
            if self.is_done() {
                return;
            }
            notified.await;
        }
    }
}
