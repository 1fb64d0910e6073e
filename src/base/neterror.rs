use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// The cause a producer attaches when it fails a promise.
///
/// Shared so the same cause reaches every handler and every waiter verbatim.
pub type FailureCause = Arc<dyn StdError + Send + Sync + 'static>;

#[derive(Debug, Error, Clone)]
pub enum NetError {
    // Buffer Errors
    #[error("Capacity exceeded: {requested} bytes requested, limit is {limit}")]
    CapacityExceeded { requested: usize, limit: usize },
    #[error("Buffer is read-only")]
    ReadOnly,
    #[error("Invalid capacity configuration")]
    InvalidCapacity,

    // Promise Errors
    #[error("Promise already completed")]
    AlreadyCompleted,
    #[error("Timed out waiting for completion")]
    TimedOut,
    #[error("Promise cancelled (force: {force})")]
    Cancelled { force: bool },
    #[error("Upstream failure: {0}")]
    UpstreamFailure(#[source] UpstreamCause),

    // Stream Errors
    #[error("Chunk handler already attached")]
    AlreadyAttached,
    #[error("Stream already closed")]
    StreamClosed,
}

/// Wrapper that lets a [`FailureCause`] act as an error source.
#[derive(Clone)]
pub struct UpstreamCause(pub FailureCause);

impl fmt::Debug for UpstreamCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

impl fmt::Display for UpstreamCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&*self.0, f)
    }
}

impl StdError for UpstreamCause {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.0.source()
    }
}

impl NetError {
    /// Wrap a producer failure.
    pub fn upstream(cause: FailureCause) -> Self {
        NetError::UpstreamFailure(UpstreamCause(cause))
    }

    /// The producer's cause, if this is an upstream failure.
    pub fn cause(&self) -> Option<&FailureCause> {
        match self {
            NetError::UpstreamFailure(UpstreamCause(cause)) => Some(cause),
            _ => None,
        }
    }

    /// True for the rejected-no-op errors a producer can safely ignore.
    pub fn is_rejection(&self) -> bool {
        matches!(self, NetError::AlreadyCompleted | NetError::AlreadyAttached)
    }

    pub fn as_i32(&self) -> i32 {
        match self {
            NetError::CapacityExceeded { .. } => -100,
            NetError::ReadOnly => -101,
            NetError::InvalidCapacity => -102,
            NetError::AlreadyCompleted => -200,
            NetError::TimedOut => -201,
            NetError::Cancelled { .. } => -202,
            NetError::UpstreamFailure(_) => -203,
            NetError::AlreadyAttached => -300,
            NetError::StreamClosed => -301,
        }
    }
}

impl PartialEq for NetError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (
                NetError::CapacityExceeded { requested: a, limit: b },
                NetError::CapacityExceeded { requested: c, limit: d },
            ) => a == c && b == d,
            (NetError::Cancelled { force: a }, NetError::Cancelled { force: b }) => a == b,
            // Same cause instance, not structural equality.
            (
                NetError::UpstreamFailure(UpstreamCause(a)),
                NetError::UpstreamFailure(UpstreamCause(b)),
            ) => Arc::ptr_eq(a, b),
            _ => self.as_i32() == other.as_i32(),
        }
    }
}
