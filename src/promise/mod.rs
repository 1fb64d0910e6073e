//! The two-faced completion primitive.
//!
//! [`promise`] creates a [`CompletionSink`] for the producer and a
//! [`CompletionFuture`] for consumers. Consumers may register handlers or
//! wait before or after the producer deposits the outcome; each handler
//! runs exactly once either way.
//!
//! ```rust,ignore
//! let (sink, future) = netpromise::promise::<String>();
//! std::thread::spawn(move || sink.resolve("Hello World!".to_string()));
//! assert_eq!(future.wait_timeout(Duration::from_secs(1))?, "Hello World!");
//! ```

pub mod future;
pub mod handler;
mod shared;
pub mod sink;

pub use future::CompletionFuture;
pub use handler::{Callbacks, ChunkHandler, CompletionHandler, LoggingHandler};
pub use sink::CompletionSink;

use shared::Shared;
use std::sync::Arc;

/// Create a pending promise.
pub fn promise<V>() -> (CompletionSink<V>, CompletionFuture<V>) {
    let shared = Arc::new(Shared::new());
    (CompletionSink::new(Arc::clone(&shared)), CompletionFuture::new(shared))
}

#[cfg(test)]
mod tests;
