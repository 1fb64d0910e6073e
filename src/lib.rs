//! # netpromise
//!
//! Completion promises and streaming body plumbing for async network clients.
//!
//! A transport thread deposits body chunks and one terminal outcome; any
//! number of consumers register callbacks or wait, before or after the
//! outcome exists, and each callback runs exactly once.
//!
//! ## Features
//!
//! - **Promises**: [`CompletionSink`] / [`CompletionFuture`] pair with
//!   blocking, timed and async waits
//! - **Chunk accumulation**: chunks that arrive before a handler attaches are
//!   replayed in order
//! - **Bounded buffers**: fixed or step-growing byte buffers that report
//!   overflow instead of truncating
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use netpromise::stream::streaming_body;
//! use netpromise::buffer::Charset;
//!
//! let (sender, body) = streaming_body::<u16>();
//! sender.deliver("He")?;
//! sender.deliver("llo")?;
//!
//! let text = body.text(Charset::Utf8)?;
//! sender.finish(200)?;
//! assert_eq!(text.wait()?, "Hello");
//! ```
//!
//! ## Modules
//!
//! - [`base`] - Error type and promise states
//! - [`buffer`] - Growable byte buffers and charsets
//! - [`promise`] - The completion primitive and handler capabilities
//! - [`stream`] - Chunk accumulation and streamed bodies

pub mod base;
pub mod buffer;
pub mod promise;
pub mod stream;

pub use base::{FailureCause, NetError, PromiseState};
pub use buffer::{CapacityMode, Charset, GrowableBuffer};
pub use promise::{
    promise, Callbacks, ChunkHandler, CompletionFuture, CompletionHandler, CompletionSink,
};
pub use stream::{streaming_body, BodySender, ChunkAccumulator, StreamingBody};
