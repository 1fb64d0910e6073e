//! Streaming bodies.
//!
//! - [`ChunkAccumulator`]: ordered chunk hand-off to a late-attached handler
//! - [`streaming_body`]: a [`BodySender`] / [`StreamingBody`] pair combining
//!   the accumulator with a completion promise
//! - [`TextCollector`] and [`ChunkStream`]: ready-made body consumers

pub mod accumulator;
pub mod body;
pub mod chunks;
pub mod config;
pub mod text;

pub use accumulator::ChunkAccumulator;
pub use body::{streaming_body, streaming_body_with, BodySender, StreamingBody};
pub use chunks::ChunkStream;
pub use config::StreamConfig;
pub use text::TextCollector;
