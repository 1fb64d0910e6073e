//! Byte buffers with bounded growth.

pub mod capacity;
pub mod charset;
pub mod growable;

pub use capacity::CapacityMode;
pub use charset::Charset;
pub use growable::GrowableBuffer;
