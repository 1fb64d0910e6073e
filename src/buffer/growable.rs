//! Single-writer byte buffer with bounded growth.

use crate::base::neterror::NetError;
use crate::buffer::capacity::CapacityMode;
use crate::buffer::charset::Charset;
use bytes::{Bytes, BytesMut};
use std::io;

/// Append-only byte container bounded by a [`CapacityMode`].
///
/// The buffer starts in write mode. [`flip`](Self::flip) switches it to read
/// mode, after which appends fail with [`NetError::ReadOnly`] until
/// [`clear`](Self::clear) or [`drain_to`](Self::drain_to) empties it again.
#[derive(Debug, Clone)]
pub struct GrowableBuffer {
    storage: BytesMut,
    /// Logical capacity, always one of the mode's allocation steps.
    capacity: usize,
    mode: CapacityMode,
    /// Read cursor. Only meaningful in read mode.
    position: usize,
    reading: bool,
}

impl Default for GrowableBuffer {
    fn default() -> Self {
        Self::new(CapacityMode::default())
    }
}

impl GrowableBuffer {
    /// Create an empty buffer. Storage is allocated on first append.
    pub fn new(mode: CapacityMode) -> Self {
        Self { storage: BytesMut::new(), capacity: 0, mode, position: 0, reading: false }
    }

    /// Create a buffer pre-sized to hold at least `at_least` bytes.
    pub fn with_capacity(mode: CapacityMode, at_least: usize) -> Result<Self, NetError> {
        let capacity = mode.capacity_for(at_least)?;
        Ok(Self {
            storage: BytesMut::with_capacity(capacity),
            capacity,
            mode,
            position: 0,
            reading: false,
        })
    }

    /// Create a buffer that never holds more than `max` bytes.
    pub fn fixed(max: usize) -> Self {
        Self::new(CapacityMode::fixed(max))
    }

    /// Create a buffer that grows by `increment` up to `ceiling`.
    pub fn growable(increment: usize, ceiling: usize) -> Self {
        Self::new(CapacityMode::growable(increment, ceiling))
    }

    pub fn mode(&self) -> CapacityMode {
        self.mode
    }

    /// Bytes written so far.
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }

    /// Currently allocated capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Write position in write mode, read cursor in read mode.
    pub fn position(&self) -> usize {
        if self.reading {
            self.position
        } else {
            self.storage.len()
        }
    }

    /// Free allocated space in write mode, unread bytes in read mode.
    pub fn remaining(&self) -> usize {
        if self.reading {
            self.storage.len() - self.position
        } else {
            self.capacity - self.storage.len()
        }
    }

    pub fn is_read_mode(&self) -> bool {
        self.reading
    }

    /// Append `bytes`, growing storage if the mode allows it.
    ///
    /// On failure the buffer content is left untouched.
    pub fn append(&mut self, bytes: &[u8]) -> Result<&mut Self, NetError> {
        if self.reading {
            return Err(NetError::ReadOnly);
        }
        let required = self.storage.len().checked_add(bytes.len()).ok_or(
            NetError::CapacityExceeded { requested: usize::MAX, limit: self.mode.limit() },
        )?;
        if required > self.capacity {
            self.grow(required)?;
        }
        self.storage.extend_from_slice(bytes);
        Ok(self)
    }

    pub fn append_str(&mut self, s: &str) -> Result<&mut Self, NetError> {
        self.append(s.as_bytes())
    }

    pub fn append_byte(&mut self, b: u8) -> Result<&mut Self, NetError> {
        self.append(&[b])
    }

    /// Reallocate to the mode's next step that fits `required`, copying the
    /// existing content across.
    fn grow(&mut self, required: usize) -> Result<(), NetError> {
        let capacity = self.mode.capacity_for(required)?;
        let mut storage = BytesMut::with_capacity(capacity);
        storage.extend_from_slice(&self.storage);
        tracing::trace!(from = self.capacity, to = capacity, "buffer grown");
        self.storage = storage;
        self.capacity = capacity;
        Ok(())
    }

    /// Switch to read mode with the cursor at the start.
    /// Calling it again while in read mode changes nothing.
    pub fn flip(&mut self) -> &mut Self {
        if !self.reading {
            self.reading = true;
            self.position = 0;
        }
        self
    }

    /// Move the read cursor back to the start.
    pub fn rewind(&mut self) -> &mut Self {
        self.position = 0;
        self
    }

    /// Drop all content and return to write mode. Allocated storage is kept.
    pub fn clear(&mut self) -> &mut Self {
        self.storage.clear();
        self.position = 0;
        self.reading = false;
        self
    }

    /// The bytes a reader would see: everything past the cursor in read
    /// mode, all written content in write mode.
    pub fn readable(&self) -> &[u8] {
        if self.reading {
            &self.storage[self.position..]
        } else {
            &self.storage[..]
        }
    }

    /// Copy readable bytes into `dst`, advancing the cursor.
    /// Switches to read mode first if needed.
    pub fn read(&mut self, dst: &mut [u8]) -> usize {
        self.flip();
        let src = self.readable();
        let n = src.len().min(dst.len());
        dst[..n].copy_from_slice(&src[..n]);
        self.position += n;
        n
    }

    /// Decode the readable bytes. `None` when there is nothing to decode.
    pub fn as_text(&self, charset: Charset) -> Option<String> {
        let readable = self.readable();
        if readable.is_empty() {
            None
        } else {
            Some(charset.decode(readable))
        }
    }

    /// Write every readable byte to `sink` and empty the buffer.
    ///
    /// If the sink fails the buffer is left as it was.
    pub fn drain_to<W: io::Write + ?Sized>(&mut self, sink: &mut W) -> io::Result<usize> {
        let readable = self.readable();
        let n = readable.len();
        sink.write_all(readable)?;
        self.clear();
        Ok(n)
    }

    /// Hand the whole written content off as immutable bytes.
    pub fn freeze(self) -> Bytes {
        self.storage.freeze()
    }
}

impl From<GrowableBuffer> for Bytes {
    fn from(buffer: GrowableBuffer) -> Self {
        buffer.freeze()
    }
}

impl io::Write for GrowableBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.append(buf).map_err(io::Error::other)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const HELLO_WORLD: &str = "Hello World!";

    #[test]
    fn test_buffer_as_string() {
        let mut buffer = GrowableBuffer::default();
        buffer.append_str(HELLO_WORLD).unwrap().flip();
        assert_eq!(buffer.as_text(Charset::Utf8).as_deref(), Some(HELLO_WORLD));
    }

    #[test]
    fn test_empty_as_text_is_none() {
        let buffer = GrowableBuffer::default();
        assert_eq!(buffer.as_text(Charset::Utf8), None);
    }

    #[test]
    fn test_expanding_buffer() {
        let mut buffer = GrowableBuffer::default();
        let chunk = vec![7u8; 10_000];
        for _ in 0..3 {
            buffer.append(&chunk).unwrap();
        }
        assert_eq!(buffer.position(), 30_000);
        assert_eq!(buffer.capacity(), 32 * 1024);
    }

    #[test]
    fn test_fixed_buffer_overflow() {
        let mut buffer = GrowableBuffer::fixed(10);
        let err = buffer.append_str(HELLO_WORLD).unwrap_err();
        assert_eq!(err, NetError::CapacityExceeded { requested: 12, limit: 10 });
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_fixed_rollback_keeps_content() {
        let mut buffer = GrowableBuffer::fixed(8);
        buffer.append(b"12345").unwrap();
        assert!(buffer.append(b"6789").is_err());
        assert_eq!(buffer.readable(), b"12345");
        buffer.append(b"678").unwrap();
        assert_eq!(buffer.len(), 8);
    }

    #[test]
    fn test_huge_fixed_max_allocates_on_demand() {
        let mut buffer = GrowableBuffer::fixed(usize::MAX / 2);
        buffer.append(b"x").unwrap();
        assert_eq!(buffer.capacity(), 1);
        buffer.append(b"yz").unwrap();
        assert_eq!(buffer.capacity(), 4);
        assert_eq!(buffer.readable(), b"xyz");
    }

    #[test]
    fn test_flip_is_idempotent() {
        let mut buffer = GrowableBuffer::default();
        buffer.append(b"abc").unwrap();
        buffer.flip();
        let mut one = [0u8; 1];
        assert_eq!(buffer.read(&mut one), 1);
        buffer.flip();
        assert_eq!(buffer.readable(), b"bc");
        buffer.rewind();
        assert_eq!(buffer.readable(), b"abc");
    }

    #[test]
    fn test_append_after_flip_is_read_only() {
        let mut buffer = GrowableBuffer::default();
        buffer.append(b"abc").unwrap();
        buffer.flip();
        assert_eq!(buffer.append(b"d").unwrap_err(), NetError::ReadOnly);
        buffer.clear();
        assert!(buffer.append(b"d").is_ok());
    }

    #[test]
    fn test_drain_to_empties_buffer() {
        let mut buffer = GrowableBuffer::default();
        buffer.append(b"payload").unwrap().flip();
        let mut sink = Vec::new();
        assert_eq!(buffer.drain_to(&mut sink).unwrap(), 7);
        assert_eq!(sink, b"payload");
        assert!(buffer.is_empty());
        assert!(!buffer.is_read_mode());
    }

    #[test]
    fn test_write_impl_reports_capacity() {
        let mut buffer = GrowableBuffer::fixed(4);
        assert!(buffer.write_all(b"abcd").is_ok());
        assert!(buffer.write_all(b"e").is_err());
    }

    #[test]
    fn test_with_capacity_rejects_oversize() {
        assert!(GrowableBuffer::with_capacity(CapacityMode::fixed(4), 5).is_err());
        let buffer = GrowableBuffer::with_capacity(CapacityMode::growable(16, 64), 20).unwrap();
        assert_eq!(buffer.capacity(), 32);
    }

    #[test]
    fn test_freeze() {
        let mut buffer = GrowableBuffer::default();
        buffer.append(b"out").unwrap();
        let bytes: Bytes = buffer.into();
        assert_eq!(&bytes[..], b"out");
    }
}
