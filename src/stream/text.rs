//! Collect a streamed body as text.

use crate::buffer::capacity::CapacityMode;
use crate::buffer::charset::Charset;
use crate::buffer::growable::GrowableBuffer;
use crate::promise::handler::ChunkHandler;
use crate::promise::sink::CompletionSink;
use std::sync::Arc;

/// Chunk handler that appends every chunk to a [`GrowableBuffer`] and
/// resolves its promise with the decoded text at end of stream.
///
/// Decoding happens once, over the whole body, so multi-byte characters
/// split across chunks decode correctly. An empty body resolves to an empty
/// string. If the body outgrows the buffer the promise fails with
/// [`NetError::CapacityExceeded`](crate::base::NetError::CapacityExceeded)
/// and the rest of the stream is ignored.
pub struct TextCollector {
    buffer: GrowableBuffer,
    charset: Charset,
    sink: Arc<CompletionSink<String>>,
    failed: bool,
}

impl TextCollector {
    pub fn new(
        charset: Charset,
        capacity: CapacityMode,
        sink: Arc<CompletionSink<String>>,
    ) -> Self {
        Self { buffer: GrowableBuffer::new(capacity), charset, sink, failed: false }
    }
}

impl ChunkHandler for TextCollector {
    fn chunk(&mut self, chunk: bytes::Bytes) -> bool {
        if self.failed {
            return false;
        }
        if let Err(e) = self.buffer.append(&chunk) {
            self.failed = true;
            let _ = self.sink.fail(e);
            return false;
        }
        true
    }

    fn end_of_stream(&mut self) {
        let text = self.buffer.flip().as_text(self.charset).unwrap_or_default();
        let _ = self.sink.resolve(text);
    }
}
