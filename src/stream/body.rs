//! A streamed body: chunks plus a terminal "fully received" promise.

use crate::base::neterror::{FailureCause, NetError};
use crate::buffer::charset::Charset;
use crate::promise::future::CompletionFuture;
use crate::promise::handler::{ChunkHandler, CompletionHandler};
use crate::promise::sink::CompletionSink;
use crate::promise::promise;
use crate::stream::accumulator::ChunkAccumulator;
use crate::stream::chunks::ChunkStream;
use crate::stream::config::StreamConfig;
use crate::stream::text::TextCollector;
use bytes::Bytes;
use std::error::Error as StdError;
use std::sync::Arc;

/// Create a streamed body with default limits.
pub fn streaming_body<V>() -> (BodySender<V>, StreamingBody<V>) {
    streaming_body_with(StreamConfig::default())
}

/// Create a streamed body with the given limits.
pub fn streaming_body_with<V>(config: StreamConfig) -> (BodySender<V>, StreamingBody<V>) {
    let accumulator = Arc::new(ChunkAccumulator::with_ceiling(config.pending_ceiling));
    let (sink, completion) = promise();
    completion.on_complete(AbortOnSettle { accumulator: Arc::clone(&accumulator) });
    (
        BodySender { accumulator: Arc::clone(&accumulator), sink },
        StreamingBody { accumulator, completion, config },
    )
}

/// Producer face, held by the transport.
///
/// Deliver any number of chunks, then exactly one of `finish`, `fail` or
/// `cancel`. Dropping the sender early cancels the body.
pub struct BodySender<V> {
    accumulator: Arc<ChunkAccumulator>,
    sink: CompletionSink<V>,
}

impl<V> BodySender<V> {
    pub fn deliver(&self, chunk: impl Into<Bytes>) -> Result<(), NetError> {
        self.accumulator.deliver(chunk.into())
    }

    /// End the stream normally and resolve the body with `value`.
    pub fn finish(&self, value: V) -> Result<(), NetError> {
        self.accumulator.close()?;
        self.sink.resolve(value)
    }

    pub fn fail<E>(&self, error: E) -> Result<(), NetError>
    where
        E: StdError + Send + Sync + 'static,
    {
        self.fail_with(Arc::new(error))
    }

    pub fn fail_with(&self, cause: FailureCause) -> Result<(), NetError> {
        // Already closed means a terminal call happened; let the sink report it.
        let _ = self.accumulator.abort();
        self.sink.fail_with(cause)
    }

    pub fn cancel(&self, force: bool) -> Result<(), NetError> {
        let _ = self.accumulator.abort();
        self.sink.cancel(force)
    }

    pub fn is_done(&self) -> bool {
        self.sink.is_done()
    }
}

impl<V> Drop for BodySender<V> {
    fn drop(&mut self) {
        if !self.sink.is_done() {
            let _ = self.accumulator.abort();
        }
    }
}

/// Consumer face.
pub struct StreamingBody<V> {
    accumulator: Arc<ChunkAccumulator>,
    completion: CompletionFuture<V>,
    config: StreamConfig,
}

impl<V> StreamingBody<V> {
    /// Attach the chunk handler. Chunks that already arrived are replayed
    /// first, in order.
    pub fn attach<H>(&self, handler: H) -> Result<(), NetError>
    where
        H: ChunkHandler + 'static,
    {
        self.accumulator.attach(handler)
    }

    /// The "body fully received" signal.
    pub fn completion(&self) -> &CompletionFuture<V> {
        &self.completion
    }

    pub fn on_complete<H>(&self, handler: H) -> &Self
    where
        H: CompletionHandler<V> + 'static,
    {
        self.completion.on_complete(handler);
        self
    }

    pub fn accumulator(&self) -> &ChunkAccumulator {
        &self.accumulator
    }

    /// Collect the body as text. Uses up the chunk handler slot.
    pub fn text(&self, charset: Charset) -> Result<CompletionFuture<String>, NetError> {
        let (sink, text) = promise::<String>();
        let sink = Arc::new(sink);
        self.accumulator.attach(TextCollector::new(
            charset,
            self.config.text_capacity,
            Arc::clone(&sink),
        ))?;
        self.completion.on_complete(FailurePassthrough { sink });
        Ok(text)
    }

    /// Consume the body as an async stream of chunks. Uses up the chunk
    /// handler slot.
    pub fn chunks(&self) -> Result<ChunkStream, NetError> {
        let (stream, chunks, outcome) = ChunkStream::channel();
        self.accumulator.attach(chunks)?;
        self.completion.on_complete(outcome);
        Ok(stream)
    }
}

/// Ends the chunk stream when the body fails or is cancelled from either
/// side, so no chunk is accepted after the terminal outcome.
struct AbortOnSettle {
    accumulator: Arc<ChunkAccumulator>,
}

impl<V> CompletionHandler<V> for AbortOnSettle {
    fn completed(&mut self, _value: &V) {}

    fn failed(&mut self, _cause: &FailureCause) {
        let _ = self.accumulator.abort();
    }

    fn cancelled(&mut self, _force: bool) {
        let _ = self.accumulator.abort();
    }
}

/// Carries a body failure or cancellation over to a derived promise.
/// Success is left to the chunk handler that owns the same sink.
struct FailurePassthrough<T> {
    sink: Arc<CompletionSink<T>>,
}

impl<V, T: Send + Sync> CompletionHandler<V> for FailurePassthrough<T> {
    fn completed(&mut self, _value: &V) {}

    fn failed(&mut self, cause: &FailureCause) {
        let _ = self.sink.fail_with(cause.clone());
    }

    fn cancelled(&mut self, force: bool) {
        let _ = self.sink.cancel(force);
    }
}
