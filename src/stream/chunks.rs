//! Consume body chunks as an async stream.

use crate::base::neterror::{FailureCause, NetError};
use crate::promise::handler::{ChunkHandler, CompletionHandler};
use bytes::Bytes;
use futures::Stream;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::task::{Context, Poll};
use tokio::sync::mpsc;

type Item = Result<Bytes, NetError>;

/// Async stream of body chunks.
///
/// Yields every chunk in arrival order, then ends. If the body fails or is
/// cancelled the stream yields that error last.
#[derive(Debug)]
pub struct ChunkStream {
    rx: mpsc::UnboundedReceiver<Item>,
}

impl ChunkStream {
    /// Build the stream together with the handlers that feed it: one for the
    /// chunks, one for the body's terminal outcome. Both send through one
    /// slot, so no chunk can follow the terminal error.
    pub(crate) fn channel() -> (Self, ChunkForwarder, OutcomeForwarder) {
        let (tx, rx) = mpsc::unbounded_channel();
        let slot: Slot = Arc::new(Mutex::new(Some(tx)));
        (Self { rx }, ChunkForwarder { slot: Arc::clone(&slot) }, OutcomeForwarder { slot })
    }
}

impl Stream for ChunkStream {
    type Item = Item;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut().rx.poll_recv(cx)
    }
}

/// Shared sender. `None` once the stream has ended.
type Slot = Arc<Mutex<Option<mpsc::UnboundedSender<Item>>>>;

fn lock(slot: &Slot) -> MutexGuard<'_, Option<mpsc::UnboundedSender<Item>>> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

pub(crate) struct ChunkForwarder {
    slot: Slot,
}

impl ChunkHandler for ChunkForwarder {
    fn chunk(&mut self, chunk: Bytes) -> bool {
        if let Some(tx) = lock(&self.slot).as_ref() {
            // A dropped stream just stops listening.
            let _ = tx.send(Ok(chunk));
        }
        true
    }

    fn end_of_stream(&mut self) {
        lock(&self.slot).take();
    }
}

/// Forwards a failed or cancelled outcome into the stream and ends it.
pub(crate) struct OutcomeForwarder {
    slot: Slot,
}

impl OutcomeForwarder {
    fn finish(&self, item: Item) {
        if let Some(tx) = lock(&self.slot).take() {
            let _ = tx.send(item);
        }
    }
}

impl<V> CompletionHandler<V> for OutcomeForwarder {
    fn completed(&mut self, _value: &V) {
        lock(&self.slot).take();
    }

    fn failed(&mut self, cause: &FailureCause) {
        self.finish(Err(NetError::upstream(cause.clone())));
    }

    fn cancelled(&mut self, force: bool) {
        self.finish(Err(NetError::Cancelled { force }));
    }
}
