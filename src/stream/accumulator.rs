//! Ordered hand-off of body chunks to a late-attached handler.

use crate::base::neterror::NetError;
use crate::promise::handler::ChunkHandler;
use bytes::Bytes;
use std::collections::VecDeque;
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

enum Event {
    Chunk(Bytes),
    /// Stream ended normally.
    End,
    /// Stream ended without a normal end; release the handler.
    Abort,
}

struct State {
    queue: VecDeque<Event>,
    /// Chunk bytes held in `queue`.
    queued_bytes: usize,
    /// Parked handler. `None` while a drainer holds it, or after release.
    handler: Option<Box<dyn ChunkHandler>>,
    attached: bool,
    draining: bool,
    closed: bool,
    /// What the most recent `chunk` call returned.
    auto_complete: bool,
}

/// Buffers chunks until a [`ChunkHandler`] is attached, then replays them in
/// arrival order and forwards every later chunk directly.
///
/// Handlers are called with the internal lock released, by one drainer at a
/// time: whichever call finds work queued and nobody draining takes the
/// handler and runs the queue dry. Concurrent `deliver` calls only enqueue,
/// so arrival order is the order the handler sees, and a handler may call
/// back into the accumulator without deadlocking.
pub struct ChunkAccumulator {
    state: Mutex<State>,
    ceiling: Option<usize>,
}

impl Default for ChunkAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

impl ChunkAccumulator {
    /// Create an accumulator with unbounded pre-attach buffering.
    pub fn new() -> Self {
        Self::with_ceiling(None)
    }

    /// Create an accumulator that refuses to buffer more than `ceiling`
    /// bytes before a handler is attached.
    pub fn with_ceiling(ceiling: Option<usize>) -> Self {
        Self {
            state: Mutex::new(State {
                queue: VecDeque::new(),
                queued_bytes: 0,
                handler: None,
                attached: false,
                draining: false,
                closed: false,
                auto_complete: true,
            }),
            ceiling,
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Hand `chunk` to the handler, or buffer it if none is attached yet.
    pub fn deliver(&self, chunk: Bytes) -> Result<(), NetError> {
        let mut state = self.lock();
        if state.closed {
            return Err(NetError::StreamClosed);
        }
        if !state.attached {
            let requested = state.queued_bytes.saturating_add(chunk.len());
            if let Some(limit) = self.ceiling {
                if requested > limit {
                    return Err(NetError::CapacityExceeded { requested, limit });
                }
            }
            tracing::trace!(len = chunk.len(), buffered = requested, "chunk buffered");
        }
        state.queued_bytes += chunk.len();
        state.queue.push_back(Event::Chunk(chunk));
        self.drain(state);
        Ok(())
    }

    /// Attach the one handler for this stream and replay anything buffered.
    pub fn attach<H>(&self, handler: H) -> Result<(), NetError>
    where
        H: ChunkHandler + 'static,
    {
        let mut state = self.lock();
        if state.attached {
            return Err(NetError::AlreadyAttached);
        }
        state.attached = true;
        state.handler = Some(Box::new(handler));
        tracing::debug!(buffered = state.queue.len(), "chunk handler attached, replaying");
        self.drain(state);
        Ok(())
    }

    /// Mark the end of the stream.
    ///
    /// The handler's `end_of_stream` runs after every chunk, and only if its
    /// most recent `chunk` call returned `true`.
    pub fn close(&self) -> Result<(), NetError> {
        self.finish_with(Event::End)
    }

    /// End the stream abnormally. Buffered chunks are still replayed to a
    /// handler attached later, which is then released without
    /// `end_of_stream`.
    pub fn abort(&self) -> Result<(), NetError> {
        self.finish_with(Event::Abort)
    }

    fn finish_with(&self, event: Event) -> Result<(), NetError> {
        let mut state = self.lock();
        if state.closed {
            return Err(NetError::StreamClosed);
        }
        state.closed = true;
        state.queue.push_back(event);
        self.drain(state);
        Ok(())
    }

    /// Run queued events through the handler unless someone else already is,
    /// or no handler is attached.
    fn drain<'a>(&'a self, mut state: MutexGuard<'a, State>) {
        if state.draining {
            return;
        }
        let Some(mut handler) = state.handler.take() else {
            return;
        };
        state.draining = true;
        let mut guard = DrainGuard { accumulator: self, armed: true };

        let released = loop {
            let Some(event) = state.queue.pop_front() else {
                break false;
            };
            match event {
                Event::Chunk(chunk) => {
                    state.queued_bytes -= chunk.len();
                    drop(state);
                    let auto_complete = handler.chunk(chunk);
                    state = self.lock();
                    state.auto_complete = auto_complete;
                }
                Event::End => {
                    let auto_complete = state.auto_complete;
                    drop(state);
                    if auto_complete {
                        handler.end_of_stream();
                    }
                    state = self.lock();
                    break true;
                }
                Event::Abort => break true,
            }
        };

        guard.armed = false;
        state.draining = false;
        if released {
            state.queue.clear();
            state.queued_bytes = 0;
            drop(state);
            drop(handler);
            tracing::trace!("chunk handler released");
        } else {
            state.handler = Some(handler);
        }
    }

    pub fn is_attached(&self) -> bool {
        self.lock().attached
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    /// Chunks waiting for a handler.
    pub fn buffered_chunks(&self) -> usize {
        self.lock().queue.iter().filter(|e| matches!(e, Event::Chunk(_))).count()
    }

    /// Bytes waiting for a handler.
    pub fn buffered_bytes(&self) -> usize {
        self.lock().queued_bytes
    }
}

/// Closes the stream if a handler panics mid-drain, so later calls fail with
/// `StreamClosed` instead of queueing behind a drainer that is gone.
struct DrainGuard<'a> {
    accumulator: &'a ChunkAccumulator,
    armed: bool,
}

impl Drop for DrainGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut state = self.accumulator.lock();
        state.draining = false;
        state.closed = true;
        state.queue.clear();
        state.queued_bytes = 0;
        tracing::debug!("chunk handler panicked, stream closed");
    }
}

impl fmt::Debug for ChunkAccumulator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.lock();
        f.debug_struct("ChunkAccumulator")
            .field("attached", &state.attached)
            .field("closed", &state.closed)
            .field("queued_bytes", &state.queued_bytes)
            .field("ceiling", &self.ceiling)
            .finish()
    }
}
