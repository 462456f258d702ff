//! Message buffers between the host and the agent process.
//!
//! Two FIFO queues: inbound (agent to host) and outbound (host to agent).
//! The inbound side carries a readiness flag that is set when a message is
//! pushed and cleared when the queue is drained. Only one task may wait on
//! the inbound side at a time.
//!
//! Queue state lives behind short-lived `std::sync::Mutex` sections; the
//! readiness flag is a `tokio::sync::watch` channel so a waiter can suspend
//! without holding any lock.

use futures::Stream;
use std::fmt;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::watch;

/// Inbound and outbound message queues with an inbound readiness signal.
pub struct MessageBuffer<I, O> {
    inbound: Mutex<Vec<I>>,
    outbound: Mutex<Vec<O>>,
    ready: watch::Sender<bool>,
}

impl<I, O> MessageBuffer<I, O> {
    /// Creates empty buffers with readiness cleared.
    #[must_use]
    pub fn new() -> Self {
        let (ready, _) = watch::channel(false);
        Self {
            inbound: Mutex::new(Vec::new()),
            outbound: Mutex::new(Vec::new()),
            ready,
        }
    }

    /// Appends a message to the inbound queue and sets readiness.
    ///
    /// Never suspends.
    pub fn push_inbound(&self, message: I) {
        let mut inbound = self.inbound.lock().unwrap_or_else(PoisonError::into_inner);
        inbound.push(message);
        self.ready.send_replace(true);
        tracing::trace!(pending = inbound.len(), "Inbound message buffered");
    }

    /// Waits until inbound messages are ready, then takes all of them.
    ///
    /// With `None` the wait is unbounded. With `Some(limit)` the wait ends
    /// after `limit` and whatever is queued (usually nothing) is returned.
    /// `Some(Duration::ZERO)` never suspends.
    pub async fn drain_ready(&self, timeout: Option<Duration>) -> Vec<I> {
        match timeout {
            Some(limit) if limit.is_zero() => return self.peek_and_clear(),
            _ => {}
        }

        let mut ready = self.ready.subscribe();
        let woke = match timeout {
            None => ready.wait_for(|flag| *flag).await.is_ok(),
            Some(limit) => matches!(
                tokio::time::timeout(limit, ready.wait_for(|flag| *flag)).await,
                Ok(Ok(_))
            ),
        };

        if !woke {
            tracing::trace!(?timeout, "Inbound wait timed out");
        }

        self.peek_and_clear()
    }

    /// Takes every queued inbound message without waiting.
    pub fn peek_and_clear(&self) -> Vec<I> {
        let mut inbound = self.inbound.lock().unwrap_or_else(PoisonError::into_inner);
        let drained = std::mem::take(&mut *inbound);
        self.ready.send_replace(false);
        drained
    }

    /// Appends a message to the outbound queue.
    pub fn enqueue_outbound(&self, message: O) {
        self.outbound
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message);
    }

    /// Takes every queued outbound message without waiting.
    pub fn drain_outbound(&self) -> Vec<O> {
        let mut outbound = self.outbound.lock().unwrap_or_else(PoisonError::into_inner);
        std::mem::take(&mut *outbound)
    }

    /// Number of queued inbound messages.
    #[must_use]
    pub fn inbound_len(&self) -> usize {
        self.inbound.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Number of queued outbound messages.
    #[must_use]
    pub fn outbound_len(&self) -> usize {
        self.outbound.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Returns true if inbound messages are waiting to be drained.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        *self.ready.borrow()
    }

    /// Streams non-empty inbound batches as they become ready.
    ///
    /// The stream is the single inbound reader while it is polled.
    pub fn inbound_batches(&self) -> impl Stream<Item = Vec<I>> + '_ {
        async_stream::stream! {
            loop {
                let batch = self.drain_ready(None).await;
                if !batch.is_empty() {
                    yield batch;
                }
            }
        }
    }
}

impl<I, O> Default for MessageBuffer<I, O> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I, O> fmt::Debug for MessageBuffer<I, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageBuffer")
            .field("inbound_len", &self.inbound_len())
            .field("outbound_len", &self.outbound_len())
            .field("ready", &self.is_ready())
            .finish()
    }
}
