//! Unbuffered hand-off channel shared by the two endpoints of a stream half.
//!
//! A send completes only after a receiver has taken the item, which is the
//! flow control a real stream gets from its receive window: a producer with no
//! ready consumer waits. Closing the channel (through its [`StreamGuard`]) wakes
//! every blocked receiver with end-of-stream and every blocked sender with
//! [`StreamError::AlreadyClosed`].

use crate::error::StreamError;
use crate::streaming::guard::StreamGuard;
use tokio::sync::{mpsc, oneshot, Mutex};

// =============================================================================
// Handoff: one in-flight item
// =============================================================================

/// An item waiting for a receiver, plus the acknowledgement the receiver fires
/// when it takes it.
struct Handoff<T> {
    item: T,
    taken: oneshot::Sender<()>,
}

// =============================================================================
// HandoffChannel
// =============================================================================

/// FIFO conduit with a single reader and any number of writers.
///
/// At most one item sits in the slot at a time and its sender does not return
/// until the item is taken, so nothing is ever buffered ahead of the reader.
pub struct HandoffChannel<T> {
    tx: mpsc::Sender<Handoff<T>>,
    rx: Mutex<mpsc::Receiver<Handoff<T>>>,
    guard: StreamGuard,
}

impl<T: Send> HandoffChannel<T> {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel(1);
        Self {
            tx,
            rx: Mutex::new(rx),
            guard: StreamGuard::new(),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.guard.is_closed()
    }

    /// Close the channel. Returns true for the call that performed the close.
    pub fn close(&self) -> bool {
        self.guard.close()
    }

    /// Hand `item` to the reader, waiting until it has been taken.
    ///
    /// Fails with [`StreamError::AlreadyClosed`] without blocking if the channel
    /// is already closed, and also if it closes while the item is still waiting.
    /// Dropping the future before it completes withdraws the item.
    pub async fn send(&self, item: T) -> Result<(), StreamError> {
        if self.guard.is_closed() {
            return Err(StreamError::AlreadyClosed);
        }

        let (taken_tx, taken_rx) = oneshot::channel();
        let handoff = Handoff {
            item,
            taken: taken_tx,
        };

        tokio::select! {
            biased;
            () = self.guard.closed() => return Err(StreamError::AlreadyClosed),
            res = self.tx.send(handoff) => {
                if res.is_err() {
                    return Err(StreamError::AlreadyClosed);
                }
            }
        }

        tokio::select! {
            biased;
            res = taken_rx => res.map_err(|_| StreamError::AlreadyClosed),
            () = self.guard.closed() => Err(StreamError::AlreadyClosed),
        }
    }

    /// Take the next item, waiting for one to arrive.
    ///
    /// Returns `None` once the channel is closed: that is end-of-stream, not an
    /// error. Closure wins over an item still waiting in the slot.
    pub async fn recv(&self) -> Option<T> {
        let mut rx = self.rx.lock().await;

        loop {
            tokio::select! {
                biased;
                () = self.guard.closed() => return None,
                handoff = rx.recv() => {
                    let handoff = handoff?;
                    // Sender is gone (cancelled, or saw the close): the item was withdrawn.
                    if handoff.taken.send(()).is_err() {
                        continue;
                    }
                    return Some(handoff.item);
                }
            }
        }
    }
}

impl<T: Send> Default for HandoffChannel<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for HandoffChannel<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandoffChannel")
            .field("closed", &self.guard.is_closed())
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================
