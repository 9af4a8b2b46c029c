//! The bounded, blocking multi-producer / single-consumer queue that
//! decouples producer threads from the delivery thread.
//!
//! The contract (blocking `put`, timed-wait `take`, `size`) is realized on
//! top of a bounded `crossbeam-channel`: its sender already blocks the
//! caller while the channel is full, and `recv_timeout` gives the
//! one-second poll `take` needs to notice shutdown promptly.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender, TryRecvError};

const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// A fixed-capacity FIFO queue of owned items.
pub struct RingQueue<T> {
    sender: Sender<T>,
    receiver: Receiver<T>,
}

impl<T> RingQueue<T> {
    /// Capacity must be greater than zero.
    pub fn new(capacity: usize) -> RingQueue<T> {
        assert!(capacity > 0, "ring queue capacity must be positive");
        let (sender, receiver) = bounded(capacity);
        RingQueue { sender, receiver }
    }

    /// Blocks the caller until there is room, then inserts `item`. Never
    /// drops an item; the only way this returns without inserting is if the
    /// queue's own receiver has been torn down, which doesn't happen while
    /// the owning `Logger` is alive.
    pub fn put(&self, item: T) {
        if self.sender.send(item).is_err() {
            // The receiving half is gone (logger fully torn down). There is
            // nothing left to deliver the record to.
        }
    }

    /// Removes the oldest unread item, polling once a second so callers can
    /// observe `running` flip to false promptly. A pending item is always
    /// returned, even if `running` is already false by the time `take` is
    /// called — shutdown only stops the wait once the queue is actually
    /// drained, which is what lets the dispatcher's drain phase (§4.7)
    /// deliver every record already enqueued before it exits.
    pub fn take(&self, running: &AtomicBool) -> Option<T> {
        loop {
            match self.receiver.try_recv() {
                Ok(item) => return Some(item),
                Err(TryRecvError::Disconnected) => return None,
                Err(TryRecvError::Empty) => {}
            }
            if !running.load(Ordering::SeqCst) {
                return None;
            }
            match self.receiver.recv_timeout(POLL_INTERVAL) {
                Ok(item) => return Some(item),
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => return None,
            }
        }
    }

    /// Current count of unread items.
    pub fn size(&self) -> usize {
        self.receiver.len()
    }
}
