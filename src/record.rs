//! The payload a producer hands to the queue.

use std::thread::ThreadId;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::level::Level;

/// A single log event, captured at the point of submission. Owned by the
/// queue slot until the dispatcher consumes it.
#[derive(Debug)]
pub struct Record {
    message: String,
    level: Level,
    thread: ThreadId,
    timestamp: u64,
}

impl Record {
    /// Builds a record for the current thread, stamped with the current
    /// wall-clock time (seconds since the Unix epoch).
    pub fn new(message: String, level: Level) -> Record {
        Record {
            message,
            level,
            thread: std::thread::current().id(),
            timestamp: now_secs(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn thread(&self) -> ThreadId {
        self.thread
    }

    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
