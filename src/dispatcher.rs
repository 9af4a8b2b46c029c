//! The single background worker thread: drains the queue, serializes each
//! record against its submitter thread's template, and hands the line to
//! the sink.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::logger::LoggerState;
use crate::queue::RingQueue;
use crate::record::Record;
use crate::sink::Sink;

pub struct Dispatcher {
    queue: Arc<RingQueue<Record>>,
    running: Arc<AtomicBool>,
    state: Arc<Mutex<LoggerState>>,
    sink: Box<dyn Sink>,
}

impl Dispatcher {
    pub fn new(
        queue: Arc<RingQueue<Record>>,
        running: Arc<AtomicBool>,
        state: Arc<Mutex<LoggerState>>,
        sink: Box<dyn Sink>,
    ) -> Dispatcher {
        Dispatcher {
            queue,
            running,
            state,
            sink,
        }
    }

    /// Runs until `running` is false and the queue is empty, then returns.
    /// Meant to be the body of the dedicated worker thread.
    pub fn run(mut self) {
        loop {
            let still_running = self.running.load(std::sync::atomic::Ordering::SeqCst);
            if !still_running && self.queue.size() == 0 {
                return;
            }
            let record = match self.queue.take(&self.running) {
                Some(record) => record,
                None => return,
            };
            let line = {
                let mut state = self.state.lock();
                let LoggerState { base, registry } = &mut *state;
                match registry.find(record.thread()) {
                    Some(msg) => msg.serialize(&record),
                    None => {
                        eprintln!(
                            "ringlog: dispatcher: no template registered for thread {:?}, \
                             falling back to a fresh clone of the base template",
                            record.thread()
                        );
                        let fallback = registry.find_or_create(record.thread(), base);
                        fallback.serialize(&record)
                    }
                }
            };
            self.sink.write(&line);
        }
    }
}
