//! The process-wide façade: owns the queue, the shared template state, the
//! sink, and the worker thread, and exposes the level-filtered submit API
//! plus the template mutation API.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use std::thread::JoinHandle;
use std::time::Duration;

use failure::Error;
use parking_lot::Mutex;

use crate::dispatcher::Dispatcher;
use crate::error::SinkInitError;
use crate::level::Level;
use crate::message::StructMessage;
use crate::options::{Options, OutputKind};
use crate::queue::RingQueue;
use crate::record::Record;
use crate::registry::Registry;
use crate::sink::{ConsoleSink, HttpSink, Sink};

/// How long `shutdown` waits for the worker thread before giving up on the
/// join. A wedged sink (e.g. a dead socket stuck past its own deadline)
/// should not be able to hang process exit indefinitely.
const SHUTDOWN_JOIN_TIMEOUT: Duration = Duration::from_secs(10);

/// The base template plus the per-thread registry, guarded by one mutex as
/// the dispatcher and the façade's mutation API both need to touch both
/// pieces atomically with respect to each other.
pub struct LoggerState {
    pub(crate) base: StructMessage,
    pub(crate) registry: Registry,
}

impl LoggerState {
    pub(crate) fn new(base: StructMessage) -> LoggerState {
        LoggerState {
            base,
            registry: Registry::new(),
        }
    }
}

static GLOBAL: OnceLock<Result<Logger, String>> = OnceLock::new();

/// The logger handle. Cloning is cheap (every field is a shared handle);
/// clones refer to the same underlying queue, state, and worker.
pub struct Logger {
    queue: Arc<RingQueue<Record>>,
    running: Arc<AtomicBool>,
    state: Arc<Mutex<LoggerState>>,
    level: Level,
    worker: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl Clone for Logger {
    fn clone(&self) -> Logger {
        Logger {
            queue: Arc::clone(&self.queue),
            running: Arc::clone(&self.running),
            state: Arc::clone(&self.state),
            level: self.level,
            worker: Arc::clone(&self.worker),
        }
    }
}

impl Logger {
    /// Constructs a fresh logger from `options`. Does not touch the
    /// process-wide singleton; callers that want the shared instance should
    /// use [`Logger::global`] instead.
    pub fn init(options: &Options) -> Result<Logger, Error> {
        let sink: Box<dyn Sink> = match options.output {
            OutputKind::Console => Box::new(ConsoleSink::new()),
            OutputKind::Http => match build_http_sink(options) {
                Ok(sink) => Box::new(sink),
                Err(e) => {
                    eprintln!("ringlog: logger: sink initialization failed: {}", e);
                    return Err(e.into());
                }
            },
        };
        Ok(Logger::with_sink(options, sink))
    }

    /// Shared construction path: everything `init` does once it has a
    /// concrete sink in hand. Exposed at the crate root so tests can swap
    /// in a recording sink instead of exercising the real console/HTTP I/O.
    pub(crate) fn with_sink(options: &Options, sink: Box<dyn Sink>) -> Logger {
        let queue = Arc::new(RingQueue::new(options.buffer_capacity.max(1)));
        let running = Arc::new(AtomicBool::new(true));
        let level = Level::parse(&options.level);
        let base = StructMessage::empty();
        let state = Arc::new(Mutex::new(LoggerState::new(base)));

        let worker = {
            let dispatcher = Dispatcher::new(
                Arc::clone(&queue),
                Arc::clone(&running),
                Arc::clone(&state),
                sink,
            );
            std::thread::Builder::new()
                .name("ringlog-worker".to_owned())
                .spawn(move || dispatcher.run())
                .expect("failed to spawn ringlog worker thread")
        };

        let logger = Logger {
            queue,
            running,
            state,
            level,
            worker: Arc::new(Mutex::new(Some(worker))),
        };
        logger.register_current_thread();
        logger
    }

    /// The process-wide instance: the first call constructs it from
    /// `options` and every later call ignores its `options` argument and
    /// returns the already-running instance (or its construction error).
    pub fn global(options: &Options) -> Result<&'static Logger, String> {
        let result = GLOBAL.get_or_init(|| Logger::init(options).map_err(|e| e.to_string()));
        match result {
            Ok(logger) => Ok(logger),
            Err(e) => Err(e.clone()),
        }
    }

    fn submit(&self, level: Level, message: impl Into<String>) {
        if self.level <= level {
            self.queue.put(Record::new(message.into(), level));
        }
    }

    /// Submits a `TRACE` record, if the configured level admits it.
    pub fn trace(&self, message: impl Into<String>) {
        self.submit(Level::Trace, message);
    }

    /// Submits a `DEBUG` record, if the configured level admits it.
    pub fn debug(&self, message: impl Into<String>) {
        self.submit(Level::Debug, message);
    }

    /// Submits an `INFO` record, if the configured level admits it.
    pub fn info(&self, message: impl Into<String>) {
        self.submit(Level::Info, message);
    }

    /// Submits a `WARNING` record, if the configured level admits it.
    pub fn warning(&self, message: impl Into<String>) {
        self.submit(Level::Warning, message);
    }

    /// Submits an `ERROR` record, if the configured level admits it.
    pub fn error(&self, message: impl Into<String>) {
        self.submit(Level::Error, message);
    }

    /// Submits a `CRITICAL` record, if the configured level admits it.
    pub fn critical(&self, message: impl Into<String>) {
        self.submit(Level::Critical, message);
    }

    /// Reparses `format` as the new base template and broadcasts it to
    /// every registered per-thread entry. On a bad format, the previous
    /// base (and every per-thread template derived from it) is left
    /// untouched and the reason is returned.
    pub fn set_base_format(&self, format: &str) -> Result<(), String> {
        let mut state = self.state.lock();
        let mut candidate = state.base.clone();
        candidate.set_format(format).map_err(|e| e.to_string())?;
        state.base = candidate;
        let LoggerState { base, registry } = &mut *state;
        registry.broadcast_format(base);
        Ok(())
    }

    /// Sets `name` on the base template; if the base has that slot, also
    /// broadcasts the value to every registered entry and returns `true`.
    /// Returns `false` if the base template has no such slot.
    pub fn set_global_value(&self, name: &str, value: impl Into<String>) -> bool {
        let value = value.into();
        let mut state = self.state.lock();
        if !state.base.set_value(name, value.clone()) {
            return false;
        }
        state.registry.broadcast_value(name, &value);
        true
    }

    /// Ensures the calling thread has its own registry entry, cloned from
    /// the current base template if it doesn't already have one.
    pub fn register_current_thread(&self) {
        let tid = std::thread::current().id();
        let mut state = self.state.lock();
        let LoggerState { base, registry } = &mut *state;
        registry.find_or_create(tid, base);
    }

    /// Sets `name` on the calling thread's own template (creating the
    /// entry lazily), returning whether that template has such a slot.
    pub fn set_thread_value(&self, name: &str, value: impl Into<String>) -> bool {
        let tid = std::thread::current().id();
        let mut state = self.state.lock();
        let LoggerState { base, registry } = &mut *state;
        let entry = registry.find_or_create(tid, base);
        entry.set_value(name, value)
    }

    /// Clears `running`, then joins the worker thread, which only returns
    /// once the queue has fully drained. Idempotent: a second call observes
    /// the worker handle already taken and returns immediately. Bounded by
    /// [`SHUTDOWN_JOIN_TIMEOUT`] so a wedged sink cannot hang the caller
    /// forever; `JoinHandle` itself has no join-with-timeout, so the wait
    /// is relayed through a channel from a short-lived helper thread.
    pub fn shutdown(&self) {
        self.running.store(false, Ordering::SeqCst);
        let handle = self.worker.lock().take();
        if let Some(handle) = handle {
            eprintln!("ringlog: logger: shutdown started, draining queue");
            let (done_tx, done_rx) = std::sync::mpsc::channel();
            std::thread::spawn(move || {
                let _ = handle.join();
                let _ = done_tx.send(());
            });
            if done_rx.recv_timeout(SHUTDOWN_JOIN_TIMEOUT).is_err() {
                eprintln!("ringlog: logger: shutdown timed out waiting for the worker to drain");
            } else {
                eprintln!("ringlog: logger: shutdown finished");
            }
        }
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        // Only the last handle sharing this worker should join it; cheaply
        // checked via the Arc's strong count since `worker` is cloned
        // alongside every other shared field.
        if Arc::strong_count(&self.worker) == 1 {
            self.shutdown();
        }
    }
}

fn build_http_sink(options: &Options) -> Result<HttpSink, SinkInitError> {
    let spool_path: PathBuf = options.spool_path.clone();
    HttpSink::init(&options.host, &options.port, spool_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex as StdMutex;
    use std::thread;

    struct RecordingSink {
        lines: Arc<StdMutex<Vec<String>>>,
    }

    impl Sink for RecordingSink {
        fn write(&mut self, line: &str) {
            self.lines.lock().unwrap().push(line.to_owned());
        }
    }

    fn logger_with_recorder(level: &str, capacity: usize) -> (Logger, Arc<StdMutex<Vec<String>>>) {
        let lines = Arc::new(StdMutex::new(Vec::new()));
        let sink = RecordingSink {
            lines: Arc::clone(&lines),
        };
        let opts = Options::console(level, capacity);
        let logger = Logger::with_sink(&opts, Box::new(sink));
        (logger, lines)
    }

    #[test]
    fn level_filtering_drops_below_configured_severity() {
        let (logger, lines) = logger_with_recorder("WARNING", 16);
        logger.set_base_format("<MSG>").unwrap();

        logger.info("dropped");
        logger.warning("kept-1");
        logger.error("kept-2");
        logger.shutdown();

        assert_eq!(*lines.lock().unwrap(), vec!["kept-1", "kept-2"]);
    }

    #[test]
    fn per_thread_values_do_not_cross_threads() {
        let (logger, lines) = logger_with_recorder("TRACE", 16);
        logger.set_base_format("<THREAD>:<MSG>").unwrap();
        assert!(logger.set_thread_value("THREAD", "main"));

        let logger2 = logger.clone();
        let worker = thread::spawn(move || {
            assert!(logger2.set_thread_value("THREAD", "worker"));
            logger2.info("from-worker");
        });
        worker.join().unwrap();
        logger.info("from-main");
        logger.shutdown();

        let got = lines.lock().unwrap().clone();
        assert_eq!(got.len(), 2);
        assert!(got.contains(&"main:from-main".to_owned()));
        assert!(got.contains(&"worker:from-worker".to_owned()));
    }

    #[test]
    fn set_base_format_failure_leaves_base_untouched() {
        let opts = Options::console("TRACE", 16);
        let logger = Logger::init(&opts).unwrap();
        logger.set_base_format("<A>").unwrap();
        assert!(logger.set_base_format("<<bad>>").is_err());
        assert!(logger.set_global_value("A", "still-there"));
        logger.shutdown();
    }

    #[test]
    fn shutdown_drains_the_queue_before_returning() {
        let opts = Options::console("TRACE", 4);
        let logger = Logger::init(&opts).unwrap();
        for i in 0..20 {
            logger.info(format!("m{}", i));
        }
        logger.shutdown();
        assert_eq!(logger.queue.size(), 0);
    }

    #[test]
    fn global_returns_the_same_instance_on_repeated_calls() {
        // Each test process only ever calls `global` once per OnceLock, so
        // this test exercises the happy path of first construction and the
        // identity of repeated access within the same call.
        let opts = Options::console("INFO", 8);
        let a = Logger::global(&opts).unwrap();
        let b = Logger::global(&opts).unwrap();
        assert!(std::ptr::eq(a, b));
    }
}
