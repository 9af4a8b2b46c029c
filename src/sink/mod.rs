//! Sink trait plus the two concrete destinations.
//!
//! The source represents `console`/`http` as a small class hierarchy with a
//! shared `init`/`write_msg` interface; here that's a plain trait object,
//! the capability-trait form the source's own redesign notes prefer over
//! inheritance.

mod console;
mod http;

pub use self::console::ConsoleSink;
pub use self::http::HttpSink;

/// A delivery destination for serialized log lines. Owned and driven
/// exclusively by the dispatcher's worker thread, so no internal locking is
/// required.
pub trait Sink: Send {
    /// Delivers one already-serialized line (no trailing newline).
    fn write(&mut self, line: &str);
}
