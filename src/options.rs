//! Construction-time configuration for the [`Logger`](crate::logger::Logger).
//!
//! Built programmatically by the caller; loading these from a config file or
//! the command line is outside this crate (see the crate-level docs).

use std::path::PathBuf;

/// Where serialized log lines end up.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum OutputKind {
    /// Writes to standard output.
    Console,
    /// POSTs to an HTTP endpoint, spooling to disk on failure.
    Http,
}

/// Options consumed once, by the first call that constructs the process-wide
/// [`Logger`](crate::logger::Logger). Later calls ignore their own `Options`
/// and hand back the already-running instance.
#[derive(Clone, Debug)]
pub struct Options {
    /// Which sink to construct.
    pub output: OutputKind,

    /// Hostname or IP address of the HTTP endpoint. Ignored for `Console`.
    pub host: String,

    /// Port of the HTTP endpoint, as a decimal string. Ignored for
    /// `Console`.
    pub port: String,

    /// Where to spool lines while the HTTP endpoint is unreachable. Ignored
    /// for `Console`.
    pub spool_path: PathBuf,

    /// Informational only; this crate does not read a template from disk.
    /// Carried through so callers that do load a template file from here
    /// have a single place to keep the path.
    pub template_path: Option<PathBuf>,

    /// Case-insensitive severity name (`TRACE`, `DEBUG`, `INFO`, `WARNING`,
    /// `ERROR`, `CRITICAL`). Anything else parses as `Level::Unknown`, which
    /// admits every record.
    pub level: String,

    /// Capacity of the bounded ring queue. Must be positive.
    pub buffer_capacity: usize,
}

impl Options {
    /// A console sink with sensible defaults, just needing a level and a
    /// buffer size to be useful.
    pub fn console(level: impl Into<String>, buffer_capacity: usize) -> Options {
        Options {
            output: OutputKind::Console,
            host: String::new(),
            port: String::new(),
            spool_path: PathBuf::new(),
            template_path: None,
            level: level.into(),
            buffer_capacity,
        }
    }

    /// An HTTP sink pointed at `host:port`, spooling to `spool_path`.
    pub fn http(
        host: impl Into<String>,
        port: impl Into<String>,
        spool_path: impl Into<PathBuf>,
        level: impl Into<String>,
        buffer_capacity: usize,
    ) -> Options {
        Options {
            output: OutputKind::Http,
            host: host.into(),
            port: port.into(),
            spool_path: spool_path.into(),
            template_path: None,
            level: level.into(),
            buffer_capacity,
        }
    }
}
