#![doc(html_root_url = "https://docs.rs/ringlog/0.1.0/ringlog/")]
#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! An asynchronous, template-formatted application logger.
//!
//! Producer threads call the level-filtered methods on [`Logger`] (`info`,
//! `warning`, `error`, ...); each call enqueues a [`Record`](crate::record::Record)
//! onto a bounded ring queue and returns immediately. A single background
//! worker thread drains that queue, renders each record through the format
//! template owned by its submitter thread, and hands the resulting line to a
//! configurable [`sink`] — either standard output or an HTTP endpoint that
//! spools to disk while unreachable and replays the spool on recovery.
//!
//! # Templates
//!
//! A template is a format string with `<NAME>` placeholders, set once with
//! [`Logger::set_base_format`] and then customized per submitter thread with
//! [`Logger::set_thread_value`]. Three slot names are reserved and stamped by
//! the worker on every record regardless of any value a caller set on them:
//! `MSG`, `LEVEL`, `TIME`. Placeholders whose name matches a defined
//! environment variable are resolved once, at parse time, and vanish from the
//! template entirely.
//!
//! ```rust
//! use ringlog::{Logger, Options};
//!
//! let opts = Options::console("INFO", 64);
//! let logger = Logger::init(&opts).unwrap();
//! logger.set_base_format("[<LEVEL>] <MSG>").unwrap();
//! logger.info("hello world");
//! logger.shutdown();
//! ```
//!
//! # Performance warning
//!
//! The background worker is single-threaded and does not batch HTTP posts;
//! a sink that cannot keep up with the submission rate will eventually apply
//! back-pressure to producers once the ring queue fills.
//!
//! # Planned features
//!
//! These are intentionally out of scope for this crate (see the module docs
//! for the rationale): log rotation, typed structured fields, TLS and
//! authentication on the HTTP sink, rate limiting, and cross-process log
//! aggregation.

mod dispatcher;
mod error;
mod level;
mod logger;
mod message;
mod options;
mod queue;
mod record;
mod registry;
mod sink;
mod template;

pub use crate::error::{SinkInitError, TemplateError};
pub use crate::level::Level;
pub use crate::logger::Logger;
pub use crate::options::{Options, OutputKind};
pub use crate::record::Record;
