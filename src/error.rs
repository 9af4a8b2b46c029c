//! Error types surfaced across the public API.
//!
//! Everything else (transient send failures, missing slots) is handled
//! internally and never reaches the caller as an `Error` — see the crate's
//! top level docs for the propagation policy.

use failure::Fail;

/// The format string passed to [`Template::parse`](crate::template::Template::parse)
/// (or [`StructMessage::set_format`](crate::message::StructMessage::set_format))
/// was not well-bracketed.
#[derive(Debug, Fail)]
#[fail(display = "bad format `{}`: {}", format, reason)]
pub struct TemplateError {
    pub(crate) format: String,
    pub(crate) reason: &'static str,
}

/// A sink failed to initialize (DNS resolution, refused connection, ...).
#[derive(Debug, Fail)]
#[fail(display = "failed to initialize {} sink ({}:{}): {}", kind, host, port, cause)]
pub struct SinkInitError {
    pub(crate) kind: &'static str,
    pub(crate) host: String,
    pub(crate) port: String,
    pub(crate) cause: String,
}
