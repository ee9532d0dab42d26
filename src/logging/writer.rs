//! # LogWriter: default logger
//!
//! Forwards every line to `tracing` at the matching level, prefixed with the
//! level tag. Nothing is printed unless a `tracing` subscriber is installed
//! (see [`init`](crate::logging) with the `logging` feature).
//!
//! ## Example output
//! ```text
//! WARN daemonvisor: [warn] got signal: interrupt
//! WARN daemonvisor: [warn] waiting 5s for graceful exit; send interrupt again to force exit
//! INFO daemonvisor: [info] all tasks exited gracefully
//! ```

use std::fmt;

use super::{Level, Logger};

/// Default [`Logger`] backed by `tracing`.
///
/// `Fatal` is emitted as a `tracing` error tagged `[fatal]`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Logger for LogWriter {
    fn log(&self, level: Level, args: fmt::Arguments<'_>) {
        match level {
            Level::Trace => tracing::trace!(target: "daemonvisor", "[trace] {args}"),
            Level::Debug => tracing::debug!(target: "daemonvisor", "[debug] {args}"),
            Level::Info => tracing::info!(target: "daemonvisor", "[info] {args}"),
            Level::Warn => tracing::warn!(target: "daemonvisor", "[warn] {args}"),
            Level::Error => tracing::error!(target: "daemonvisor", "[error] {args}"),
            Level::Fatal => tracing::error!(target: "daemonvisor", fatal = true, "[fatal] {args}"),
        }
    }
}
