//! # Leveled logging boundary.
//!
//! The supervisor and the shutdown coordinator never print anything on their
//! own: every user-visible line goes through a [`Logger`] capability passed in
//! at build time (`Arc<dyn Logger>`).
//!
//! ## Shape
//! ```text
//!   Level:  trace  debug  info  warn  error  fatal
//!           ──────────────────────────────────────
//!   plain:  trace(&str)        ... fatal(&str)
//!   args:   trace_args(fmt)    ... fatal_args(fmt)
//!                     │
//!                     └──► Logger::log(level, fmt::Arguments)   (the only required method)
//! ```
//!
//! [`LogWriter`] is the default implementation and forwards to `tracing`.
//! Enable the `logging` feature for [`init`], which installs a
//! `tracing-subscriber` formatter.
//!
//! ## Example
//! ```rust
//! use std::fmt;
//! use daemonvisor::{Level, Logger};
//!
//! struct Stderr;
//!
//! impl Logger for Stderr {
//!     fn log(&self, level: Level, args: fmt::Arguments<'_>) {
//!         eprintln!("[{}] {}", level.as_str(), args);
//!     }
//! }
//!
//! Stderr.info("plain message");
//! Stderr.warn_args(format_args!("grace period {}s", 5));
//! ```

use std::fmt;

mod writer;

#[cfg(feature = "logging")]
mod init;

#[cfg(feature = "logging")]
pub use init::init;
pub use writer::LogWriter;

/// Severity of a log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    /// Very fine-grained diagnostics.
    Trace,
    /// Task lifecycle details.
    Debug,
    /// Normal shutdown outcomes.
    Info,
    /// Shutdown-path events (signals, forced exits).
    Warn,
    /// Failures of the runtime itself (e.g. signal hooks not installed).
    Error,
    /// Highest severity. Logging at this level never aborts the process.
    Fatal,
}

impl Level {
    /// Lowercase tag used as the line prefix (`[info]`, `[warn]`, ...).
    pub fn as_str(self) -> &'static str {
        match self {
            Level::Trace => "trace",
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "error",
            Level::Fatal => "fatal",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Leveled logging capability.
///
/// Implementors only provide [`Logger::log`]; the twelve per-level helpers
/// (plain message and format-with-arguments for each [`Level`]) are derived
/// from it.
pub trait Logger: Send + Sync + 'static {
    /// Writes one line at `level`.
    fn log(&self, level: Level, args: fmt::Arguments<'_>);

    /// Logs a plain message at [`Level::Trace`].
    fn trace(&self, msg: &str) {
        self.log(Level::Trace, format_args!("{msg}"));
    }
    /// Logs preformatted arguments at [`Level::Trace`].
    fn trace_args(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Trace, args);
    }

    /// Logs a plain message at [`Level::Debug`].
    fn debug(&self, msg: &str) {
        self.log(Level::Debug, format_args!("{msg}"));
    }
    /// Logs preformatted arguments at [`Level::Debug`].
    fn debug_args(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Debug, args);
    }

    /// Logs a plain message at [`Level::Info`].
    fn info(&self, msg: &str) {
        self.log(Level::Info, format_args!("{msg}"));
    }
    /// Logs preformatted arguments at [`Level::Info`].
    fn info_args(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Info, args);
    }

    /// Logs a plain message at [`Level::Warn`].
    fn warn(&self, msg: &str) {
        self.log(Level::Warn, format_args!("{msg}"));
    }
    /// Logs preformatted arguments at [`Level::Warn`].
    fn warn_args(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Warn, args);
    }

    /// Logs a plain message at [`Level::Error`].
    fn error(&self, msg: &str) {
        self.log(Level::Error, format_args!("{msg}"));
    }
    /// Logs preformatted arguments at [`Level::Error`].
    fn error_args(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Error, args);
    }

    /// Logs at [`Level::Fatal`]. Does not terminate the process.
    fn fatal(&self, msg: &str) {
        self.log(Level::Fatal, format_args!("{msg}"));
    }
    /// Formatted form of [`fatal`](Self::fatal).
    fn fatal_args(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Fatal, args);
    }
}
