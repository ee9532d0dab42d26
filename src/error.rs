//! Error types returned by task bodies.
//!
//! The supervisor itself has no error channel: starting and cancelling tasks
//! are infallible and the shutdown coordinator reports an [`ExitOutcome`](crate::ExitOutcome)
//! instead of an error. [`TaskError`] exists so task bodies can use `?` and
//! so the supervisor can log *how* a body returned.
//!
//! Every variant is treated as a normal return by the supervisor.

use thiserror::Error;

/// # Errors produced by a task body.
///
/// Returned from a task body to describe why it stopped. The supervisor
/// logs the error at debug level and otherwise treats it like `Ok(())`:
/// retry and escalation are the task's own concern.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum TaskError {
    /// Non-recoverable failure inside the task body.
    #[error("fatal error: {error}")]
    Fatal {
        /// The underlying error message.
        error: String,
    },

    /// The task body failed.
    #[error("execution failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// The task observed its cancellation signal and stopped early.
    #[error("context cancelled")]
    Canceled,
}

impl TaskError {
    /// Shorthand for [`TaskError::Fail`].
    pub fn fail(error: impl Into<String>) -> Self {
        TaskError::Fail {
            error: error.into(),
        }
    }

    /// Shorthand for [`TaskError::Fatal`].
    pub fn fatal(error: impl Into<String>) -> Self {
        TaskError::Fatal {
            error: error.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use daemonvisor::TaskError;
    ///
    /// assert_eq!(TaskError::Canceled.as_label(), "task_canceled");
    /// assert_eq!(TaskError::fail("boom").as_label(), "task_failed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            TaskError::Fatal { .. } => "task_fatal",
            TaskError::Fail { .. } => "task_failed",
            TaskError::Canceled => "task_canceled",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            TaskError::Fatal { error } => format!("fatal: {error}"),
            TaskError::Fail { error } => format!("error: {error}"),
            TaskError::Canceled => "context cancelled".to_string(),
        }
    }

    /// True when the body stopped because its scope was cancelled.
    pub fn is_canceled(&self) -> bool {
        matches!(self, TaskError::Canceled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_are_stable() {
        assert_eq!(TaskError::fatal("x").as_label(), "task_fatal");
        assert_eq!(TaskError::fail("x").as_label(), "task_failed");
        assert_eq!(TaskError::Canceled.as_label(), "task_canceled");
    }

    #[test]
    fn messages_carry_details() {
        assert_eq!(TaskError::fail("disk full").as_message(), "error: disk full");
        assert_eq!(TaskError::fatal("bad config").to_string(), "fatal error: bad config");
        assert!(TaskError::Canceled.is_canceled());
        assert!(!TaskError::fail("x").is_canceled());
    }
}
