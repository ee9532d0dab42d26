//! # Task trait.
//!
//! A task receives a [`CancellationToken`] (its scope) and should check it
//! regularly to stop cooperatively during shutdown or after
//! [`Supervisor::cancel`](crate::Supervisor::cancel).

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::TaskError;

/// Shared handle to a task.
pub type TaskRef = Arc<dyn Task>;

/// # Asynchronous, cancelable unit.
///
/// A `Task` has a [`name`](Task::name) (the registry key) and an async
/// [`run`](Task::run) method that receives its scope.
///
/// # Example
/// ```
/// use tokio_util::sync::CancellationToken;
/// use async_trait::async_trait;
/// use daemonvisor::{Task, TaskError};
///
/// struct Poller;
///
/// #[async_trait]
/// impl Task for Poller {
///     fn name(&self) -> &str { "poller" }
///
///     async fn run(&self, ctx: CancellationToken) -> Result<(), TaskError> {
///         while !ctx.is_cancelled() {
///             // poll...
///             tokio::time::sleep(std::time::Duration::from_millis(100)).await;
///         }
///         Err(TaskError::Canceled)
///     }
/// }
/// ```
#[async_trait]
pub trait Task: Send + Sync + 'static {
    /// Returns the name the task is registered under.
    fn name(&self) -> &str;

    /// Executes the task until completion or cancellation.
    ///
    /// Implementations should watch `ctx` and return promptly once it is
    /// cancelled; nothing stops a task that ignores it except process exit.
    async fn run(&self, ctx: CancellationToken) -> Result<(), TaskError>;
}
