//! # daemonvisor
//!
//! **Daemonvisor** supervises named, long-running tasks inside one process and
//! turns termination signals into a bounded graceful shutdown.
//!
//! It starts tasks, tracks their completion, cancels any of them by name, and
//! on SIGINT/SIGTERM cancels everything and waits a configurable grace period
//! before letting the process exit. A second interrupt during the grace
//! period forces the exit immediately.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!    start("a", body)   start("b", body)   cancel("a")
//!           │                  │                │
//!           ▼                  ▼                ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Supervisor                                                       │
//! │  - root scope (CancellationToken)                                 │
//! │  - Registry: name → [scope, ...]   (RwLock)                       │
//! │  - completion counter (TaskTracker)                               │
//! └──────┬──────────────────┬─────────────────────────────────────────┘
//!        ▼                  ▼
//!   ┌──────────┐       ┌──────────┐
//!   │ task "a" │       │ task "b" │   each with root.child_token()
//!   └──────────┘       └──────────┘
//!
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  ShutdownCoordinator::wait_for_exit()                             │
//! │  SignalSource ──► Running ──► GracePeriod ──► Exited(outcome)     │
//! └───────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ### Shutdown
//! ```text
//! Running:
//!   counter reaches 0                  ─► Exited(NoTasks)
//!   interrupt / root scope cancelled   ─► root.cancel(), GracePeriod
//! GracePeriod:
//!   counter reaches 0                  ─► Exited(Graceful)
//!   second interrupt                   ─► Exited(ForcedByOperator)
//!   grace timer elapsed                ─► Exited(ForcedByTimeout)
//! ```
//!
//! ## Features
//! | Area            | Description                                         | Key types                                    |
//! |-----------------|-----------------------------------------------------|----------------------------------------------|
//! | **Supervision** | Start tasks by name, cancel by name                 | [`Supervisor`]                               |
//! | **Shutdown**    | Signal-driven grace period and forced exit          | [`ShutdownCoordinator`], [`ExitOutcome`]     |
//! | **Signals**     | OS hooks or injected notification sources           | [`SignalSource`], [`OsSignals`], [`signals::channel`] |
//! | **Logging**     | Leveled logger capability, `tracing` by default     | [`Logger`], [`LogWriter`]                    |
//! | **Tasks**       | Closures or trait objects receiving their scope     | [`Task`], [`TaskFn`], [`TaskRef`]            |
//! | **Errors**      | Return type of task bodies                          | [`TaskError`]                                |
//! | **Configuration** | Grace period                                      | [`Config`]                                   |
//!
//! ## Optional features
//! - `logging`: exports [`logging::init`], a `tracing-subscriber` setup for [`LogWriter`].
//!
//! ## Example
//! ```rust,no_run
//! use std::time::Duration;
//! use daemonvisor::{Config, Supervisor, TaskError};
//!
//! #[tokio::main]
//! async fn main() {
//!     let (sup, shutdown) = Supervisor::new(Config::from_env());
//!
//!     sup.start("routine A", |ctx| async move {
//!         loop {
//!             tokio::select! {
//!                 _ = ctx.cancelled() => return Err(TaskError::Canceled),
//!                 _ = tokio::time::sleep(Duration::from_secs(1)) => {}
//!             }
//!         }
//!     });
//!
//!     let outcome = shutdown.wait_for_exit().await;
//!     if outcome.is_forced() {
//!         std::process::exit(1);
//!     }
//! }
//! ```

mod core;
mod error;
mod tasks;

pub mod logging;
pub mod signals;

// ---- Public re-exports ----

pub use crate::core::{
    Config, DEFAULT_GRACE, ExitOutcome, GRACE_ENV, ShutdownCoordinator, ShutdownState, Supervisor,
    SupervisorBuilder,
};
pub use error::TaskError;
pub use logging::{Level, LogWriter, Logger};
pub use signals::{OsSignals, Signal, SignalSource};
pub use tasks::{Task, TaskFn, TaskRef};
