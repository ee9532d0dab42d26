//! Runtime core: supervision and shutdown.
//!
//! Internal modules:
//! - [`config`]: grace period and its defaults;
//! - [`registry`]: name → running instances, with drop-guard deregistration;
//! - [`supervisor`]: starts and cancels tasks, owns the completion counter;
//! - [`shutdown`]: signal-driven state machine deciding when the process may exit;
//! - [`builder`]: wires a supervisor and its coordinator together.

mod builder;
mod config;
mod registry;
mod shutdown;
mod supervisor;

pub use builder::SupervisorBuilder;
pub use config::{Config, DEFAULT_GRACE, GRACE_ENV};
pub use shutdown::{ExitOutcome, ShutdownCoordinator, ShutdownState};
pub use supervisor::Supervisor;
