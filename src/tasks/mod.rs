//! # Task abstractions.
//!
//! This module provides the task-related types:
//! - [`Task`] - trait for implementing named, cancelable async tasks
//! - [`TaskFn`] - function-based task implementation
//! - [`TaskRef`] - shared reference to a task (`Arc<dyn Task>`)
//!
//! Closures can also be started directly with
//! [`Supervisor::start`](crate::Supervisor::start); these types are for tasks
//! that carry their own state or name.

mod task;
mod task_fn;

pub use task::{Task, TaskRef};
pub use task_fn::TaskFn;
