//! # Task registry: name → running instances.
//!
//! The registry maps a task name to the cancel handles (scopes) of every
//! running instance started under that name.
//!
//! ## Architecture
//! ```text
//! Supervisor::start(name) ──► Registry::register(name, scope) ──► Registration (guard)
//!                                                                     │ moved into the task future
//!                                                                     ▼
//!                                           body returns / panics / is dropped
//!                                                                     │
//!                                                                     ▼
//!                                                Registration::drop → remove(name, id)
//!
//! Supervisor::cancel(name) ──► Registry::cancel(name)   (shared lock, cancels every instance)
//! ```
//!
//! ## Rules
//! - `register` and `remove` take the write lock; `cancel`/`list` take the read lock
//! - each instance has a unique id; removal only ever touches its own entry
//! - an instance is removed exactly once (the guard is dropped exactly once)
//! - a name with no instances left is dropped from the map
//! - cancelling an absent name is a no-op

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use tokio_util::sync::CancellationToken;

/// One running instance of a named task.
struct Instance {
    id: u64,
    scope: CancellationToken,
}

/// Registry of running tasks.
pub(crate) struct Registry {
    tasks: RwLock<HashMap<Arc<str>, Vec<Instance>>>,
    next_id: AtomicU64,
}

impl Registry {
    /// Creates an empty registry.
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            tasks: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        })
    }

    /// Registers a new instance under `name`.
    ///
    /// The returned guard removes the instance when dropped.
    pub(crate) fn register(
        self: &Arc<Self>,
        name: &str,
        scope: CancellationToken,
    ) -> Registration {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let name: Arc<str> = Arc::from(name);

        self.tasks
            .write()
            .entry(Arc::clone(&name))
            .or_default()
            .push(Instance { id, scope });

        Registration {
            registry: Arc::clone(self),
            name,
            id,
        }
    }

    /// Removes one instance. Returns `false` if it was not present.
    fn remove(&self, name: &str, id: u64) -> bool {
        let mut tasks = self.tasks.write();
        let Some(instances) = tasks.get_mut(name) else {
            return false;
        };
        let before = instances.len();
        instances.retain(|i| i.id != id);
        let removed = instances.len() != before;
        if instances.is_empty() {
            tasks.remove(name);
        }
        removed
    }

    /// Cancels every running instance registered under `name`.
    ///
    /// Returns how many instances were signalled (`0` if the name is absent).
    pub(crate) fn cancel(&self, name: &str) -> usize {
        let tasks = self.tasks.read();
        match tasks.get(name) {
            Some(instances) => {
                for i in instances {
                    i.scope.cancel();
                }
                instances.len()
            }
            None => 0,
        }
    }

    /// Returns sorted list of running task names.
    pub(crate) fn list(&self) -> Vec<String> {
        let tasks = self.tasks.read();
        let mut names: Vec<String> = tasks.keys().map(|n| n.to_string()).collect();
        names.sort_unstable();
        names
    }

    /// True if at least one instance of `name` is running.
    pub(crate) fn contains(&self, name: &str) -> bool {
        self.tasks.read().contains_key(name)
    }

    /// Number of running instances across all names.
    #[cfg(test)]
    pub(crate) fn instances(&self) -> usize {
        self.tasks.read().values().map(Vec::len).sum()
    }
}

/// Removes its instance from the registry when dropped.
///
/// Lives inside the task future, so removal happens on the task's own
/// completion path: normal return, panic, or the future being dropped.
pub(crate) struct Registration {
    registry: Arc<Registry>,
    name: Arc<str>,
    id: u64,
}

impl Registration {
    pub(crate) fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for Registration {
    fn drop(&mut self) {
        self.registry.remove(&self.name, self.id);
    }
}
