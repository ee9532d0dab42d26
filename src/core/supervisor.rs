//! # Supervisor: starts named tasks and cancels them by name.
//!
//! The [`Supervisor`] allocates one child scope per task from the root scope,
//! registers it in the [`Registry`] and counts the task in the shared
//! [`TaskTracker`] (the completion counter the
//! [`ShutdownCoordinator`](crate::ShutdownCoordinator) waits on).
//!
//! ## Lifecycle of one task
//! ```text
//! start(name, body)
//!   ├─► scope = root.child_token()
//!   ├─► tracked = tracker.token()                (counter + 1)
//!   ├─► registration = registry.register(name, scope)
//!   └─► spawn {
//!         body(scope).catch_unwind().await
//!         log outcome (debug)
//!         drop(TaskGuard):
//!           1. registration  → registry.remove(name, id)
//!           2. tracked       → counter - 1
//!       }
//!
//! cancel(name) ──► registry.cancel(name) ──► scope.cancel() for each instance
//! ```
//!
//! ## Rules
//! - `start` and `cancel` never fail and never block on the task
//! - the registry entry is removed **before** the counter is decremented, so
//!   when the counter reaches zero the registry is already empty
//! - panics in a body are caught and logged; they count as a return
//! - duplicate names are allowed; `cancel(name)` signals every instance

use std::any::Any;
use std::borrow::Cow;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tokio_util::task::task_tracker::TaskTrackerToken;

use crate::{
    core::{
        builder::SupervisorBuilder,
        config::Config,
        registry::{Registration, Registry},
        shutdown::{ShutdownCoordinator, ShutdownState},
    },
    error::TaskError,
    logging::Logger,
    tasks::TaskRef,
};

/// State shared by the [`Supervisor`] handles and the [`ShutdownCoordinator`].
pub(crate) struct Inner {
    pub(crate) cfg: Config,
    /// Root scope; every task scope is a direct child.
    pub(crate) root: CancellationToken,
    pub(crate) registry: Arc<Registry>,
    /// Completion counter.
    pub(crate) tracker: TaskTracker,
    pub(crate) logger: Arc<dyn Logger>,
    pub(crate) state: watch::Sender<ShutdownState>,
    /// Runtime used for spawning (lets `start` be called off-runtime).
    pub(crate) runtime: Option<Handle>,
}

/// Keeps a task registered and counted while it is in flight.
///
/// Field order is drop order: the registry entry goes first, then the
/// counter is decremented.
struct TaskGuard {
    registration: Registration,
    _tracked: TaskTrackerToken,
}

/// Starts, tracks and cancels named tasks.
///
/// Cheap to clone; all clones share the same registry and root scope.
///
/// ## Example
/// ```rust,no_run
/// use std::time::Duration;
/// use daemonvisor::{Config, Supervisor, TaskError};
///
/// #[tokio::main]
/// async fn main() {
///     let (sup, shutdown) = Supervisor::builder(Config::with_grace_secs(5)).build();
///
///     sup.start("ticker", |ctx| async move {
///         while !ctx.is_cancelled() {
///             tokio::time::sleep(Duration::from_millis(250)).await;
///         }
///         Err(TaskError::Canceled)
///     });
///
///     // Blocks until SIGINT/SIGTERM and the grace period resolve.
///     let outcome = shutdown.wait_for_exit().await;
///     println!("{outcome}");
/// }
/// ```
#[derive(Clone)]
pub struct Supervisor {
    pub(crate) inner: Arc<Inner>,
}

impl Supervisor {
    /// Returns a builder for a supervisor and its shutdown coordinator.
    pub fn builder(cfg: Config) -> SupervisorBuilder {
        SupervisorBuilder::new(cfg)
    }

    /// Builds a supervisor with default logger, OS signals and no parent scope.
    ///
    /// Outside a tokio runtime, tasks can only be started from runtime
    /// threads; use [`SupervisorBuilder::with_runtime`] to lift that. A start
    /// with no runtime in reach is logged at error level and dropped.
    pub fn new(cfg: Config) -> (Supervisor, ShutdownCoordinator) {
        SupervisorBuilder::new(cfg).build()
    }

    /// Starts `body` under `name`.
    ///
    /// The body receives its own scope (a child of the root scope). It is
    /// cancelled by [`cancel`](Self::cancel) with the same name, or when
    /// shutdown begins. Errors and panics of the body are logged at debug
    /// level and go no further.
    ///
    /// Returns immediately. A task started after shutdown began gets an
    /// already-cancelled scope.
    pub fn start<F, Fut>(&self, name: impl Into<Cow<'static, str>>, body: F)
    where
        F: FnOnce(CancellationToken) -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), TaskError>> + Send + 'static,
    {
        let name: Cow<'static, str> = name.into();
        let (guard, scope) = self.admit(&name);
        let logger = Arc::clone(&self.inner.logger);

        let Some(handle) = self.handle(&name) else {
            return;
        };
        drop(handle.spawn(async move {
            let res = AssertUnwindSafe(async move { body(scope).await })
                .catch_unwind()
                .await;
            report(logger.as_ref(), guard.registration.name(), res);
            drop(guard);
        }));
    }

    /// Starts a [`Task`](crate::Task) under its own [`name`](crate::Task::name).
    pub fn start_task(&self, task: TaskRef) {
        let name = task.name().to_string();
        self.start(name, move |ctx| async move { task.run(ctx).await });
    }

    /// Starts a body that blocks its thread, on tokio's blocking pool.
    ///
    /// Same registration and cancellation rules as [`start`](Self::start);
    /// the body must poll `ctx.is_cancelled()` itself.
    ///
    /// A forced exit does not stop a blocking body: dropping the runtime
    /// waits for it. Call `std::process::exit` after a forced
    /// [`ExitOutcome`](crate::ExitOutcome) if such a body may be stuck.
    pub fn start_blocking<F>(&self, name: impl Into<Cow<'static, str>>, body: F)
    where
        F: FnOnce(CancellationToken) -> Result<(), TaskError> + Send + 'static,
    {
        let name: Cow<'static, str> = name.into();
        let (guard, scope) = self.admit(&name);
        let logger = Arc::clone(&self.inner.logger);

        let run = move || {
            let res = std::panic::catch_unwind(AssertUnwindSafe(move || body(scope)));
            report(logger.as_ref(), guard.registration.name(), res);
            drop(guard);
        };
        if let Some(handle) = self.handle(&name) {
            drop(handle.spawn_blocking(run));
        }
    }

    /// Cancels every running task registered under `name`.
    ///
    /// Does not wait for the tasks to return. Unknown or already finished
    /// names are ignored. Returns `true` if at least one task was signalled.
    pub fn cancel(&self, name: &str) -> bool {
        let n = self.inner.registry.cancel(name);
        if n == 0 {
            self.inner
                .logger
                .trace_args(format_args!("cancel {name:?}: no running task"));
        } else {
            self.inner
                .logger
                .debug_args(format_args!("cancel {name:?}: {n} instance(s) signalled"));
        }
        n > 0
    }

    /// Cancels the root scope, and with it every task.
    ///
    /// The shutdown coordinator observes this and enters its grace period.
    pub fn cancel_all(&self) {
        self.inner.root.cancel();
    }

    /// Returns sorted list of running task names.
    pub fn list(&self) -> Vec<String> {
        self.inner.registry.list()
    }

    /// Returns true if a task with this name is running.
    pub fn is_running(&self, name: &str) -> bool {
        self.inner.registry.contains(name)
    }

    /// Number of tasks started and not yet returned.
    pub fn active(&self) -> usize {
        self.inner.tracker.len()
    }

    /// Current shutdown state.
    pub fn state(&self) -> ShutdownState {
        *self.inner.state.borrow()
    }

    /// Watch channel of shutdown state transitions.
    pub fn subscribe_state(&self) -> watch::Receiver<ShutdownState> {
        self.inner.state.subscribe()
    }

    /// Root scope. Cancelled once shutdown begins.
    pub fn root_scope(&self) -> &CancellationToken {
        &self.inner.root
    }

    /// Counts, scopes and registers a new task.
    fn admit(&self, name: &str) -> (TaskGuard, CancellationToken) {
        let scope = self.inner.root.child_token();
        let tracked = self.inner.tracker.token();
        let registration = self.inner.registry.register(name, scope.clone());

        self.inner
            .logger
            .debug_args(format_args!("task {name:?} started"));
        (
            TaskGuard {
                registration,
                _tracked: tracked,
            },
            scope,
        )
    }

    /// Runtime to spawn on: the configured one, else the caller's.
    ///
    /// `None` is logged; the caller drops the body and its guard with it.
    fn handle(&self, name: &str) -> Option<Handle> {
        let handle = self
            .inner
            .runtime
            .clone()
            .or_else(|| Handle::try_current().ok());
        if handle.is_none() {
            self.inner.logger.error_args(format_args!(
                "task {name:?} dropped: no tokio runtime to spawn on"
            ));
        }
        handle
    }
}

/// Logs how a task body returned.
fn report(
    logger: &dyn Logger,
    name: &str,
    res: Result<Result<(), TaskError>, Box<dyn Any + Send>>,
) {
    match res {
        Ok(Ok(())) => logger.debug_args(format_args!("task {name:?} finished")),
        Ok(Err(e)) if e.is_canceled() => {
            logger.debug_args(format_args!("task {name:?} stopped after cancellation"))
        }
        Ok(Err(e)) => logger.debug_args(format_args!(
            "task {name:?} returned error ({}): {e}",
            e.as_label()
        )),
        Err(panic) => logger.debug_args(format_args!(
            "task {name:?} panicked: {}",
            panic_message(panic.as_ref())
        )),
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(s) = panic.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.as_str()
    } else {
        "non-string panic payload"
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::logging::{Level, testing::Recorder};
    use crate::signals;

    fn supervisor() -> (Supervisor, ShutdownCoordinator, Arc<Recorder>) {
        let rec = Arc::new(Recorder::default());
        let (_tx, source) = signals::channel();
        let (sup, coord) = Supervisor::builder(Config::default())
            .with_logger(rec.clone())
            .with_signals(source)
            .build();
        (sup, coord, rec)
    }

    async fn until<F: Fn() -> bool>(cond: F) {
        while !cond() {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    }

    #[tokio::test]
    async fn task_is_registered_until_it_returns() {
        let (sup, _coord, _rec) = supervisor();
        let (tx, rx) = tokio::sync::oneshot::channel::<()>();

        sup.start("waiter", |_ctx| async move {
            let _ = rx.await;
            Ok(())
        });
        assert!(sup.is_running("waiter"));
        assert_eq!(sup.active(), 1);

        tx.send(()).unwrap();
        until(|| sup.active() == 0).await;
        assert!(!sup.is_running("waiter"));
        assert!(sup.list().is_empty());
    }

    #[tokio::test]
    async fn cancel_signals_only_the_named_task() {
        let (sup, _coord, _rec) = supervisor();
        for name in ["a", "b"] {
            sup.start(name, |ctx| async move {
                ctx.cancelled().await;
                Err(TaskError::Canceled)
            });
        }

        assert!(sup.cancel("a"));
        until(|| !sup.is_running("a")).await;
        assert_eq!(sup.list(), vec!["b".to_string()]);
        assert_eq!(sup.active(), 1);
    }

    #[tokio::test]
    async fn cancel_unknown_or_finished_is_noop() {
        let (sup, _coord, _rec) = supervisor();
        assert!(!sup.cancel("never-started"));

        sup.start("quick", |_ctx| async { Ok(()) });
        until(|| sup.active() == 0).await;
        assert!(!sup.cancel("quick"));
        assert!(!sup.cancel("quick"));
    }

    #[tokio::test]
    async fn duplicate_names_are_all_cancelled() {
        let (sup, _coord, _rec) = supervisor();
        for _ in 0..3 {
            sup.start("dup", |ctx| async move {
                ctx.cancelled().await;
                Ok(())
            });
        }
        assert_eq!(sup.active(), 3);
        assert_eq!(sup.list(), vec!["dup".to_string()]);

        assert!(sup.cancel("dup"));
        until(|| sup.active() == 0).await;
        assert!(!sup.is_running("dup"));
    }

    #[tokio::test]
    async fn panicking_task_is_deregistered_and_logged() {
        let (sup, _coord, rec) = supervisor();
        sup.start("boom", |_ctx| async move {
            if true {
                panic!("kaboom");
            }
            Ok(())
        });

        until(|| sup.active() == 0).await;
        assert!(!sup.is_running("boom"));
        assert!(rec.contains(Level::Debug, "panicked: kaboom"));
    }

    #[tokio::test]
    async fn task_error_is_logged_not_surfaced() {
        let (sup, _coord, rec) = supervisor();
        sup.start("flaky", |_ctx| async { Err(TaskError::fail("disk full")) });

        until(|| sup.active() == 0).await;
        assert!(rec.contains(Level::Debug, "disk full"));
        assert!(rec.lines().iter().all(|(level, _)| *level < Level::Warn));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn blocking_task_observes_cancellation() {
        let (sup, _coord, _rec) = supervisor();
        sup.start_blocking("spinner", |ctx| {
            while !ctx.is_cancelled() {
                std::thread::sleep(Duration::from_millis(1));
            }
            Err(TaskError::Canceled)
        });
        assert!(sup.is_running("spinner"));

        sup.cancel("spinner");
        until(|| sup.active() == 0).await;
        assert!(!sup.is_running("spinner"));
    }

    #[tokio::test]
    async fn start_task_uses_task_name() {
        let (sup, _coord, _rec) = supervisor();
        let task: TaskRef = crate::TaskFn::arc("named", |ctx: CancellationToken| async move {
            ctx.cancelled().await;
            Ok(())
        });

        sup.start_task(task);
        assert!(sup.is_running("named"));
        sup.cancel_all();
        until(|| sup.active() == 0).await;
    }

    #[tokio::test]
    async fn start_after_root_cancelled_gets_cancelled_scope() {
        let (sup, _coord, _rec) = supervisor();
        sup.cancel_all();

        let (tx, rx) = tokio::sync::oneshot::channel();
        sup.start("late", |ctx| async move {
            let _ = tx.send(ctx.is_cancelled());
            Ok(())
        });
        assert!(rx.await.unwrap());
    }

    #[test]
    fn start_from_plain_thread_with_runtime_handle() {
        let rt = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .unwrap();
        let (_tx, source) = signals::channel();
        let (sup, _coord) = Supervisor::builder(Config::default())
            .with_runtime(rt.handle().clone())
            .with_signals(source)
            .build();

        let (done_tx, done_rx) = std::sync::mpsc::channel();
        std::thread::spawn({
            let sup = sup.clone();
            move || {
                sup.start("off-runtime", |_ctx| async move {
                    let _ = done_tx.send(());
                    Ok(())
                });
            }
        })
        .join()
        .unwrap();

        done_rx
            .recv_timeout(Duration::from_secs(5))
            .expect("task should run on the provided runtime");
        rt.block_on(until(|| sup.active() == 0));
    }

    #[test]
    fn start_without_any_runtime_is_logged_and_dropped() {
        let rec = Arc::new(Recorder::default());
        let (_tx, source) = signals::channel();
        let (sup, _coord) = Supervisor::builder(Config::default())
            .with_logger(rec.clone())
            .with_signals(source)
            .build();

        let joined = std::thread::spawn({
            let sup = sup.clone();
            move || {
                sup.start("orphan", |_ctx| async { Ok(()) });
                sup.start_blocking("orphan-blocking", |_ctx| Ok(()));
            }
        })
        .join();

        assert!(joined.is_ok());
        assert_eq!(sup.active(), 0);
        assert!(sup.list().is_empty());
        assert!(rec.contains(Level::Error, "\"orphan\" dropped"));
        assert!(rec.contains(Level::Error, "\"orphan-blocking\" dropped"));
    }
}
