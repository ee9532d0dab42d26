//! # Shutdown coordinator: signal-driven graceful exit.
//!
//! [`ShutdownCoordinator::wait_for_exit`] is the single blocking call an
//! application makes after starting its tasks. It returns once the process
//! may exit, reporting how shutdown ended as an [`ExitOutcome`].
//!
//! ## State machine
//! ```text
//!                 ┌──────────────────────────────────────────────┐
//!                 │ Running                                      │
//!                 │   select {                                   │
//!                 │     counter == 0        ──► Exited(NoTasks)  │
//!                 │     interrupt-class sig ──┐                  │
//!                 │     root scope cancelled ─┤                  │
//!                 │   }                       │                  │
//!                 └───────────────────────────┼──────────────────┘
//!                                             ▼
//!                      root.cancel()  (propagates to every task scope)
//!                                             ▼
//!                 ┌─────────────────────────────────────────────────────┐
//!                 │ GracePeriod                                         │
//!                 │   select {                                          │
//!                 │     counter == 0        ──► Exited(Graceful)         │
//!                 │     interrupt-class sig ──► Exited(ForcedByOperator) │
//!                 │     sleep(grace)        ──► Exited(ForcedByTimeout)  │
//!                 │   }                                                 │
//!                 └─────────────────────────────────────────────────────┘
//! ```
//!
//! ## Rules
//! - the first event to fire decides the outcome; exactly one outcome line is logged
//! - the grace timer starts once, on entry to `GracePeriod`, and is never reset
//! - non-interrupt signals (`Hangup`) are logged and ignored in every state
//! - a closed signal source disables only the signal branch
//! - on `Exited` the root scope is cancelled (tasks started late still see it)
//! - forced outcomes do not wait for stuck tasks; they keep running until the process exits

use std::fmt;
use std::sync::Arc;

use tokio::time;

use crate::{
    core::supervisor::Inner,
    signals::{OsSignals, Signal, SignalSource},
};

/// Shutdown progress, observable through
/// [`Supervisor::state`](crate::Supervisor::state).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShutdownState {
    /// Tasks run normally.
    #[default]
    Running,
    /// Root scope cancelled; waiting up to the grace period for tasks.
    GracePeriod,
    /// Terminal. `wait_for_exit` has returned or is returning.
    Exited,
}

/// How [`ShutdownCoordinator::wait_for_exit`] ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitOutcome {
    /// Every task returned before any shutdown signal; no grace period ran.
    NoTasks,
    /// Every task returned within the grace period.
    Graceful,
    /// A second interrupt-class signal arrived during the grace period.
    ForcedByOperator,
    /// The grace period elapsed with tasks still running.
    ForcedByTimeout,
}

impl ExitOutcome {
    /// True if the exit happened with tasks possibly still running.
    ///
    /// Bodies started with
    /// [`Supervisor::start_blocking`](crate::Supervisor::start_blocking) keep
    /// the runtime alive on drop; exit the process explicitly after a forced
    /// outcome.
    pub fn is_forced(self) -> bool {
        matches!(self, ExitOutcome::ForcedByOperator | ExitOutcome::ForcedByTimeout)
    }

    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(self) -> &'static str {
        match self {
            ExitOutcome::NoTasks => "no_tasks",
            ExitOutcome::Graceful => "graceful",
            ExitOutcome::ForcedByOperator => "forced_by_operator",
            ExitOutcome::ForcedByTimeout => "forced_by_timeout",
        }
    }
}

impl fmt::Display for ExitOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}

/// What moved the coordinator out of `Running`.
enum Trigger {
    Signal(Signal),
    RootCancelled,
}

/// Drives the shutdown state machine for one [`Supervisor`](crate::Supervisor).
///
/// Built together with its supervisor by
/// [`SupervisorBuilder::build`](crate::SupervisorBuilder::build).
pub struct ShutdownCoordinator {
    inner: Arc<Inner>,
    signals: Option<Box<dyn SignalSource>>,
}

impl ShutdownCoordinator {
    pub(crate) fn new(inner: Arc<Inner>, signals: Option<Box<dyn SignalSource>>) -> Self {
        Self { inner, signals }
    }

    /// Blocks until the process may exit.
    ///
    /// Installs OS signal hooks (unless a source was injected with
    /// [`SupervisorBuilder::with_signals`](crate::SupervisorBuilder::with_signals)),
    /// then runs the state machine described in the module docs. Consumes the
    /// coordinator, so it runs at most once.
    pub async fn wait_for_exit(self) -> ExitOutcome {
        let Self { inner, signals } = self;
        let mut signals = match signals {
            Some(s) => s,
            None => Box::new(OsSignals::install(inner.logger.as_ref())),
        };

        let outcome = drive(&inner, &mut *signals).await;

        inner.root.cancel();
        inner.state.send_replace(ShutdownState::Exited);
        outcome
    }
}

/// Runs `Running` → `GracePeriod` → `Exited` and returns the outcome.
async fn drive(inner: &Inner, signals: &mut dyn SignalSource) -> ExitOutcome {
    let log = inner.logger.as_ref();
    let mut signals_open = true;

    // Lets the counter resolve at zero; later `start` calls still count.
    inner.tracker.close();

    let trigger = loop {
        tokio::select! {
            biased;
            _ = inner.tracker.wait() => {
                log.info("no running tasks left, exiting");
                return ExitOutcome::NoTasks;
            }
            sig = signals.recv(), if signals_open => match sig {
                Some(s) if s.is_interrupt_class() => {
                    log.warn_args(format_args!("got signal: {s}"));
                    break Trigger::Signal(s);
                }
                Some(s) => log.info_args(format_args!("got signal: {s}; ignoring")),
                None => {
                    log.debug("signal source closed");
                    signals_open = false;
                }
            },
            _ = inner.root.cancelled() => break Trigger::RootCancelled,
        }
    };

    let grace = inner.cfg.grace_period();
    inner.state.send_replace(ShutdownState::GracePeriod);
    inner.root.cancel();
    match trigger {
        Trigger::Signal(s) => log.warn_args(format_args!(
            "waiting {grace:?} for graceful exit after {s}; send interrupt again to force exit"
        )),
        Trigger::RootCancelled => log.warn_args(format_args!(
            "root scope cancelled; waiting {grace:?} for graceful exit"
        )),
    }

    let deadline = time::sleep(grace);
    tokio::pin!(deadline);

    loop {
        tokio::select! {
            biased;
            _ = inner.tracker.wait() => {
                log.info("all tasks exited gracefully");
                return ExitOutcome::Graceful;
            }
            sig = signals.recv(), if signals_open => match sig {
                Some(s) if s.is_interrupt_class() => {
                    log.warn_args(format_args!("got signal: {s}; forced exit by operator"));
                    return ExitOutcome::ForcedByOperator;
                }
                Some(s) => log.info_args(format_args!("got signal: {s}; ignoring")),
                None => {
                    log.debug("signal source closed");
                    signals_open = false;
                }
            },
            _ = &mut deadline => {
                log.warn_args(format_args!(
                    "timed out after {grace:?} waiting for graceful exit, forcing exit; still running: {:?}",
                    inner.registry.list()
                ));
                return ExitOutcome::ForcedByTimeout;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::time::Instant;
    use tokio_util::sync::CancellationToken;

    use super::*;
    use crate::logging::{Level, testing::Recorder};
    use crate::signals::{self, SignalSender};
    use crate::{Config, Supervisor, TaskError};

    fn build(grace_secs: i64) -> (Supervisor, ShutdownCoordinator, SignalSender, Arc<Recorder>) {
        let rec = Arc::new(Recorder::default());
        let (tx, source) = signals::channel();
        let (sup, coord) = Supervisor::builder(Config::with_grace_secs(grace_secs))
            .with_logger(rec.clone())
            .with_signals(source)
            .build();
        (sup, coord, tx, rec)
    }

    fn cooperative(sup: &Supervisor, name: &'static str, stop_after: Duration) {
        sup.start(name, move |ctx| async move {
            ctx.cancelled().await;
            time::sleep(stop_after).await;
            Err(TaskError::Canceled)
        });
    }

    /// Ignores its scope and outlives every grace period used here.
    fn stubborn(sup: &Supervisor, name: &'static str) {
        sup.start(name, |_ctx| async move {
            time::sleep(Duration::from_secs(3600)).await;
            Ok(())
        });
    }

    fn assert_elapsed(start: Instant, expected: Duration) {
        let elapsed = start.elapsed();
        assert!(
            elapsed >= expected && elapsed < expected + Duration::from_millis(50),
            "elapsed {elapsed:?}, expected {expected:?}"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn no_tasks_exits_without_grace_period() {
        let (sup, coord, _tx, rec) = build(5);
        let mut states = sup.subscribe_state();

        assert_eq!(coord.wait_for_exit().await, ExitOutcome::NoTasks);
        assert_eq!(sup.state(), ShutdownState::Exited);
        assert!(rec.contains(Level::Info, "no running tasks"));
        assert!(!rec.contains(Level::Warn, "waiting"));

        // Only the terminal transition was published.
        assert!(states.has_changed().unwrap());
        assert_eq!(*states.borrow_and_update(), ShutdownState::Exited);
    }

    #[tokio::test(start_paused = true)]
    async fn tasks_finishing_on_their_own_exit_without_grace_period() {
        let (sup, coord, _tx, _rec) = build(5);
        sup.start("short", |_ctx| async {
            time::sleep(Duration::from_secs(1)).await;
            Ok(())
        });

        assert_eq!(coord.wait_for_exit().await, ExitOutcome::NoTasks);
        assert_eq!(sup.active(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn interrupt_then_cooperative_tasks_exit_gracefully() {
        let (sup, coord, tx, rec) = build(5);
        cooperative(&sup, "a", Duration::from_secs(1));
        cooperative(&sup, "b", Duration::from_secs(2));

        tx.interrupt();
        let start = Instant::now();
        assert_eq!(coord.wait_for_exit().await, ExitOutcome::Graceful);

        assert_elapsed(start, Duration::from_secs(2));
        assert_eq!(sup.active(), 0);
        assert!(sup.list().is_empty());
        assert!(rec.contains(Level::Warn, "got signal: interrupt"));
        assert!(rec.contains(Level::Warn, "waiting 5s"));
        assert!(rec.contains(Level::Info, "all tasks exited gracefully"));
    }

    #[tokio::test(start_paused = true)]
    async fn stubborn_task_forces_exit_after_grace() {
        let (sup, coord, tx, rec) = build(3);
        stubborn(&sup, "stuck");
        cooperative(&sup, "polite", Duration::ZERO);

        tx.send(Signal::Terminate);
        let start = Instant::now();
        assert_eq!(coord.wait_for_exit().await, ExitOutcome::ForcedByTimeout);

        assert_elapsed(start, Duration::from_secs(3));
        assert!(sup.is_running("stuck"));
        assert!(!sup.is_running("polite"));
        assert!(rec.contains(Level::Warn, "still running: [\"stuck\"]"));
    }

    #[tokio::test(start_paused = true)]
    async fn second_interrupt_forces_exit_immediately() {
        let (sup, coord, tx, rec) = build(30);
        stubborn(&sup, "stuck");

        let sender = tx.clone();
        tokio::spawn(async move {
            sender.interrupt();
            time::sleep(Duration::from_secs(1)).await;
            sender.interrupt();
        });

        let start = Instant::now();
        assert_eq!(coord.wait_for_exit().await, ExitOutcome::ForcedByOperator);
        assert!(start.elapsed() < Duration::from_secs(30));
        assert!(rec.contains(Level::Warn, "forced exit by operator"));
        assert!(!rec.contains(Level::Warn, "timed out"));
    }

    #[tokio::test(start_paused = true)]
    async fn hangup_is_ignored() {
        let (sup, coord, tx, rec) = build(5);
        sup.start("worker", |ctx| async move {
            ctx.cancelled().await;
            Ok(())
        });

        tx.send(Signal::Hangup);
        let sender = tx.clone();
        tokio::spawn(async move {
            time::sleep(Duration::from_secs(10)).await;
            sender.interrupt();
        });

        let start = Instant::now();
        assert_eq!(coord.wait_for_exit().await, ExitOutcome::Graceful);
        assert_elapsed(start, Duration::from_secs(10));
        assert!(rec.contains(Level::Info, "got signal: hangup; ignoring"));
    }

    #[tokio::test(start_paused = true)]
    async fn hangup_during_grace_does_not_force() {
        let (sup, coord, tx, _rec) = build(2);
        stubborn(&sup, "stuck");

        tx.interrupt();
        tx.send(Signal::Hangup);
        assert_eq!(coord.wait_for_exit().await, ExitOutcome::ForcedByTimeout);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_all_enters_grace_period() {
        let (sup, coord, _tx, rec) = build(5);
        cooperative(&sup, "a", Duration::from_millis(500));
        stubborn(&sup, "b");

        let handle = sup.clone();
        tokio::spawn(async move {
            time::sleep(Duration::from_secs(1)).await;
            handle.cancel_all();
        });

        let start = Instant::now();
        assert_eq!(coord.wait_for_exit().await, ExitOutcome::ForcedByTimeout);
        assert_elapsed(start, Duration::from_secs(6));
        assert!(rec.contains(Level::Warn, "root scope cancelled"));
    }

    #[tokio::test(start_paused = true)]
    async fn parent_scope_cancellation_propagates() {
        let parent = CancellationToken::new();
        let (tx, source) = signals::channel();
        let (sup, coord) = Supervisor::builder(Config::default())
            .with_parent(parent.clone())
            .with_logger(Arc::new(Recorder::default()))
            .with_signals(source)
            .build();
        cooperative(&sup, "a", Duration::ZERO);

        parent.cancel();
        assert_eq!(coord.wait_for_exit().await, ExitOutcome::Graceful);
        drop(tx);
    }

    #[tokio::test(start_paused = true)]
    async fn closed_signal_source_still_times_out() {
        let (sup, coord, tx, _rec) = build(1);
        stubborn(&sup, "stuck");
        tx.interrupt();
        drop(tx);

        assert_eq!(coord.wait_for_exit().await, ExitOutcome::ForcedByTimeout);
    }

    #[tokio::test(start_paused = true)]
    async fn state_moves_through_grace_period() {
        let (sup, coord, tx, _rec) = build(5);
        cooperative(&sup, "a", Duration::from_secs(1));
        let mut states = sup.subscribe_state();
        assert_eq!(sup.state(), ShutdownState::Running);

        tx.interrupt();
        let waiter = tokio::spawn(coord.wait_for_exit());

        states.changed().await.unwrap();
        assert_eq!(*states.borrow_and_update(), ShutdownState::GracePeriod);
        assert!(sup.root_scope().is_cancelled());

        assert_eq!(waiter.await.unwrap(), ExitOutcome::Graceful);
        assert_eq!(sup.state(), ShutdownState::Exited);
    }

    #[test]
    fn outcome_labels() {
        assert!(ExitOutcome::ForcedByTimeout.is_forced());
        assert!(ExitOutcome::ForcedByOperator.is_forced());
        assert!(!ExitOutcome::Graceful.is_forced());
        assert_eq!(ExitOutcome::NoTasks.to_string(), "no_tasks");
    }
}
