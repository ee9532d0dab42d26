use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use crate::{
    core::{
        config::Config,
        registry::Registry,
        shutdown::{ShutdownCoordinator, ShutdownState},
        supervisor::{Inner, Supervisor},
    },
    logging::{LogWriter, Logger},
    signals::SignalSource,
};

/// Builder for a [`Supervisor`] and its [`ShutdownCoordinator`].
///
/// Every option has a default:
/// - parent scope: none (the root scope is unbounded)
/// - logger: [`LogWriter`]
/// - signals: OS signals, installed when `wait_for_exit` is called
/// - runtime: the tokio runtime current at [`build`](Self::build), if any
pub struct SupervisorBuilder {
    cfg: Config,
    parent: Option<CancellationToken>,
    logger: Option<Arc<dyn Logger>>,
    signals: Option<Box<dyn SignalSource>>,
    runtime: Option<Handle>,
}

impl SupervisorBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            parent: None,
            logger: None,
            signals: None,
            runtime: None,
        }
    }

    /// Derives the root scope from `parent`.
    ///
    /// Cancelling `parent` cancels every task and starts the grace period.
    pub fn with_parent(mut self, parent: CancellationToken) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Sets the logger used by the supervisor and the coordinator.
    pub fn with_logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Replaces OS signals with another notification source.
    pub fn with_signals(mut self, signals: impl SignalSource) -> Self {
        self.signals = Some(Box::new(signals));
        self
    }

    /// Runtime that task bodies are spawned on.
    ///
    /// Needed when `start` is called from threads outside a tokio runtime.
    pub fn with_runtime(mut self, handle: Handle) -> Self {
        self.runtime = Some(handle);
        self
    }

    /// Builds the supervisor and its shutdown coordinator.
    ///
    /// The supervisor can be cloned freely; the coordinator is consumed by
    /// [`ShutdownCoordinator::wait_for_exit`].
    pub fn build(self) -> (Supervisor, ShutdownCoordinator) {
        let root = match &self.parent {
            Some(parent) => parent.child_token(),
            None => CancellationToken::new(),
        };
        let (state, _) = watch::channel(ShutdownState::Running);

        let inner = Arc::new(Inner {
            cfg: self.cfg,
            root,
            registry: Registry::new(),
            tracker: TaskTracker::new(),
            logger: self.logger.unwrap_or_else(|| Arc::new(LogWriter::new())),
            state,
            runtime: self.runtime.or_else(|| Handle::try_current().ok()),
        });

        let coordinator = ShutdownCoordinator::new(Arc::clone(&inner), self.signals);
        (Supervisor { inner }, coordinator)
    }
}
