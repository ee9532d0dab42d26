//! # Termination notifications.
//!
//! The shutdown coordinator does not talk to the OS directly. It pulls
//! [`Signal`]s from a [`SignalSource`]:
//!
//! ```text
//!   OsSignals (SIGINT/SIGTERM/SIGQUIT/SIGHUP, Ctrl-C) ──┐
//!                                                      ├──► SignalSource::recv() ──► ShutdownCoordinator
//!   channel() → SignalSender::send(Signal)  ───────────┘
//! ```
//!
//! ## Rules
//! - Interrupt-class signals (`Interrupt`, `Terminate`, `Quit`) drive the
//!   shutdown state machine.
//! - `Hangup` is reported but never starts or forces a shutdown.
//! - `recv() == None` means the source is closed; no more signals will come.
//! - SIGKILL cannot be intercepted: the process dies at the OS level and
//!   nothing here observes it.

use std::fmt;

use async_trait::async_trait;

mod channel;
mod os;

pub use channel::{ChannelSignals, SignalSender, channel};
pub use os::OsSignals;

/// A termination notification delivered into the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signal {
    /// Operator interrupt (SIGINT, Ctrl-C).
    Interrupt,
    /// Polite termination request (SIGTERM; systemd, Kubernetes).
    Terminate,
    /// Quit request (SIGQUIT).
    Quit,
    /// Terminal hangup (SIGHUP). Not a shutdown request.
    Hangup,
}

impl Signal {
    /// True for signals that begin a graceful shutdown (and force exit when
    /// repeated during the grace period).
    pub fn is_interrupt_class(self) -> bool {
        matches!(self, Signal::Interrupt | Signal::Terminate | Signal::Quit)
    }

    /// Short lowercase name for logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Signal::Interrupt => "interrupt",
            Signal::Terminate => "terminate",
            Signal::Quit => "quit",
            Signal::Hangup => "hangup",
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Source of termination notifications consumed by the shutdown coordinator.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use daemonvisor::{Signal, SignalSource};
///
/// /// Delivers a single interrupt, then closes.
/// struct Once(bool);
///
/// #[async_trait]
/// impl SignalSource for Once {
///     async fn recv(&mut self) -> Option<Signal> {
///         if std::mem::replace(&mut self.0, true) {
///             None
///         } else {
///             Some(Signal::Interrupt)
///         }
///     }
/// }
/// ```
#[async_trait]
pub trait SignalSource: Send + 'static {
    /// Waits for the next signal. Returns `None` once the source is closed.
    ///
    /// Must be cancel-safe: the coordinator drops pending `recv` futures when
    /// another event wins its `select!`.
    async fn recv(&mut self) -> Option<Signal>;
}

#[async_trait]
impl SignalSource for Box<dyn SignalSource> {
    async fn recv(&mut self) -> Option<Signal> {
        (**self).recv().await
    }
}
