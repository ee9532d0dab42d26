//! # Cross-platform OS signal handling.
//!
//! [`OsSignals`] turns process signals into [`Signal`]s.
//!
//! ## Signals
//! **Unix platforms:**
//! - `SIGINT` (Ctrl-C in terminal) → [`Signal::Interrupt`]
//! - `SIGTERM` (default kill signal, used by systemd/Kubernetes) → [`Signal::Terminate`]
//! - `SIGQUIT` (quit signal) → [`Signal::Quit`]
//! - `SIGHUP` (terminal hangup) → [`Signal::Hangup`]
//!
//! **Windows platforms:**
//! - `Ctrl-C` via [`tokio::signal::ctrl_c`] → [`Signal::Interrupt`]
//!
//! Hooks are installed once, in [`OsSignals::install`], and stay installed for
//! the lifetime of the value, so repeated signals are not lost between `recv`
//! calls.

use async_trait::async_trait;

use super::{Signal, SignalSource};
use crate::logging::Logger;

#[cfg(unix)]
use tokio::signal::unix::{self, SignalKind};

/// Signal source backed by the operating system.
#[cfg(unix)]
pub struct OsSignals {
    sigint: Option<unix::Signal>,
    sigterm: Option<unix::Signal>,
    sigquit: Option<unix::Signal>,
    sighup: Option<unix::Signal>,
}

#[cfg(unix)]
impl OsSignals {
    /// Installs the process signal hooks.
    ///
    /// A hook that fails to install is logged at error level and skipped;
    /// the remaining hooks keep working.
    pub fn install(logger: &dyn Logger) -> Self {
        let hook = |kind: SignalKind, name: &str| match unix::signal(kind) {
            Ok(s) => Some(s),
            Err(e) => {
                logger.error_args(format_args!("failed to install {name} handler: {e}"));
                None
            }
        };

        Self {
            sigint: hook(SignalKind::interrupt(), "SIGINT"),
            sigterm: hook(SignalKind::terminate(), "SIGTERM"),
            sigquit: hook(SignalKind::quit(), "SIGQUIT"),
            sighup: hook(SignalKind::hangup(), "SIGHUP"),
        }
    }
}

#[cfg(unix)]
async fn next(sig: &mut Option<unix::Signal>) -> Option<()> {
    match sig {
        Some(s) => s.recv().await,
        None => std::future::pending().await,
    }
}

#[cfg(unix)]
#[async_trait]
impl SignalSource for OsSignals {
    async fn recv(&mut self) -> Option<Signal> {
        if self.sigint.is_none()
            && self.sigterm.is_none()
            && self.sigquit.is_none()
            && self.sighup.is_none()
        {
            return None;
        }

        tokio::select! {
            Some(()) = next(&mut self.sigint) => Some(Signal::Interrupt),
            Some(()) = next(&mut self.sigterm) => Some(Signal::Terminate),
            Some(()) = next(&mut self.sigquit) => Some(Signal::Quit),
            Some(()) = next(&mut self.sighup) => Some(Signal::Hangup),
            else => None,
        }
    }
}

/// Signal source backed by the operating system.
#[cfg(not(unix))]
pub struct OsSignals {
    _priv: (),
}

#[cfg(not(unix))]
impl OsSignals {
    /// Installs the Ctrl-C hook.
    pub fn install(_logger: &dyn Logger) -> Self {
        Self { _priv: () }
    }
}

#[cfg(not(unix))]
#[async_trait]
impl SignalSource for OsSignals {
    async fn recv(&mut self) -> Option<Signal> {
        match tokio::signal::ctrl_c().await {
            Ok(()) => Some(Signal::Interrupt),
            Err(_) => None,
        }
    }
}
