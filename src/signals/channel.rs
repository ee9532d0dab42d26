//! # Synthetic signal source.
//!
//! [`channel`] returns a sender/source pair backed by an unbounded
//! `tokio::sync::mpsc` channel. Use it in tests, or when the embedding
//! application already owns signal handling and only forwards decisions.
//!
//! The source closes (returns `None`) once every [`SignalSender`] is dropped.

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{Signal, SignalSource};

/// Creates a connected `(SignalSender, ChannelSignals)` pair.
///
/// # Example
/// ```
/// use daemonvisor::{Signal, signals};
///
/// let (tx, _source) = signals::channel();
/// assert!(tx.send(Signal::Interrupt));
/// ```
pub fn channel() -> (SignalSender, ChannelSignals) {
    let (tx, rx) = mpsc::unbounded_channel();
    (SignalSender { tx }, ChannelSignals { rx })
}

/// Sending half of [`channel`]. Cheap to clone.
#[derive(Clone, Debug)]
pub struct SignalSender {
    tx: mpsc::UnboundedSender<Signal>,
}

impl SignalSender {
    /// Delivers `signal`. Returns `false` if the source was dropped.
    pub fn send(&self, signal: Signal) -> bool {
        self.tx.send(signal).is_ok()
    }

    /// Shorthand for `send(Signal::Interrupt)`.
    pub fn interrupt(&self) -> bool {
        self.send(Signal::Interrupt)
    }
}

/// Receiving half of [`channel`].
#[derive(Debug)]
pub struct ChannelSignals {
    rx: mpsc::UnboundedReceiver<Signal>,
}

#[async_trait]
impl SignalSource for ChannelSignals {
    async fn recv(&mut self) -> Option<Signal> {
        self.rx.recv().await
    }
}
