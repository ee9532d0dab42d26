//! Subscriber setup for the default [`LogWriter`](super::LogWriter).

use tracing_subscriber::{EnvFilter, fmt};

/// Installs a global `tracing-subscriber` formatter.
///
/// The filter comes from `RUST_LOG`, falling back to `info`. Returns `false`
/// if a global subscriber was already installed.
pub fn init() -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(true)
        .try_init()
        .is_ok()
}
