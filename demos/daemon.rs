//! # Example: daemon
//!
//! Two routines that take different amounts of time to stop once cancelled.
//! With the default 5s grace period, press Ctrl-C once:
//! - routine A stops after 3s
//! - routine B would need 7s, so the exit is forced by timeout
//!
//! Press Ctrl-C a second time during the grace period to force exit at once.
//!
//! ## Run
//! ```bash
//! RUST_LOG=debug cargo run --example daemon
//! ```

use std::time::Duration;

use daemonvisor::{Config, Supervisor, TaskError};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

const STOP_A: Duration = Duration::from_secs(3);
const STOP_B: Duration = Duration::from_secs(7);

async fn routine(
    name: &'static str,
    stop_after: Duration,
    ctx: CancellationToken,
) -> Result<(), TaskError> {
    loop {
        tokio::select! {
            _ = ctx.cancelled() => {
                tracing::info!("{name} will stop in {stop_after:?}");
                tokio::time::sleep(stop_after).await;
                tracing::info!("{name} stopped");
                return Err(TaskError::Canceled);
            }
            _ = tokio::time::sleep(Duration::from_secs(1)) => {
                tracing::info!("{name} loop");
            }
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let (sup, shutdown) = Supervisor::new(Config::from_env());

    sup.start("routine A", |ctx| routine("routine A", STOP_A, ctx));
    sup.start("routine B", |ctx| routine("routine B", STOP_B, ctx));

    let outcome = shutdown.wait_for_exit().await;
    tracing::info!(%outcome, still_running = ?sup.list(), "daemon exiting");

    if outcome.is_forced() {
        std::process::exit(1);
    }
    Ok(())
}
