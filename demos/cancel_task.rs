//! # Example: cancel_task
//!
//! Demonstrates how to cancel a running task by name.
//!
//! ## Flow
//! ```text
//! main()
//!   ├─► start("worker"), start("reporter")
//!   ├─► sleep 2 seconds (let tasks run)
//!   ├─► cancel("worker")
//!   │     ├─► worker scope cancelled
//!   │     ├─► worker returns
//!   │     └─► worker removed from registry
//!   ├─► verify only "reporter" is left
//!   └─► wait_for_exit(): Ctrl-C stops "reporter"
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example cancel_task
//! ```

use std::time::Duration;

use daemonvisor::{Config, Supervisor, TaskError};
use tokio_util::sync::CancellationToken;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_max_level(tracing::Level::DEBUG).init();

    let (sup, shutdown) = Supervisor::new(Config::with_grace_secs(2));

    // 1. A long-running task that ticks every 500ms until cancelled.
    sup.start("worker", |ctx: CancellationToken| async move {
        let mut counter = 0u32;
        while !ctx.is_cancelled() {
            counter += 1;
            println!("[worker] tick #{counter}");
            tokio::time::sleep(Duration::from_millis(500)).await;
        }
        println!("[worker] detected cancellation, exiting gracefully");
        Err::<(), _>(TaskError::Canceled)
    });

    // 2. A second task that lives until shutdown.
    sup.start("reporter", |ctx: CancellationToken| async move {
        ctx.cancelled().await;
        Ok(())
    });

    // 3. Let them run, then cancel the worker by name.
    tokio::time::sleep(Duration::from_secs(2)).await;
    println!("[main] active tasks: {:?}", sup.list());
    println!("[main] cancelling 'worker': {}", sup.cancel("worker"));

    while sup.is_running("worker") {
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    anyhow::ensure!(sup.list() == ["reporter"], "only reporter should be left");
    println!("[main] active tasks after cancel: {:?}", sup.list());

    // 4. Cancelling again (or an unknown name) is a no-op.
    println!("[main] cancelling 'worker' again: {}", sup.cancel("worker"));

    println!("[main] press Ctrl-C to stop");
    let outcome = shutdown.wait_for_exit().await;
    println!("[main] exit outcome: {outcome}");
    Ok(())
}
