//! # Example: worker_loop
//!
//! A periodic worker that keeps producing jobs until the process receives
//! SIGINT/SIGTERM (or Ctrl-C), then drains in-flight jobs and exits.
//!
//! Demonstrates how to:
//! - Bind OS termination signals with [`JobHandlerBuilder::stop_on_shutdown_signal`].
//! - Pace a loop with [`JobHandler::try_sleep`], which wakes early on stop.
//! - Hand a read-only stop token to jobs with [`JobHandler::stop_token`].
//!
//! ## Flow
//! ```text
//! loop {
//!   ├─► try_run(job)        refused once stopped ─► break
//!   └─► try_sleep(tick)     false once stopped   ─► break
//! }
//! Ctrl-C ──► ShutdownSignal ──► stop()
//! wait_all_with_grace(5s)
//! ```
//!
//! ## Run
//! ```bash
//! RUST_LOG=debug cargo run --example worker_loop
//! # press Ctrl-C to stop
//! ```

use std::time::Duration;

use jobhandler::{JobHandler, JobHandlerBuilder};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let jobs: JobHandler = JobHandlerBuilder::default()
        .with_name("worker-loop")
        .stop_on_shutdown_signal()
        .build();

    let mut tick: u64 = 0;
    loop {
        tick += 1;
        let stop = jobs.stop_token();
        let started = jobs.try_run(async move {
            tokio::select! {
                _ = tokio::time::sleep(Duration::from_millis(700)) => {
                    info!(tick, "job finished");
                }
                _ = stop.cancelled() => {
                    info!(tick, "job wrapping up early");
                }
            }
        });
        if !started {
            break;
        }
        if !jobs.try_sleep(Duration::from_millis(250)).await {
            break;
        }
    }

    info!("shutdown requested, draining");
    jobs.wait_all_with_grace(Duration::from_secs(5)).await?;
    info!("all jobs done");
    Ok(())
}
