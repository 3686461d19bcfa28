//! # Example: single_job
//!
//! Minimal example of one job admitted by hand, followed by a graceful stop.
//!
//! Demonstrates how to:
//! - Admit a job with [`JobHandler::try_acquire`] and finish it with [`JobHandler::mark_done`].
//! - Stop the handler and wait for quiescence with [`JobHandler::wait_all`].
//!
//! ## Flow
//! ```text
//! JobHandler::new()          count = 1
//!     ├─► try_acquire()      count = 2
//!     ├─► mark_done()        count = 1
//!     ├─► stop()             count = 0, stop signal fired
//!     └─► wait_all()         returns
//! ```
//!
//! ## Run
//! ```bash
//! RUST_LOG=debug cargo run --example single_job
//! ```

use jobhandler::JobHandler;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let jobs = JobHandler::new();

    if jobs.try_acquire() {
        println!("[job] did some work");
        jobs.mark_done();
    }

    jobs.stop();
    jobs.wait_all().await;
    println!("[main] all jobs done, stopped={}", jobs.is_stopped());
}
