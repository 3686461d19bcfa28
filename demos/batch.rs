//! # Example: batch
//!
//! Sums all primes below 100 with a bounded batch of jobs.
//!
//! Demonstrates how to:
//! - Admit a whole batch at once with [`JobHandler::try_run_n`].
//! - Limit how many batch jobs run concurrently.
//! - Drain the batch with [`JobHandler::shutdown`].
//!
//! ## Flow
//! ```text
//! try_run_n(100, 5, is_prime)
//!     ├─► admit 100 jobs (all-or-nothing)
//!     ├─► spawn 100 tasks, at most 5 inside is_prime at a time
//!     └─► each task marks itself done
//! shutdown(grace)
//!     ├─► stop()
//!     └─► wait_all() bounded by grace
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example batch
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use jobhandler::JobHandler;
use tracing_subscriber::EnvFilter;

fn is_prime(n: usize) -> bool {
    n > 1 && (2..n).take_while(|i| i * i <= n).all(|i| n % i != 0)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let jobs = JobHandler::builder().with_name("primes").build();
    let sum = Arc::new(AtomicU64::new(0));

    let acc = Arc::clone(&sum);
    let admitted = jobs.try_run_n(100, 5, move |i| {
        let acc = Arc::clone(&acc);
        async move {
            if is_prime(i) {
                acc.fetch_add(i as u64, Ordering::Relaxed);
            }
        }
    });
    if !admitted {
        println!("[main] failed to take on jobs");
    }

    jobs.shutdown(Duration::from_secs(5)).await?;
    println!("prime sum for 1..100 is {}", sum.load(Ordering::Relaxed));
    Ok(())
}
