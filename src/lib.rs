//! # jobhandler
//!
//! **jobhandler** is an admission-controlled, drainable job counter for
//! graceful shutdown.
//!
//! Producers ask the handler whether they may start a job. Once the handler is
//! stopped that question returns "no", in-flight jobs are left to finish, and a
//! coordinator waits until every admitted job has completed.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   producer ──try_admit(n)──┐        ┌──mark_done()── job
//!   producer ──try_run(fut)──┤        ├──guard drop─── job
//!   producer ──try_run_n()───┤        │
//!                            ▼        │
//! ┌───────────────────────────────────┴─────────────────────────┐
//! │  JobHandler                                                 │
//! │  - running flag      (true until the first stop)            │
//! │  - biased counter    (jobs + 1 phantom unit while running)  │
//! │  - stop signal       (CancellationToken, fired once)        │
//! │  - drain barrier     (opens when the counter reaches zero)  │
//! └───────────▲───────────────────────────────┬─────────────────┘
//!             │ stop()                        │ wait_all()
//!   caller / CancelSource observer      coordinator
//! ```
//!
//! ### Biased counter
//! ```text
//! new()            count = 1          (phantom: "handler is running")
//! try_admit(3)     count = 4
//! mark_done() x2   count = 2
//! stop()           count = 1          (phantom removed, stop signal fired)
//! mark_done()      count = 0  ──►  wait_all() returns
//! ```
//! Because the phantom unit is only removed by `stop`, the counter reaching
//! zero means "stopped **and** drained", and a single barrier covers both.
//!
//! ## Features
//! | Area              | Description                                              | Key items                                        |
//! |-------------------|----------------------------------------------------------|--------------------------------------------------|
//! | **Admission**     | Lock-free admission of one or many jobs.                 | [`JobHandler::try_admit`], [`JobGuard`]          |
//! | **Shutdown**      | Irreversible stop and wait for quiescence.               | [`JobHandler::stop`], [`JobHandler::wait_all`]   |
//! | **Dispatch**      | Spawn jobs with automatic completion, bounded batches.   | [`JobHandler::try_run`], [`JobHandler::try_run_n`] |
//! | **Cancellation**  | Stop when an external source fires.                     | [`CancelSource`], [`JobHandlerBuilder`]          |
//! | **Errors**        | Typed refusals and grace timeouts.                       | [`AdmitError`], [`WaitError`]                    |
//! | **Configuration** | Handler name and signal binding.                         | [`Config`]                                       |
//!
//! ## Optional features
//! - `signals` (default): [`ShutdownSignal`] and
//!   [`JobHandlerBuilder::stop_on_shutdown_signal`].
//!
//! ## Faults
//! Completing more jobs than were admitted panics with
//! `"negative job count"` or `"zero job count while running, should be at least 1"`.
//! Completing fewer makes [`JobHandler::wait_all`] wait forever.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use jobhandler::JobHandler;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let jobs = JobHandler::new();
//!
//!     let worker = jobs.clone();
//!     assert!(jobs.try_run(async move {
//!         // Loop until the handler is stopped.
//!         while worker.try_sleep(Duration::from_millis(10)).await {}
//!     }));
//!
//!     jobs.stop();
//!     jobs.wait_all().await;
//! }
//! ```
mod cancel;
mod config;
mod error;
mod handler;

#[cfg(feature = "signals")]
pub mod os_signals;

// ---- Public re-exports ----

pub use cancel::CancelSource;
pub use config::Config;
pub use error::{AdmitError, WaitError};
pub use handler::{JobGuard, JobHandler, JobHandlerBuilder};

#[cfg(feature = "signals")]
pub use os_signals::ShutdownSignal;
