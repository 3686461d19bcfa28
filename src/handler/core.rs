//! # JobHandler: admission, completion and stop.
//!
//! The handler keeps one biased counter (see [`Quiescence`]) and a `running`
//! flag. Admission is lock-free: a load + compare-exchange loop on the counter.
//!
//! ## State machine
//! ```text
//!              try_admit(n) / mark_done()
//!                 ┌──────────────┐
//!                 ▼              │
//! new() ──► [running, count>=1] ─┘
//!                 │
//!               stop()  (phantom removed, stop signal fired)
//!                 ▼
//!          [stopped, count>=0] ── mark_done() ──► ... ──► count == 0
//!                                                            │
//!                                                   waiters released
//! ```
//!
//! ## Faults
//! Completing more units than were admitted corrupts the counter. The handler
//! panics instead of letting `wait_all` hang or return early:
//! - `"negative job count"`
//! - `"zero job count while running, should be at least 1"`

use std::borrow::Cow;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use tokio_util::sync::{CancellationToken, WaitForCancellationFutureOwned};
use tracing::{debug, trace};

use crate::error::AdmitError;

use super::builder::JobHandlerBuilder;
use super::guard::JobGuard;
use super::quiescence::{NEGATIVE_COUNT, Quiescence};

pub(crate) const ZERO_WHILE_RUNNING: &str = "zero job count while running, should be at least 1";

pub(crate) struct Inner {
    pub(crate) name: Cow<'static, str>,
    pub(crate) running: AtomicBool,
    pub(crate) stop: CancellationToken,
    pub(crate) quiescence: Quiescence,
}

/// Admission-controlled, drainable job counter.
///
/// Cloning is cheap and every clone refers to the same handler.
///
/// # Example
/// ```rust
/// use jobhandler::JobHandler;
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() {
///     let jobs = JobHandler::new();
///     if jobs.try_acquire() {
///         // do the job...
///         jobs.mark_done();
///     }
///     jobs.stop();
///     jobs.wait_all().await;
/// }
/// ```
#[derive(Clone)]
pub struct JobHandler {
    pub(crate) inner: Arc<Inner>,
}

impl JobHandler {
    /// Creates a running handler that is stopped only by [`JobHandler::stop`].
    pub fn new() -> Self {
        Self::running("jobhandler".into())
    }

    /// Creates a running handler that stops when `token` is cancelled.
    ///
    /// # Panics
    /// When `token` is not yet cancelled and this is called outside a Tokio
    /// runtime (the observer task cannot be spawned).
    pub fn with_cancellation(token: CancellationToken) -> Self {
        JobHandlerBuilder::default().cancel_on(token).build()
    }

    /// Returns a builder for a handler with a name and cancellation sources.
    pub fn builder() -> JobHandlerBuilder {
        JobHandlerBuilder::default()
    }

    pub(crate) fn running(name: Cow<'static, str>) -> Self {
        let stop = CancellationToken::new();
        Self {
            inner: Arc::new(Inner {
                name,
                running: AtomicBool::new(true),
                stop,
                quiescence: Quiescence::new(1),
            }),
        }
    }

    pub(crate) fn downgrade(&self) -> Weak<Inner> {
        Arc::downgrade(&self.inner)
    }

    /// Label given at construction, used in log events.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Attempts to admit a single job.
    ///
    /// Call [`JobHandler::mark_done`] when the job finishes.
    pub fn try_acquire(&self) -> bool {
        self.try_admit(1)
    }

    /// Attempts to admit `delta` jobs at once.
    ///
    /// Returns `false` for a negative `delta` or when the handler is stopped.
    /// `try_admit(0)` on a running handler succeeds without admitting anything.
    /// On success [`JobHandler::mark_done`] must be called once per job.
    pub fn try_admit(&self, delta: i64) -> bool {
        self.admit_units(delta).is_ok()
    }

    /// Admits `delta` jobs and returns a guard that completes them on drop.
    pub fn admit(&self, delta: i64) -> Result<JobGuard, AdmitError> {
        self.admit_units(delta)?;
        Ok(JobGuard::adopt(self.clone(), delta))
    }

    /// Admits a single job and returns a guard that completes it on drop.
    pub fn try_guard(&self) -> Option<JobGuard> {
        self.admit(1).ok()
    }

    fn admit_units(&self, delta: i64) -> Result<(), AdmitError> {
        if delta < 0 {
            return Err(AdmitError::NegativeDelta { delta });
        }
        if !self.inner.running.load(Ordering::SeqCst) {
            trace!(handler = %self.inner.name, delta, "admission refused: stopped");
            return Err(AdmitError::Stopped);
        }
        self.inner.quiescence.try_add(delta).inspect_err(|e| {
            trace!(handler = %self.inner.name, delta, reason = e.as_label(), "admission refused");
        })
    }

    /// Reports that one admitted job finished, regardless of its outcome.
    ///
    /// # Panics
    /// When called more often than jobs were admitted.
    pub fn mark_done(&self) {
        self.complete(1);
    }

    pub(crate) fn complete(&self, n: i64) {
        if n == 0 {
            return;
        }
        let left = self.inner.quiescence.sub(n);
        if left < 0 {
            panic!("{NEGATIVE_COUNT}");
        }
        if left == 0 {
            if self.inner.running.load(Ordering::SeqCst) {
                panic!("{ZERO_WHILE_RUNNING}");
            }
            self.drained();
        }
    }

    /// Stops admitting jobs.
    ///
    /// Returns `true` for the call that performed the stop and `false` if the
    /// handler was already stopped. In-flight jobs are not interrupted.
    pub fn stop(&self) -> bool {
        if self
            .inner
            .running
            .compare_exchange(true, false, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return false;
        }
        let left = self.inner.quiescence.sub(1);
        if left < 0 {
            panic!("{NEGATIVE_COUNT}");
        }
        debug!(handler = %self.inner.name, pending = left, "stopped");
        self.inner.stop.cancel();
        if left == 0 {
            self.drained();
        }
        true
    }

    fn drained(&self) {
        debug!(handler = %self.inner.name, "drained");
        self.inner.quiescence.release();
    }

    /// Returns `true` once the handler no longer admits jobs.
    pub fn is_stopped(&self) -> bool {
        !self.inner.running.load(Ordering::SeqCst)
    }

    /// Returns a future that completes once the handler is stopped.
    ///
    /// The future owns its state, so it can be moved into spawned tasks or
    /// polled in `tokio::select!` next to other events.
    pub fn on_stop(&self) -> WaitForCancellationFutureOwned {
        self.inner.stop.clone().cancelled_owned()
    }

    /// Returns a token that is cancelled when the handler stops.
    ///
    /// The token is a child: cancelling it does not stop the handler.
    pub fn stop_token(&self) -> CancellationToken {
        self.inner.stop.child_token()
    }

    /// Snapshot of the biased job count (admitted jobs, plus one while running).
    ///
    /// Intended for logs and tests; the value may be stale immediately.
    pub fn pending(&self) -> i64 {
        self.inner.quiescence.load()
    }

    /// Waits until the handler is stopped and every admitted job completed.
    ///
    /// Never times out. Returns immediately on every call after quiescence.
    pub async fn wait_all(&self) {
        self.inner.quiescence.wait().await;
    }

    /// Blocking version of [`JobHandler::wait_all`] for synchronous callers.
    ///
    /// Must not be called from inside an async task: it parks the thread.
    pub fn wait_all_blocking(&self) {
        futures::executor::block_on(self.wait_all());
    }

    /// Returns `true` once the handler is stopped and drained.
    pub fn is_drained(&self) -> bool {
        self.inner.quiescence.is_drained()
    }
}

impl Default for JobHandler {
    /// A handler that is already stopped and drained and admits nothing.
    fn default() -> Self {
        let stop = CancellationToken::new();
        stop.cancel();
        Self {
            inner: Arc::new(Inner {
                name: Cow::Borrowed("jobhandler"),
                running: AtomicBool::new(false),
                stop,
                quiescence: Quiescence::new(0),
            }),
        }
    }
}

impl fmt::Debug for JobHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JobHandler")
            .field("name", &self.inner.name)
            .field("stopped", &self.is_stopped())
            .field("pending", &self.pending())
            .finish()
    }
}
