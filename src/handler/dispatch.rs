//! # Helpers built on admission: spawning, bounded batches, sleeping.
//!
//! Every helper admits first and only then does work, so a stopped handler
//! never starts anything new.
//!
//! ## Batch dispatch
//! ```text
//! try_run_n(delta, limit, f)
//!   ├─► admit(delta)                 all-or-nothing
//!   ├─► Semaphore(limit)             only when 0 < limit < delta
//!   └─► for i in 0..delta:
//!         spawn {
//!           ├─► acquire permit       (waits while `limit` jobs run)
//!           ├─► f(i).await
//!           ├─► release permit
//!           └─► mark done            (guard drop, also on panic)
//!         }
//! ```
//!
//! ## Rules
//! - Order across batch indices is unspecified
//! - Spawned jobs are never aborted on stop; they observe it cooperatively
//!   through [`JobHandler::stop_token`] or [`JobHandler::try_sleep`]

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::{select, sync::Semaphore, time};

use crate::error::WaitError;

use super::core::JobHandler;
use super::guard::JobGuard;

impl JobHandler {
    /// Admits one job and runs `fut` as a Tokio task.
    ///
    /// The job is marked done when `fut` finishes, whether it returns or panics.
    /// Do not call [`JobHandler::mark_done`] for it.
    ///
    /// # Panics
    /// When admitted outside a Tokio runtime.
    pub fn try_run<F>(&self, fut: F) -> bool
    where
        F: Future + Send + 'static,
    {
        let Some(guard) = self.try_guard() else {
            return false;
        };
        tokio::spawn(async move {
            let _guard = guard;
            fut.await;
        });
        true
    }

    /// Admits one job and runs `f` on the calling thread.
    ///
    /// Returns `None` without calling `f` when admission is refused.
    pub fn try_run_inline<F, R>(&self, f: F) -> Option<R>
    where
        F: FnOnce() -> R,
    {
        let _guard = self.try_guard()?;
        Some(f())
    }

    /// Admits `delta` jobs at once and runs `f(i)` for every `i` in `0..delta`,
    /// with at most `limit` calls running concurrently.
    ///
    /// `limit == 0` or `limit >= delta` runs all of them concurrently. Returns
    /// `false`, without running anything, when the batch is not admitted.
    ///
    /// # Panics
    /// When the batch is admitted outside a Tokio runtime.
    ///
    /// # Example
    /// ```rust
    /// use std::sync::Arc;
    /// use std::sync::atomic::{AtomicUsize, Ordering};
    /// use jobhandler::JobHandler;
    ///
    /// #[tokio::main]
    /// async fn main() {
    ///     let jobs = JobHandler::new();
    ///     let sum = Arc::new(AtomicUsize::new(0));
    ///     let acc = Arc::clone(&sum);
    ///     assert!(jobs.try_run_n(10, 3, move |i| {
    ///         let acc = Arc::clone(&acc);
    ///         async move { acc.fetch_add(i, Ordering::SeqCst); }
    ///     }));
    ///     jobs.stop();
    ///     jobs.wait_all().await;
    ///     assert_eq!(sum.load(Ordering::SeqCst), 45);
    /// }
    /// ```
    pub fn try_run_n<F, Fut>(&self, delta: usize, limit: usize, f: F) -> bool
    where
        F: Fn(usize) -> Fut + Send + Sync + 'static,
        Fut: Future + Send + 'static,
    {
        let Ok(units) = i64::try_from(delta) else {
            return false;
        };
        let Ok(mut batch) = self.admit(units) else {
            return false;
        };

        let f = Arc::new(f);
        let permits = (limit > 0 && limit < delta).then(|| Arc::new(Semaphore::new(limit)));

        for i in 0..delta {
            let Some(guard) = batch.split(1) else {
                break;
            };
            let f = Arc::clone(&f);
            let permits = permits.clone();
            tokio::spawn(run_bounded(guard, permits, async move { f(i).await }));
        }
        true
    }

    /// Sleeps for `dur` unless the handler stops first.
    ///
    /// Returns `true` if the full duration elapsed and `false` if the handler
    /// stopped (or was already stopped).
    pub async fn try_sleep(&self, dur: Duration) -> bool {
        let sleep = time::sleep(dur);
        tokio::pin!(sleep);
        select! {
            biased;
            _ = self.inner.stop.cancelled() => false,
            _ = &mut sleep => true,
        }
    }

    /// Waits for quiescence, giving up after `grace`.
    ///
    /// Returns [`WaitError::GraceExceeded`] with the outstanding count when
    /// the handler is not stopped and drained in time.
    pub async fn wait_all_with_grace(&self, grace: Duration) -> Result<(), WaitError> {
        match time::timeout(grace, self.wait_all()).await {
            Ok(()) => Ok(()),
            Err(_elapsed) => Err(WaitError::GraceExceeded {
                grace,
                pending: self.pending(),
            }),
        }
    }

    /// Stops the handler and waits up to `grace` for in-flight jobs.
    pub async fn shutdown(&self, grace: Duration) -> Result<(), WaitError> {
        self.stop();
        self.wait_all_with_grace(grace).await
    }
}

/// Runs one batch job under an optional concurrency permit.
async fn run_bounded<Fut>(guard: JobGuard, permits: Option<Arc<Semaphore>>, job: Fut)
where
    Fut: Future,
{
    let _guard = guard;
    let _permit = match permits {
        Some(sem) => match sem.acquire_owned().await {
            Ok(permit) => Some(permit),
            Err(_closed) => return,
        },
        None => None,
    };
    job.await;
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn try_run_completes_the_job() {
        let jh = JobHandler::new();
        let ran = Arc::new(AtomicUsize::new(0));
        let r = Arc::clone(&ran);
        assert!(jh.try_run(async move {
            r.fetch_add(1, Ordering::SeqCst);
        }));
        jh.stop();
        jh.wait_all().await;
        assert_eq!(ran.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn try_run_refused_after_stop() {
        let jh = JobHandler::new();
        jh.stop();
        assert!(!jh.try_run(async {}));
        assert_eq!(jh.pending(), 0);
    }

    #[tokio::test]
    async fn try_run_panicking_job_still_completes() {
        let jh = JobHandler::new();
        assert!(jh.try_run(async {
            panic!("job failed");
        }));
        jh.stop();
        time::timeout(Duration::from_secs(5), jh.wait_all())
            .await
            .expect("a panicking job must still be marked done");
    }

    #[test]
    fn try_run_inline_bookkeeping() {
        let jh = JobHandler::new();
        let out = jh.try_run_inline(|| {
            assert_eq!(jh.pending(), 2);
            7
        });
        assert_eq!(out, Some(7));
        assert_eq!(jh.pending(), 1);

        jh.stop();
        assert_eq!(jh.try_run_inline(|| 7), None);
        assert!(jh.is_drained());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn try_run_n_bounds_concurrency() {
        let jh = JobHandler::new();
        let current = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let seen = Arc::new(Mutex::new(Vec::new()));

        let (c, p, s) = (Arc::clone(&current), Arc::clone(&peak), Arc::clone(&seen));
        assert!(jh.try_run_n(11, 5, move |i| {
            let (c, p, s) = (Arc::clone(&c), Arc::clone(&p), Arc::clone(&s));
            async move {
                let now = c.fetch_add(1, Ordering::SeqCst) + 1;
                p.fetch_max(now, Ordering::SeqCst);
                time::sleep(Duration::from_millis(20)).await;
                s.lock().unwrap().push(i);
                c.fetch_sub(1, Ordering::SeqCst);
            }
        }));
        jh.stop();
        time::timeout(Duration::from_secs(5), jh.wait_all())
            .await
            .expect("batch should drain");

        let peak = peak.load(Ordering::SeqCst);
        assert!(peak <= 5, "peak concurrency {peak} exceeds limit");
        assert!(peak >= 1);

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 11);
        let unique: HashSet<_> = seen.iter().copied().collect();
        assert_eq!(unique, (0..11).collect::<HashSet<_>>());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn try_run_n_unbounded_when_limit_zero() {
        let jh = JobHandler::new();
        let count = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&count);
        assert!(jh.try_run_n(8, 0, move |_| {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
            }
        }));
        jh.stop();
        jh.wait_all().await;
        assert_eq!(count.load(Ordering::SeqCst), 8);
    }

    #[tokio::test]
    async fn try_run_n_is_all_or_nothing() {
        let jh = JobHandler::new();
        jh.stop();
        let calls = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&calls);
        assert!(!jh.try_run_n(3, 1, move |_| {
            c.fetch_add(1, Ordering::SeqCst);
            async {}
        }));
        jh.wait_all().await;
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn try_run_n_empty_batch() {
        let jh = JobHandler::new();
        assert!(jh.try_run_n(0, 4, |_| async {}));
        assert_eq!(jh.pending(), 1);
        jh.stop();
        jh.wait_all().await;
    }

    #[tokio::test(start_paused = true)]
    async fn try_sleep_elapses() {
        let jh = JobHandler::new();
        assert!(jh.try_sleep(Duration::from_secs(30)).await);
        assert_eq!(jh.pending(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn try_sleep_interrupted_by_stop() {
        let jh = JobHandler::new();
        let stopper = jh.clone();
        tokio::spawn(async move {
            time::sleep(Duration::from_secs(1)).await;
            stopper.stop();
        });
        assert!(!jh.try_sleep(Duration::from_secs(3600)).await);
        assert!(jh.is_stopped());
    }

    #[tokio::test]
    async fn try_sleep_on_stopped_handler() {
        let jh = JobHandler::default();
        assert!(!jh.try_sleep(Duration::from_secs(3600)).await);
    }

    #[tokio::test(start_paused = true)]
    async fn grace_exceeded_reports_pending() {
        let jh = JobHandler::new();
        let _guard = jh.admit(2).unwrap();
        let err = jh.shutdown(Duration::from_secs(1)).await.unwrap_err();
        assert_eq!(
            err,
            WaitError::GraceExceeded {
                grace: Duration::from_secs(1),
                pending: 2,
            }
        );
    }

    #[tokio::test]
    async fn shutdown_within_grace() {
        let jh = JobHandler::new();
        assert!(jh.try_run(async {
            time::sleep(Duration::from_millis(10)).await;
        }));
        jh.shutdown(Duration::from_secs(5)).await.unwrap();
        assert!(jh.is_drained());
    }
}
