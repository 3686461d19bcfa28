//! # Quiescence tracker: biased job counter plus a drain barrier.
//!
//! The tracker owns the single atomic counter of the handler. One phantom unit
//! represents "the handler is running"; real jobs are added on top of it. The
//! counter therefore reaches zero only when the handler is stopped **and** every
//! admitted job has completed, so one barrier covers both conditions.
//!
//! ```text
//! new()          pending = 1 (phantom)
//! try_add(n)     pending += n            refused when pending == 0
//! sub(1)         pending -= 1            mark_done / stop
//! release()      drained fired           caller observed pending == 0
//! ```
//!
//! ## Rules
//! - `try_add` never resurrects a counter that reached zero
//! - `release` is called by whoever observed the transition to zero,
//!   after the fault checks passed
//! - once drained, the barrier stays open forever

use std::sync::atomic::{AtomicI64, Ordering};

use tokio_util::sync::CancellationToken;

use crate::error::AdmitError;

pub(crate) const NEGATIVE_COUNT: &str = "negative job count";

/// Count-up/count-down barrier backing [`JobHandler`](crate::JobHandler).
#[derive(Debug)]
pub(crate) struct Quiescence {
    pending: AtomicI64,
    drained: CancellationToken,
}

impl Quiescence {
    /// Creates a tracker with `initial` pending units.
    ///
    /// A tracker created at zero is drained from the start.
    pub(crate) fn new(initial: i64) -> Self {
        let drained = CancellationToken::new();
        if initial == 0 {
            drained.cancel();
        }
        Self {
            pending: AtomicI64::new(initial),
            drained,
        }
    }

    /// Current number of pending units, phantom included.
    pub(crate) fn load(&self) -> i64 {
        self.pending.load(Ordering::SeqCst)
    }

    /// Adds `delta` units unless the counter already reached zero.
    ///
    /// Optimistic load + compare-exchange; retries only when another thread
    /// changed the counter in between.
    ///
    /// # Panics
    /// If the counter is observed negative.
    pub(crate) fn try_add(&self, delta: i64) -> Result<(), AdmitError> {
        let mut prev = self.pending.load(Ordering::SeqCst);
        loop {
            assert!(prev >= 0, "{NEGATIVE_COUNT}");
            if prev == 0 {
                return Err(AdmitError::Stopped);
            }
            let next = prev
                .checked_add(delta)
                .ok_or(AdmitError::Overflow { delta })?;
            match self.pending.compare_exchange_weak(
                prev,
                next,
                Ordering::SeqCst,
                Ordering::SeqCst,
            ) {
                Ok(_) => return Ok(()),
                Err(actual) => prev = actual,
            }
        }
    }

    /// Removes `n` units and returns the remaining count.
    ///
    /// Does not open the barrier; see [`Quiescence::release`].
    pub(crate) fn sub(&self, n: i64) -> i64 {
        self.pending.fetch_sub(n, Ordering::SeqCst) - n
    }

    /// Opens the barrier. Idempotent.
    pub(crate) fn release(&self) {
        self.drained.cancel();
    }

    /// True once the barrier has been opened.
    pub(crate) fn is_drained(&self) -> bool {
        self.drained.is_cancelled()
    }

    /// Waits until the barrier opens.
    pub(crate) async fn wait(&self) {
        self.drained.cancelled().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_tracker_starts_drained() {
        let q = Quiescence::new(0);
        assert!(q.is_drained());
        assert_eq!(q.try_add(1), Err(AdmitError::Stopped));
        assert_eq!(q.load(), 0);
    }

    #[test]
    fn add_and_sub_track_the_same_counter() {
        let q = Quiescence::new(1);
        assert_eq!(q.try_add(3), Ok(()));
        assert_eq!(q.load(), 4);
        assert_eq!(q.sub(1), 3);
        assert_eq!(q.sub(3), 0);
        assert!(!q.is_drained());
        q.release();
        assert!(q.is_drained());
    }

    #[test]
    fn overflow_is_refused_without_change() {
        let q = Quiescence::new(1);
        assert_eq!(
            q.try_add(i64::MAX),
            Err(AdmitError::Overflow { delta: i64::MAX })
        );
        assert_eq!(q.load(), 1);
    }

    #[test]
    #[should_panic(expected = "negative job count")]
    fn corrupted_counter_panics_on_add() {
        let q = Quiescence::new(0);
        q.sub(1);
        let _ = q.try_add(1);
    }
}
