//! # Scoped admission.
//!
//! [`JobGuard`] holds admitted units and completes all of them when dropped,
//! including during panic unwinding. It backs the spawning helpers so that a
//! job is reported done however its future ends.

use std::fmt;

use super::core::JobHandler;

/// Admitted jobs that are marked done when the guard is dropped.
#[must_use = "dropping the guard immediately marks the job done"]
pub struct JobGuard {
    handler: JobHandler,
    units: i64,
}

impl JobGuard {
    /// Wraps `units` already admitted on `handler`.
    pub(crate) fn adopt(handler: JobHandler, units: i64) -> Self {
        Self { handler, units }
    }

    /// Number of jobs this guard still holds.
    pub fn units(&self) -> i64 {
        self.units
    }

    /// Moves `n` units into a new guard, e.g. to hand them to another task.
    ///
    /// Returns `None` if this guard holds fewer than `n` units.
    pub fn split(&mut self, n: i64) -> Option<JobGuard> {
        if n < 0 || n > self.units {
            return None;
        }
        self.units -= n;
        Some(Self::adopt(self.handler.clone(), n))
    }
}

impl Drop for JobGuard {
    fn drop(&mut self) {
        self.handler.complete(self.units);
    }
}

impl fmt::Debug for JobGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JobGuard")
            .field("handler", &self.handler.name())
            .field("units", &self.units)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use crate::{AdmitError, JobHandler};

    #[test]
    fn drop_completes_all_units() {
        let jh = JobHandler::new();
        let guard = jh.admit(3).unwrap();
        assert_eq!(guard.units(), 3);
        assert_eq!(jh.pending(), 4);
        drop(guard);
        assert_eq!(jh.pending(), 1);
        jh.stop();
        assert!(jh.is_drained());
    }

    #[test]
    fn split_hands_units_over() {
        let jh = JobHandler::new();
        let mut guard = jh.admit(5).unwrap();
        let part = guard.split(2).unwrap();
        assert!(guard.split(4).is_none());
        assert_eq!(guard.units(), 3);
        assert_eq!(part.units(), 2);

        jh.stop();
        drop(part);
        assert_eq!(jh.pending(), 3);
        assert!(!jh.is_drained());
        drop(guard);
        assert!(jh.is_drained());
    }

    #[test]
    fn guard_released_on_panic() {
        let jh = JobHandler::new();
        let guard = jh.try_guard().unwrap();
        let res = std::panic::catch_unwind(std::panic::AssertUnwindSafe(move || {
            let _guard = guard;
            panic!("job failed");
        }));
        assert!(res.is_err());
        assert_eq!(jh.pending(), 1);
    }

    #[test]
    fn no_guard_after_stop() {
        let jh = JobHandler::new();
        jh.stop();
        assert!(jh.try_guard().is_none());
        assert_eq!(jh.admit(2).unwrap_err(), AdmitError::Stopped);
    }
}
