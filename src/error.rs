//! Error types returned by the job handler.
//!
//! This module defines two enums:
//!
//! - [`AdmitError`]: reasons an admission was refused.
//! - [`WaitError`]: a bounded wait for quiescence gave up.
//!
//! Both provide `as_label` / `as_message` helpers for logs and metrics.
//!
//! Contract violations (completing more units than were admitted) are not
//! represented here: they panic, because the counter can no longer be trusted.

use std::time::Duration;
use thiserror::Error;

/// # Reasons an admission was refused.
///
/// A refusal is expected during shutdown and means "stop producing new work".
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AdmitError {
    /// A negative number of units was requested.
    #[error("cannot admit a negative number of jobs ({delta})")]
    NegativeDelta {
        /// The rejected delta.
        delta: i64,
    },

    /// The handler is stopped (or a stop completed while admitting).
    #[error("jobhandler stopped")]
    Stopped,

    /// Admitting `delta` units would overflow the job counter.
    #[error("admitting {delta} jobs would overflow the job counter")]
    Overflow {
        /// The rejected delta.
        delta: i64,
    },
}

impl AdmitError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use jobhandler::AdmitError;
    ///
    /// assert_eq!(AdmitError::Stopped.as_label(), "admit_stopped");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            AdmitError::NegativeDelta { .. } => "admit_negative_delta",
            AdmitError::Stopped => "admit_stopped",
            AdmitError::Overflow { .. } => "admit_overflow",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            AdmitError::NegativeDelta { delta } => format!("negative delta: {delta}"),
            AdmitError::Stopped => "stopped".to_string(),
            AdmitError::Overflow { delta } => format!("counter overflow: delta={delta}"),
        }
    }
}

/// # Errors produced while waiting for quiescence.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WaitError {
    /// The grace period elapsed before the handler was stopped and drained.
    #[error("grace period {grace:?} exceeded; {pending} job(s) still pending")]
    GraceExceeded {
        /// The grace duration that was exceeded.
        grace: Duration,
        /// Biased job count observed when the grace period ran out.
        pending: i64,
    },
}

impl WaitError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use jobhandler::WaitError;
    /// use std::time::Duration;
    ///
    /// let err = WaitError::GraceExceeded { grace: Duration::from_secs(5), pending: 2 };
    /// assert_eq!(err.as_label(), "wait_grace_exceeded");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            WaitError::GraceExceeded { .. } => "wait_grace_exceeded",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            WaitError::GraceExceeded { grace, pending } => {
                format!("grace exceeded after {grace:?}; pending={pending}")
            }
        }
    }
}
