//! # External cancellation sources.
//!
//! A [`CancelSource`] is anything that can tell whether it already fired and
//! can be awaited until it fires. A [`JobHandler`](crate::JobHandler) bound to
//! a source stops as soon as the source fires. The coupling is one-way:
//! stopping the handler never cancels the source.
//!
//! Provided implementations:
//! - [`CancellationToken`]
//! - [`ShutdownSignal`](crate::ShutdownSignal) (feature `signals`)

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// # One-shot external cancellation signal.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use jobhandler::CancelSource;
///
/// /// Never fires.
/// struct Never;
///
/// #[async_trait]
/// impl CancelSource for Never {
///     fn is_cancelled(&self) -> bool { false }
///
///     async fn cancelled(&self) {
///         std::future::pending::<()>().await
///     }
/// }
/// ```
#[async_trait]
pub trait CancelSource: Send + Sync + 'static {
    /// Returns `true` if the source has already fired.
    fn is_cancelled(&self) -> bool;

    /// Completes once the source fires (immediately if it already has).
    async fn cancelled(&self);
}

#[async_trait]
impl CancelSource for CancellationToken {
    fn is_cancelled(&self) -> bool {
        CancellationToken::is_cancelled(self)
    }

    async fn cancelled(&self) {
        CancellationToken::cancelled(self).await
    }
}

#[async_trait]
impl CancelSource for Box<dyn CancelSource> {
    fn is_cancelled(&self) -> bool {
        (**self).is_cancelled()
    }

    async fn cancelled(&self) {
        (**self).cancelled().await
    }
}
