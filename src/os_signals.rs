//! # Cross-platform OS signal handling.
//!
//! Provides [`wait_for_shutdown_signal`], an async helper that completes when
//! the process receives a termination signal, and [`ShutdownSignal`], the same
//! signals as a [`CancelSource`] for a [`JobHandler`](crate::JobHandler).
//!
//! ## Signals
//! **Unix platforms:**
//! - `SIGINT` (Ctrl-C in terminal)
//! - `SIGTERM` (default kill signal, used by systemd/Kubernetes)
//! - `SIGQUIT` (quit signal, often used for core dumps or hard stop)
//!
//! **Windows platforms:**
//! - `Ctrl-C` via [`tokio::signal::ctrl_c`]

use async_trait::async_trait;
use tracing::warn;

use crate::cancel::CancelSource;

/// Waits for a termination signal.
///
/// Each call creates independent signal listeners.
///
/// Returns `Ok(())` when any signal is received, or `Err` if signal registration fails.
#[cfg(unix)]
pub async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigquit = signal(SignalKind::quit())?;

    tokio::select! {
        _ = sigint.recv()  => {},
        _ = sigterm.recv() => {},
        _ = sigquit.recv() => {},
    }
    Ok(())
}

/// Waits for a termination signal.
///
/// Returns `Ok(())` on Ctrl-C, or `Err` if signal registration fails.
#[cfg(not(unix))]
pub async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await
}

/// Process termination signals as a cancellation source.
///
/// Never reports itself as already fired. If the listeners cannot be
/// registered the failure is logged and the source never fires.
#[derive(Clone, Copy, Debug, Default)]
pub struct ShutdownSignal;

#[async_trait]
impl CancelSource for ShutdownSignal {
    fn is_cancelled(&self) -> bool {
        false
    }

    async fn cancelled(&self) {
        if let Err(e) = wait_for_shutdown_signal().await {
            warn!(error = %e, "failed to register shutdown signal listeners");
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::JobHandler;

    #[tokio::test]
    async fn signal_bound_handler_still_stops_manually() {
        let jh = JobHandler::builder()
            .cancel_on(ShutdownSignal)
            .build();
        assert!(!jh.is_stopped());
        assert!(jh.stop());
        jh.wait_all().await;
    }
}
