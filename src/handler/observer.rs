//! # Cancellation observer.
//!
//! Couples an external [`CancelSource`] into [`JobHandler::stop`].
//!
//! ```text
//! bind(handler, source)
//!   ├─ source already fired ─► handler.stop()        (no task spawned)
//!   └─ spawn observer:
//!        select {
//!          source.cancelled() ─► upgrade(handler)?.stop()
//!          handler stopped    ─► exit
//!        }
//! ```
//!
//! The observer holds a weak reference, so an abandoned handler is not kept
//! alive by a source that never fires.

use tokio::select;
use tracing::debug;

use crate::cancel::CancelSource;

use super::core::JobHandler;

/// Stops `handler` once `source` fires.
///
/// # Panics
/// When an observer has to be spawned outside a Tokio runtime.
pub(crate) fn bind(handler: &JobHandler, source: Box<dyn CancelSource>) {
    if source.is_cancelled() {
        debug!(handler = %handler.name(), "cancellation source already fired");
        handler.stop();
        return;
    }
    if handler.is_stopped() {
        return;
    }

    let weak = handler.downgrade();
    let stopped = handler.on_stop();
    tokio::spawn(async move {
        select! {
            _ = source.cancelled() => {
                if let Some(inner) = weak.upgrade() {
                    let handler = JobHandler { inner };
                    debug!(handler = %handler.name(), "cancellation source fired");
                    handler.stop();
                }
            }
            _ = stopped => {}
        }
    });
}
