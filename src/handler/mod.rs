//! Job handler: admission, completion, stop and quiescence.
//!
//! Internal modules:
//! - [`core`]: the handler itself (admission, completion, stop, queries);
//! - [`quiescence`]: biased counter and drain barrier;
//! - [`guard`]: scoped admission completed on drop;
//! - [`dispatch`]: spawning helpers, bounded batches, interruptible sleep;
//! - [`observer`]: couples external cancellation sources into stop;
//! - [`builder`]: construction with a name and cancellation sources.

mod builder;
mod core;
mod dispatch;
mod guard;
mod observer;
mod quiescence;

pub use builder::JobHandlerBuilder;
pub use self::core::JobHandler;
pub use guard::JobGuard;
