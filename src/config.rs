//! # Job handler configuration.
//!
//! Provides [`Config`], the settings consumed by
//! [`JobHandlerBuilder`](crate::JobHandlerBuilder).
//!
//! The handler itself has no tunables: admission, completion and stop behave
//! the same for every instance. Configuration only covers how the handler is
//! labelled in log events and which shutdown sources it listens to.

use std::borrow::Cow;

/// Configuration for building a [`JobHandler`](crate::JobHandler).
///
/// ## Field semantics
/// - `name`: label attached to every log event as the `handler` field
/// - `stop_on_shutdown_signal`: stop when the process receives a termination signal
#[derive(Clone, Debug)]
pub struct Config {
    /// Label used in log events.
    pub name: Cow<'static, str>,

    /// Bind OS termination signals (SIGINT, SIGTERM, SIGQUIT; Ctrl-C elsewhere)
    /// as a cancellation source.
    ///
    /// Ignored unless the `signals` feature is enabled.
    pub stop_on_shutdown_signal: bool,
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `name = "jobhandler"`
    /// - `stop_on_shutdown_signal = false`
    fn default() -> Self {
        Self {
            name: Cow::Borrowed("jobhandler"),
            stop_on_shutdown_signal: false,
        }
    }
}
