use std::borrow::Cow;

use crate::{cancel::CancelSource, config::Config};

use super::{core::JobHandler, observer};

/// Builder for a [`JobHandler`] with a name and cancellation sources.
///
/// # Example
/// ```rust
/// use tokio_util::sync::CancellationToken;
/// use jobhandler::JobHandler;
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() {
///     let shutdown = CancellationToken::new();
///     let jobs = JobHandler::builder()
///         .with_name("ingest")
///         .cancel_on(shutdown.clone())
///         .build();
///
///     shutdown.cancel();
///     jobs.wait_all().await;
///     assert!(jobs.is_stopped());
/// }
/// ```
#[derive(Default)]
pub struct JobHandlerBuilder {
    cfg: Config,
    sources: Vec<Box<dyn CancelSource>>,
}

impl JobHandlerBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            sources: Vec::new(),
        }
    }

    /// Sets the label used in log events.
    pub fn with_name(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.cfg.name = name.into();
        self
    }

    /// Stops the handler when `source` fires. May be called repeatedly;
    /// the first source to fire wins.
    pub fn cancel_on(mut self, source: impl CancelSource) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    /// Stops the handler on SIGINT, SIGTERM or SIGQUIT (Ctrl-C on non-Unix).
    ///
    /// Requires the `signals` feature.
    #[cfg(feature = "signals")]
    pub fn stop_on_shutdown_signal(mut self) -> Self {
        self.cfg.stop_on_shutdown_signal = true;
        self
    }

    /// Builds the handler and starts one observer per cancellation source.
    ///
    /// # Panics
    /// When a source has not fired yet and this is called outside a Tokio
    /// runtime.
    pub fn build(self) -> JobHandler {
        let Config {
            name,
            stop_on_shutdown_signal,
        } = self.cfg;

        let handler = JobHandler::running(name);
        for source in self.sources {
            observer::bind(&handler, source);
        }

        #[cfg(feature = "signals")]
        if stop_on_shutdown_signal {
            observer::bind(&handler, Box::new(crate::os_signals::ShutdownSignal));
        }
        #[cfg(not(feature = "signals"))]
        let _ = stop_on_shutdown_signal;

        handler
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio_util::sync::CancellationToken;

    use super::*;

    #[test]
    fn plain_build_needs_no_runtime() {
        let jh = JobHandlerBuilder::new(Config::default())
            .with_name("plain")
            .build();
        assert_eq!(jh.name(), "plain");
        assert!(!jh.is_stopped());
        assert_eq!(jh.pending(), 1);
    }

    #[tokio::test]
    async fn first_source_to_fire_wins() {
        let a = CancellationToken::new();
        let b = CancellationToken::new();
        let jh = JobHandler::builder()
            .cancel_on(a.clone())
            .cancel_on(b.clone())
            .build();

        b.cancel();
        tokio::time::timeout(Duration::from_secs(5), jh.wait_all())
            .await
            .expect("second source should stop the handler");
        assert!(!a.is_cancelled());
        a.cancel();
        tokio::task::yield_now().await;
        assert_eq!(jh.pending(), 0);
    }

    #[tokio::test]
    async fn boxed_source_is_accepted() {
        let token = CancellationToken::new();
        let boxed: Box<dyn CancelSource> = Box::new(token.clone());
        let jh = JobHandler::builder().cancel_on(boxed).build();
        token.cancel();
        tokio::time::timeout(Duration::from_secs(5), jh.on_stop())
            .await
            .expect("boxed source should stop the handler");
    }
}
