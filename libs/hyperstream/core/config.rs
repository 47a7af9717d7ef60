use crate::traits::*;
use std::sync::Arc;
use std::time::Duration;

/// Default server-push endpoint
pub const DEFAULT_STREAM_URL: &str = "http://localhost:8001/sse";

/// Configuration for a [`ConnectionManager`](crate::ConnectionManager)
///
/// Holds the endpoint, the reconnection strategy and the notifier used for
/// voluntary disconnects.
#[derive(Clone)]
pub struct ManagerConfig {
    /// Event-stream URL (http:// or https://)
    pub(crate) url: String,

    /// Reconnection strategy applied after transport errors
    pub(crate) reconnect_strategy: Arc<dyn ReconnectionStrategy>,

    /// Notifier for voluntary disconnects
    pub(crate) notifier: Arc<dyn DisconnectNotifier>,
}

impl ManagerConfig {
    /// Create a configuration with the default strategy (3s fixed delay, 10 failures)
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            reconnect_strategy: Arc::new(FixedDelay::default()),
            notifier: Arc::new(NoopNotifier),
        }
    }

    /// Fixed-delay reconnection with the given budget
    pub fn with_fixed_delay(mut self, delay: Duration, max_failures: usize) -> Self {
        self.reconnect_strategy = Arc::new(FixedDelay::new(delay, Some(max_failures)));
        self
    }

    /// Use a custom reconnection strategy
    pub fn with_strategy(mut self, strategy: impl ReconnectionStrategy + 'static) -> Self {
        self.reconnect_strategy = Arc::new(strategy);
        self
    }

    /// Use the given disconnect notifier
    pub fn with_notifier(mut self, notifier: impl DisconnectNotifier) -> Self {
        self.notifier = Arc::new(notifier);
        self
    }

    /// Get a reference to the URL
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Consecutive failures allowed per episode, if bounded
    pub fn max_failures(&self) -> Option<usize> {
        self.reconnect_strategy.max_failures()
    }
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self::new(DEFAULT_STREAM_URL)
    }
}

impl std::fmt::Debug for ManagerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManagerConfig")
            .field("url", &self.url)
            .field("max_failures", &self.max_failures())
            .finish()
    }
}
