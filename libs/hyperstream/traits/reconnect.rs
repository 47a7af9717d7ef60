use std::time::Duration;

/// Trait for defining reconnection strategies
///
/// Implement this trait to control how the manager should
/// behave after a transport error.
pub trait ReconnectionStrategy: Send + Sync {
    /// Get the delay before the next reconnection attempt
    ///
    /// # Arguments
    /// * `failures` - Consecutive failures in the current episode (1 after the first error)
    ///
    /// # Returns
    /// * `Some(duration)` - Wait this long before reconnecting
    /// * `None` - Retry budget exhausted, stop reconnecting
    fn next_delay(&self, failures: usize) -> Option<Duration>;

    /// Check if we should continue reconnecting
    fn should_reconnect(&self, failures: usize) -> bool;

    /// Upper bound on consecutive failures, if any
    fn max_failures(&self) -> Option<usize>;
}

/// Fixed delay reconnection strategy
///
/// Always waits the same amount of time between reconnection attempts
#[derive(Debug, Clone)]
pub struct FixedDelay {
    delay: Duration,
    max_failures: Option<usize>,
}

impl FixedDelay {
    /// Create a new fixed delay strategy
    ///
    /// # Arguments
    /// * `delay` - The fixed delay between reconnects
    /// * `max_failures` - Consecutive failures that exhaust the episode (None = unlimited)
    pub fn new(delay: Duration, max_failures: Option<usize>) -> Self {
        Self { delay, max_failures }
    }
}

impl Default for FixedDelay {
    /// 3 seconds between attempts, 10 consecutive failures per episode
    fn default() -> Self {
        Self::new(Duration::from_millis(3000), Some(10))
    }
}

impl ReconnectionStrategy for FixedDelay {
    fn next_delay(&self, failures: usize) -> Option<Duration> {
        if !self.should_reconnect(failures) {
            return None;
        }
        Some(self.delay)
    }

    fn should_reconnect(&self, failures: usize) -> bool {
        self.max_failures.map_or(true, |max| failures < max)
    }

    fn max_failures(&self) -> Option<usize> {
        self.max_failures
    }
}

/// Never reconnect strategy
///
/// The first transport error moves the manager straight to `Failed`
#[derive(Debug, Clone)]
pub struct NeverReconnect;

impl ReconnectionStrategy for NeverReconnect {
    fn next_delay(&self, _failures: usize) -> Option<Duration> {
        None
    }

    fn should_reconnect(&self, _failures: usize) -> bool {
        false
    }

    fn max_failures(&self) -> Option<usize> {
        Some(0)
    }
}
