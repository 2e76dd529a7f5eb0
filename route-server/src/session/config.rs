//! Session configuration.

use std::time::Duration;

use super::retry::RetryPolicy;

/// Configuration parameters for a route session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// How far (map units) a marker may be released from a node and still
    /// snap to it.
    pub tolerance: f64,

    /// How far (map units) the pointer may be from a displayed route edge
    /// for a hover tooltip.
    pub hover_tolerance: f64,

    /// Drag throttle window. At most one tentative resolve per window.
    pub throttle_period: Duration,

    /// Timeout for each resolver or route call.
    pub request_timeout: Duration,

    /// Retries after a transient failure.
    pub retry_attempts: u32,

    /// Delay before the first retry; doubled for each retry after.
    pub retry_backoff: Duration,

    /// Merge chaussee into road and electric tram into tram when building
    /// itineraries.
    pub merge_display_aliases: bool,

    /// Capacity of the session's event queue.
    pub queue_capacity: usize,
}

impl SessionConfig {
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_hover_tolerance(mut self, tolerance: f64) -> Self {
        self.hover_tolerance = tolerance;
        self
    }

    pub fn with_throttle_period(mut self, period: Duration) -> Self {
        self.throttle_period = period;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_retry(mut self, attempts: u32, backoff: Duration) -> Self {
        self.retry_attempts = attempts;
        self.retry_backoff = backoff;
        self
    }

    pub fn with_merge_display_aliases(mut self, merge: bool) -> Self {
        self.merge_display_aliases = merge;
        self
    }

    /// Retry policy for calls made on behalf of the session.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.request_timeout, self.retry_attempts, self.retry_backoff)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            tolerance: 50_000.0,
            hover_tolerance: 5_000.0,
            throttle_period: Duration::from_millis(30),
            request_timeout: Duration::from_secs(5),
            retry_attempts: 2,
            retry_backoff: Duration::from_millis(200),
            merge_display_aliases: false,
            queue_capacity: 64,
        }
    }
}
