//! Timeouts and bounded retries for service calls.

use std::future::Future;
use std::time::Duration;

use tracing::debug;

use crate::wfs::WfsError;

use super::error::SessionError;

/// Largest backoff shift, to keep the doubling from overflowing.
const MAX_BACKOFF_SHIFT: u32 = 16;

/// How a service call is bounded in time and retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    timeout: Duration,
    attempts: u32,
    backoff: Duration,
}

impl RetryPolicy {
    /// `attempts` is the number of retries after the first try.
    pub fn new(timeout: Duration, attempts: u32, backoff: Duration) -> Self {
        Self {
            timeout,
            attempts,
            backoff,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Delay before retry number `retry` (zero-based).
    pub fn backoff_for(&self, retry: u32) -> Duration {
        self.backoff
            .saturating_mul(1u32 << retry.min(MAX_BACKOFF_SHIFT))
    }

    /// Run `op` until it succeeds, fails permanently, or runs out of retries.
    ///
    /// Each try is cut off after the policy's timeout. Timeouts and
    /// transient service errors are retried; anything else fails at once.
    pub async fn run<T, F, Fut>(&self, mut op: F) -> Result<T, SessionError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, WfsError>>,
    {
        let mut retry = 0;

        loop {
            let err = match tokio::time::timeout(self.timeout, op()).await {
                Ok(Ok(value)) => return Ok(value),
                Ok(Err(err)) if !err.is_transient() => {
                    return Err(SessionError::from_wfs(&err, self.timeout));
                }
                Ok(Err(err)) => SessionError::from_wfs(&err, self.timeout),
                Err(_) => SessionError::Timeout(self.timeout),
            };

            if retry >= self.attempts {
                return Err(err);
            }

            let delay = self.backoff_for(retry);
            debug!(retry = retry + 1, ?delay, error = %err, "retrying service call");
            tokio::time::sleep(delay).await;
            retry += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn policy() -> RetryPolicy {
        RetryPolicy::new(Duration::from_secs(1), 2, Duration::from_millis(100))
    }

    fn unavailable() -> WfsError {
        WfsError::Api {
            status: 503,
            message: "unavailable".into(),
        }
    }

    #[test]
    fn backoff_doubles() {
        let policy = policy();
        assert_eq!(policy.backoff_for(0), Duration::from_millis(100));
        assert_eq!(policy.backoff_for(1), Duration::from_millis(200));
        assert_eq!(policy.backoff_for(2), Duration::from_millis(400));
        assert!(policy.backoff_for(u32::MAX) > Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn success_needs_no_retry() {
        let calls = AtomicUsize::new(0);
        let result = policy()
            .run(|| async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok::<_, WfsError>(42)
            })
            .await;

        assert_eq!(result, Ok(42));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn transient_failure_is_retried() {
        let calls = AtomicUsize::new(0);
        let result = policy()
            .run(|| async {
                if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(unavailable())
                } else {
                    Ok(7)
                }
            })
            .await;

        assert_eq!(result, Ok(7));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn retries_are_bounded() {
        let calls = AtomicUsize::new(0);
        let start = tokio::time::Instant::now();
        let result: Result<(), _> = policy()
            .run(|| async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(unavailable())
            })
            .await;

        assert!(matches!(result, Err(SessionError::NetworkFailure(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        // 100ms + 200ms of backoff
        assert_eq!(start.elapsed(), Duration::from_millis(300));
    }

    #[tokio::test(start_paused = true)]
    async fn permanent_failure_is_not_retried() {
        let calls = AtomicUsize::new(0);
        let result: Result<(), _> = policy()
            .run(|| async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(WfsError::Api {
                    status: 400,
                    message: "bad viewparams".into(),
                })
            })
            .await;

        assert!(matches!(result, Err(SessionError::NetworkFailure(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_call_times_out() {
        let policy = RetryPolicy::new(Duration::from_secs(1), 0, Duration::ZERO);
        let result: Result<(), _> = policy
            .run(|| async {
                tokio::time::sleep(Duration::from_secs(10)).await;
                Ok(())
            })
            .await;

        assert_eq!(result, Err(SessionError::Timeout(Duration::from_secs(1))));
    }
}
