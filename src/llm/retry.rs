use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;

/// Errors that can tell whether the upstream call is worth repeating.
pub trait Retryable {
    /// HTTP status reported by the upstream, if any.
    fn status(&self) -> Option<u16>;
}

#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Suspends the current task with `tokio::time::sleep`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(1000),
            max_delay: Duration::from_millis(10_000),
        }
    }
}

impl RetryPolicy {
    /// Only rate limiting and server errors are retried.
    pub fn should_retry(&self, status: Option<u16>) -> bool {
        matches!(status, Some(429) | Some(500..=599))
    }

    /// Delay before retry `attempt` (1-indexed): `base * 2^(attempt-1)`, capped.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(31);
        self.base_delay
            .checked_mul(1u32 << exponent)
            .map_or(self.max_delay, |delay| delay.min(self.max_delay))
    }

    /// Runs `op` until it succeeds, fails with a non-retryable error, or
    /// `max_retries` retries have been spent. The last error is returned as is.
    pub async fn run<T, E, F, Fut>(&self, sleeper: &dyn Sleeper, mut op: F) -> Result<T, E>
    where
        E: Retryable + std::fmt::Display,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut retries = 0;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) if retries < self.max_retries && self.should_retry(err.status()) => {
                    retries += 1;
                    let delay = self.delay_for(retries);
                    warn!(
                        error = %err,
                        delay_ms = delay.as_millis() as u64,
                        attempt = retries,
                        max_retries = self.max_retries,
                        "Upstream call failed, retrying"
                    );
                    sleeper.sleep(delay).await;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    use super::*;

    /// Records requested delays instead of waiting.
    #[derive(Debug, Default)]
    struct RecordingSleeper {
        delays: Mutex<Vec<Duration>>,
    }

    impl RecordingSleeper {
        fn recorded(&self) -> Vec<Duration> {
            self.delays.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Sleeper for RecordingSleeper {
        async fn sleep(&self, duration: Duration) {
            self.delays.lock().unwrap().push(duration);
        }
    }

    #[derive(Debug)]
    struct StatusError(Option<u16>);

    impl std::fmt::Display for StatusError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "status {:?}", self.0)
        }
    }

    impl Retryable for StatusError {
        fn status(&self) -> Option<u16> {
            self.0
        }
    }

    #[test]
    fn delays_double_and_cap() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(1), Duration::from_millis(1000));
        assert_eq!(policy.delay_for(2), Duration::from_millis(2000));
        assert_eq!(policy.delay_for(3), Duration::from_millis(4000));
        assert_eq!(policy.delay_for(4), Duration::from_millis(8000));
        assert_eq!(policy.delay_for(5), Duration::from_millis(10_000));
        assert_eq!(policy.delay_for(40), Duration::from_millis(10_000));
    }

    #[test]
    fn retries_only_rate_limits_and_server_errors() {
        let policy = RetryPolicy::default();
        assert!(policy.should_retry(Some(429)));
        assert!(policy.should_retry(Some(500)));
        assert!(policy.should_retry(Some(503)));
        assert!(!policy.should_retry(Some(400)));
        assert!(!policy.should_retry(Some(401)));
        assert!(!policy.should_retry(None));
    }

    #[tokio::test]
    async fn recovers_after_two_server_errors() {
        let sleeper = RecordingSleeper::default();
        let attempts = &AtomicU32::new(0);

        let result = RetryPolicy::default()
            .run(&sleeper, move || async move {
                let n = attempts.fetch_add(1, Ordering::SeqCst);
                if n < 2 {
                    Err(StatusError(Some(500)))
                } else {
                    Ok("done")
                }
            })
            .await;

        assert_eq!(result.unwrap(), "done");
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
        assert_eq!(
            sleeper.recorded(),
            vec![Duration::from_millis(1000), Duration::from_millis(2000)]
        );
    }

    #[tokio::test]
    async fn client_errors_are_not_retried() {
        let sleeper = RecordingSleeper::default();
        let attempts = &AtomicU32::new(0);

        let result: Result<(), _> = RetryPolicy::default()
            .run(&sleeper, move || async move {
                attempts.fetch_add(1, Ordering::SeqCst);
                Err(StatusError(Some(400)))
            })
            .await;

        assert_eq!(result.unwrap_err().0, Some(400));
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
        assert!(sleeper.recorded().is_empty());
    }

    #[tokio::test]
    async fn gives_up_after_max_retries_with_last_error() {
        let sleeper = RecordingSleeper::default();
        let attempts = &AtomicU32::new(0);

        let result: Result<(), _> = RetryPolicy::default()
            .run(&sleeper, move || async move {
                let n = attempts.fetch_add(1, Ordering::SeqCst);
                Err(StatusError(Some(if n < 3 { 503 } else { 429 })))
            })
            .await;

        assert_eq!(result.unwrap_err().0, Some(429));
        assert_eq!(attempts.load(Ordering::SeqCst), 4);
        assert_eq!(sleeper.recorded().len(), 3);
    }
}
