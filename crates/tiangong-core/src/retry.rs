use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tracing::{info, warn};

/// Bounded retry with exponential backoff.
///
/// Attempt `n` (zero-based) that fails with a retryable error waits
/// `backoff_base_ms * 2^n`, capped at `backoff_max_ms`, before attempt `n + 1`.
/// After `max_attempts` attempts the last error is returned unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first one.
    pub max_attempts: u32,
    /// Base delay in milliseconds for exponential backoff.
    pub backoff_base_ms: u64,
    /// Maximum delay in milliseconds (cap for exponential backoff).
    pub backoff_max_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_base_ms: 1_000,
            backoff_max_ms: 12_000,
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            backoff_base_ms: 0,
            backoff_max_ms: 0,
        }
    }

    /// Same attempt count, no waiting between attempts.
    pub fn without_delay(mut self) -> Self {
        self.backoff_base_ms = 0;
        self.backoff_max_ms = 0;
        self
    }

    /// Delay to wait after the zero-based `attempt` failed.
    pub fn compute_backoff(&self, attempt: u32) -> Duration {
        let delay = self
            .backoff_base_ms
            .saturating_mul(2u64.saturating_pow(attempt));
        Duration::from_millis(delay.min(self.backoff_max_ms))
    }

    /// Run `op` until it succeeds, a non-retryable error occurs, or the
    /// attempt budget is spent.
    pub async fn run<T, E, F, Fut, R>(&self, mut op: F, is_retryable: R) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        R: Fn(&E) -> bool,
        E: Display,
    {
        let attempts = self.max_attempts.max(1);
        let mut attempt = 0;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) => {
                    if !is_retryable(&e) {
                        warn!(attempt, error = %e, "Non-retryable error");
                        return Err(e);
                    }
                    if attempt + 1 >= attempts {
                        warn!(attempts, error = %e, "Retry budget exhausted");
                        return Err(e);
                    }
                    let delay = self.compute_backoff(attempt);
                    info!(
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Retryable error, backing off"
                    );
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                    attempt += 1;
                }
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn backoff_computation() {
        let policy = RetryPolicy::default();

        assert_eq!(policy.compute_backoff(0), Duration::from_millis(1_000));
        assert_eq!(policy.compute_backoff(1), Duration::from_millis(2_000));
        assert_eq!(policy.compute_backoff(2), Duration::from_millis(4_000));
        assert_eq!(policy.compute_backoff(3), Duration::from_millis(8_000));
        assert_eq!(policy.compute_backoff(4), Duration::from_millis(12_000));
        assert_eq!(policy.compute_backoff(40), Duration::from_millis(12_000));
    }

    #[tokio::test]
    async fn succeeds_after_transient_failures() {
        let calls = &AtomicU32::new(0);
        let policy = RetryPolicy::default().without_delay();

        let result: Result<&str, String> = policy
            .run(
                || async move {
                    let n = calls.fetch_add(1, Ordering::SeqCst);
                    if n < 2 {
                        Err(format!("failure {n}"))
                    } else {
                        Ok("ok")
                    }
                },
                |_| true,
            )
            .await;

        assert_eq!(result.unwrap(), "ok");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn stops_after_max_attempts_with_last_error() {
        let calls = &AtomicU32::new(0);
        let policy = RetryPolicy::default().without_delay();

        let result: Result<(), String> = policy
            .run(
                || async move {
                    let n = calls.fetch_add(1, Ordering::SeqCst);
                    Err(format!("failure {n}"))
                },
                |_| true,
            )
            .await;

        assert_eq!(result.unwrap_err(), "failure 2");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn non_retryable_error_returns_immediately() {
        let calls = &AtomicU32::new(0);
        let policy = RetryPolicy::default().without_delay();

        let result: Result<(), String> = policy
            .run(
                || async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err("400 Bad Request".to_string())
                },
                |e| !e.contains("400"),
            )
            .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn none_policy_runs_once() {
        let calls = &AtomicU32::new(0);
        let result: Result<(), String> = RetryPolicy::none()
            .run(
                || async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err("down".to_string())
                },
                |_| true,
            )
            .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
