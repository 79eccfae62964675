//! Exponential backoff retry for individual watcher steps.

use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;

use crate::error::WatcherError;

/// Configuration for the retry policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of retry attempts (not counting the first try).
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Initial backoff delay in milliseconds.
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,
    /// Maximum backoff delay in milliseconds (caps exponential growth).
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
    /// Multiplier applied to backoff on each retry.
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,
}

fn default_max_retries() -> u32 { 3 }
fn default_initial_backoff_ms() -> u64 { 100 }
fn default_max_backoff_ms() -> u64 { 10_000 }
fn default_multiplier() -> f64 { 2.0 }

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
            multiplier: default_multiplier(),
        }
    }
}

/// Stateless retry policy. Computes the next delay given the attempt number.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub config: RetryConfig,
}

impl RetryPolicy {
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    /// Returns the delay before the `attempt`-th retry (1-based).
    /// Returns `None` if `attempt` exceeds `max_retries`.
    pub fn next_delay(&self, attempt: u32) -> Option<Duration> {
        if attempt == 0 || attempt > self.config.max_retries {
            return None;
        }
        let base_ms = self.config.initial_backoff_ms as f64
            * self.config.multiplier.powi((attempt - 1) as i32);
        let capped = base_ms.min(self.config.max_backoff_ms as f64);
        Some(Duration::from_millis(capped as u64))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(RetryConfig::default())
    }
}

/// Run `op` under `timeout`, retrying transient failures with backoff.
///
/// Non-transient errors return immediately. When retries are exhausted the
/// last error is returned.
pub async fn retry_step<T, F, Fut>(
    policy: &RetryPolicy,
    timeout: Duration,
    step: &str,
    mut op: F,
) -> Result<T, WatcherError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, WatcherError>>,
{
    let mut attempt = 0u32;
    loop {
        let result = match tokio::time::timeout(timeout, op()).await {
            Ok(result) => result,
            Err(_) => Err(WatcherError::Timeout {
                ms: timeout.as_millis() as u64,
            }),
        };
        match result {
            Ok(value) => return Ok(value),
            Err(e) if e.is_transient() => {
                attempt += 1;
                let Some(delay) = policy.next_delay(attempt) else {
                    return Err(e);
                };
                tracing::warn!(
                    step,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "transient failure, retrying"
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast_policy(max_retries: u32) -> RetryPolicy {
        RetryPolicy::new(RetryConfig {
            max_retries,
            initial_backoff_ms: 1,
            max_backoff_ms: 2,
            multiplier: 2.0,
        })
    }

    #[test]
    fn backoff_doubles() {
        let policy = RetryPolicy::new(RetryConfig {
            max_retries: 3,
            initial_backoff_ms: 100,
            max_backoff_ms: 30_000,
            multiplier: 2.0,
        });
        assert_eq!(policy.next_delay(1).unwrap().as_millis(), 100);
        assert_eq!(policy.next_delay(2).unwrap().as_millis(), 200);
        assert_eq!(policy.next_delay(3).unwrap().as_millis(), 400);
        assert!(policy.next_delay(4).is_none());
    }

    #[test]
    fn delay_capped_at_max() {
        let policy = RetryPolicy::new(RetryConfig {
            max_retries: 10,
            initial_backoff_ms: 100,
            max_backoff_ms: 500,
            multiplier: 10.0,
        });
        assert_eq!(policy.next_delay(5).unwrap(), Duration::from_millis(500));
    }

    #[test]
    fn no_delay_without_retries() {
        let policy = fast_policy(0);
        assert!(policy.next_delay(0).is_none());
        assert!(policy.next_delay(1).is_none());
    }

    #[tokio::test]
    async fn retries_transient_then_succeeds() {
        let calls = AtomicU32::new(0);
        let out = retry_step(&fast_policy(3), Duration::from_secs(1), "fetch", || async {
            if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                Err(WatcherError::Rpc("flaky".into()))
            } else {
                Ok(7u64)
            }
        })
        .await
        .unwrap();
        assert_eq!(out, 7);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn gives_up_after_max_retries() {
        let calls = AtomicU32::new(0);
        let err = retry_step(&fast_policy(2), Duration::from_secs(1), "fetch", || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err::<(), _>(WatcherError::Rpc("down".into()))
        })
        .await
        .unwrap_err();
        assert!(err.is_transient());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn permanent_error_is_not_retried() {
        let calls = AtomicU32::new(0);
        let err = retry_step(&fast_policy(5), Duration::from_secs(1), "decode", || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err::<(), _>(WatcherError::Config("bad".into()))
        })
        .await
        .unwrap_err();
        assert!(matches!(err, WatcherError::Config(_)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn timeout_counts_as_transient() {
        let err = retry_step(&fast_policy(1), Duration::from_millis(5), "head", || async {
            tokio::time::sleep(Duration::from_millis(200)).await;
            Ok::<_, WatcherError>(())
        })
        .await
        .unwrap_err();
        assert!(matches!(err, WatcherError::Timeout { ms: 5 }));
    }
}
