//! Exponential backoff retry logic for GitHub API reads.
//!
//! Default: 3 retries with 2s, 4s, 8s delays. Only transient errors are
//! retried; permanent errors are returned immediately.
//!
//! Cancellation requests bypass this layer entirely. The engine's cancellation
//! state machine decides when to re-issue them.

use std::future::Future;
use std::time::Duration;

use crate::effects::ActionsEffect;

use super::error::GitHubApiError;

/// Configuration for exponential backoff retry.
#[derive(Debug, Clone, Copy)]
pub struct RetryConfig {
    /// Maximum number of retry attempts (not including the initial attempt).
    pub max_retries: u32,

    /// Initial delay before the first retry.
    pub initial_delay: Duration,

    /// Cap for exponential growth.
    pub max_delay: Duration,

    pub backoff_multiplier: f64,
}

impl RetryConfig {
    /// 3 retries with 2s, 4s, 8s delays (~14s total).
    pub const DEFAULT: Self = Self {
        max_retries: 3,
        initial_delay: Duration::from_secs(2),
        max_delay: Duration::from_secs(16),
        backoff_multiplier: 2.0,
    };

    pub fn new(
        max_retries: u32,
        initial_delay: Duration,
        max_delay: Duration,
        backoff_multiplier: f64,
    ) -> Self {
        Self {
            max_retries,
            initial_delay,
            max_delay,
            backoff_multiplier,
        }
    }

    /// Delay before retry number `retry` (0-indexed):
    /// `initial_delay * backoff_multiplier^retry`, capped at `max_delay`.
    pub fn delay_for_retry(&self, retry: u32) -> Duration {
        let secs = self.initial_delay.as_secs_f64() * self.backoff_multiplier.powi(retry as i32);
        Duration::from_secs_f64(secs.min(self.max_delay.as_secs_f64()))
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Whether transient failures of an effect are retried.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RetryPolicy {
    #[default]
    RetryTransient,

    NoRetry,
}

impl RetryPolicy {
    /// Reads are retried; mutations are attempted exactly once.
    pub fn for_effect(effect: &ActionsEffect) -> Self {
        if effect.is_mutation() {
            RetryPolicy::NoRetry
        } else {
            RetryPolicy::RetryTransient
        }
    }
}

/// Executes an async operation, retrying transient errors per `config`.
///
/// Returns the first success, the first permanent error, or the last
/// transient error once retries are exhausted.
pub async fn retry_with_backoff<T, F, Fut>(
    config: RetryConfig,
    policy: RetryPolicy,
    mut operation: F,
) -> Result<T, GitHubApiError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, GitHubApiError>>,
{
    let max_retries = match policy {
        RetryPolicy::RetryTransient => config.max_retries,
        RetryPolicy::NoRetry => 0,
    };

    let mut retry = 0;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(e) if !e.kind.is_retriable() => return Err(e),
            Err(e) if retry >= max_retries => {
                if max_retries > 0 {
                    tracing::warn!(attempts = retry + 1, error = %e, "Retries exhausted");
                }
                return Err(e);
            }
            Err(e) => {
                let delay = config.delay_for_retry(retry);
                tracing::debug!(retry = retry + 1, ?delay, error = %e, "Transient GitHub error, retrying");
                tokio::time::sleep(delay).await;
                retry += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    use crate::types::RunId;

    fn fast() -> RetryConfig {
        RetryConfig::new(3, Duration::from_millis(1), Duration::from_millis(10), 2.0)
    }

    #[test]
    fn default_delays_are_2_4_8() {
        let config = RetryConfig::DEFAULT;
        let delays: Vec<_> = (0..config.max_retries)
            .map(|r| config.delay_for_retry(r))
            .collect();
        assert_eq!(
            delays,
            vec![
                Duration::from_secs(2),
                Duration::from_secs(4),
                Duration::from_secs(8)
            ]
        );
    }

    #[test]
    fn mutations_are_not_retried() {
        let run = RunId(5);
        assert_eq!(
            RetryPolicy::for_effect(&ActionsEffect::CancelWorkflowRun { run }),
            RetryPolicy::NoRetry
        );
        assert_eq!(
            RetryPolicy::for_effect(&ActionsEffect::GetWorkflowRun { run }),
            RetryPolicy::RetryTransient
        );
    }

    #[tokio::test]
    async fn transient_error_retried_until_success() {
        let calls = Arc::new(AtomicU32::new(0));
        let calls_in_op = calls.clone();

        let result = retry_with_backoff(fast(), RetryPolicy::RetryTransient, move || {
            let n = calls_in_op.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(GitHubApiError::transient_without_source("502 bad gateway"))
                } else {
                    Ok(n)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn permanent_error_returned_immediately() {
        let calls = Arc::new(AtomicU32::new(0));
        let calls_in_op = calls.clone();

        let result = retry_with_backoff(fast(), RetryPolicy::RetryTransient, move || {
            calls_in_op.fetch_add(1, Ordering::SeqCst);
            async { Err::<(), _>(GitHubApiError::permanent_without_source("run not found")) }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn exhausted_retries_return_last_error() {
        let calls = Arc::new(AtomicU32::new(0));
        let calls_in_op = calls.clone();

        let result = retry_with_backoff(fast(), RetryPolicy::RetryTransient, move || {
            let n = calls_in_op.fetch_add(1, Ordering::SeqCst);
            async move {
                Err::<(), _>(GitHubApiError::transient_without_source(format!("fail {n}")))
            }
        })
        .await;

        assert_eq!(result.unwrap_err().message, "fail 3");
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn no_retry_policy_makes_one_attempt() {
        let calls = Arc::new(AtomicU32::new(0));
        let calls_in_op = calls.clone();

        let result = retry_with_backoff(fast(), RetryPolicy::NoRetry, move || {
            calls_in_op.fetch_add(1, Ordering::SeqCst);
            async { Err::<(), _>(GitHubApiError::transient_without_source("503")) }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    proptest! {
        #[test]
        fn delays_are_monotonic_and_capped(
            initial_ms in 1u64..1000,
            max_ms in 1000u64..60000,
            multiplier in 1.0f64..3.0,
            retry in 0u32..12,
        ) {
            let config = RetryConfig::new(
                12,
                Duration::from_millis(initial_ms),
                Duration::from_millis(max_ms),
                multiplier,
            );

            let delay = config.delay_for_retry(retry);
            prop_assert!(delay <= Duration::from_millis(max_ms));
            if retry > 0 {
                prop_assert!(delay >= config.delay_for_retry(retry - 1));
            }
        }
    }
}
