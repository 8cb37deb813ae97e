//! Retry utilities with exponential backoff.

use std::future::Future;
use std::time::Duration;

use tracing::debug;

/// Configuration for retry behavior with exponential backoff.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of attempts (including the initial attempt).
    pub max_attempts: u32,
    /// Delay after the first failed attempt.
    pub initial_delay: Duration,
    /// Maximum delay cap.
    pub max_delay: Duration,
    /// Multiplier for exponential backoff (e.g., 2.0 doubles delay each retry).
    pub backoff_multiplier: f64,
    /// Jitter factor (0.0-1.0) to spread out concurrent retries.
    pub jitter_factor: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            backoff_multiplier: 2.0,
            jitter_factor: 0.0,
        }
    }
}

impl RetryConfig {
    /// Config with no delay between attempts.
    #[must_use]
    pub const fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            initial_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            backoff_multiplier: 1.0,
            jitter_factor: 0.0,
        }
    }

    /// Calculate delay for a given attempt number (0-indexed).
    #[must_use]
    #[allow(clippy::cast_possible_wrap, clippy::cast_precision_loss)]
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let base_delay =
            self.initial_delay.as_secs_f64() * self.backoff_multiplier.powi(attempt as i32);
        let capped_delay = base_delay.min(self.max_delay.as_secs_f64());

        let jitter = if self.jitter_factor > 0.0 {
            let jitter_range = capped_delay * self.jitter_factor;
            // Deterministic jitter based on attempt number
            let jitter_offset = (f64::from(attempt) * 0.618_033_988_749_895) % 1.0;
            jitter_range * (jitter_offset - 0.5) * 2.0
        } else {
            0.0
        };

        Duration::from_secs_f64((capped_delay + jitter).max(0.0))
    }
}

/// Outcome of a retried operation that never succeeded.
#[derive(Debug)]
pub struct RetryFailure<E> {
    /// Error from the last attempt.
    pub error: E,
    /// Attempts made, including the first.
    pub attempts: u32,
}

/// Run an async operation, retrying only failures for which `should_retry`
/// returns true. Sleeps with `tokio::time` between attempts.
pub async fn with_retry_if<T, E, F, Fut, C>(
    config: &RetryConfig,
    mut operation: F,
    should_retry: C,
) -> std::result::Result<T, RetryFailure<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::result::Result<T, E>>,
    C: Fn(&E) -> bool,
{
    let attempts = config.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(error) => {
                attempt += 1;
                if attempt >= attempts || !should_retry(&error) {
                    return Err(RetryFailure {
                        error,
                        attempts: attempt,
                    });
                }
                let delay = config.delay_for_attempt(attempt - 1);
                debug!(attempt, ?delay, "retrying after failure");
                tokio::time::sleep(delay).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn retry_config_delay_calculation() {
        let config = RetryConfig {
            max_attempts: 5,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(10),
            backoff_multiplier: 2.0,
            jitter_factor: 0.0, // No jitter for deterministic test
        };

        assert_eq!(config.delay_for_attempt(0), Duration::from_millis(100));
        assert_eq!(config.delay_for_attempt(1), Duration::from_millis(200));
        assert_eq!(config.delay_for_attempt(2), Duration::from_millis(400));

        // Should cap at max_delay
        assert_eq!(config.delay_for_attempt(10), Duration::from_secs(10));
    }

    #[test]
    fn retry_config_with_jitter() {
        let config = RetryConfig {
            max_attempts: 3,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(10),
            backoff_multiplier: 2.0,
            jitter_factor: 0.2,
        };

        let d0 = config.delay_for_attempt(0).as_secs_f64();
        assert!((0.08..=0.12).contains(&d0), "delay {d0} outside jitter band");
    }

    #[tokio::test]
    async fn with_retry_succeeds_first_try() {
        let calls = &AtomicU32::new(0);
        let result: std::result::Result<i32, RetryFailure<&str>> = with_retry_if(
            &RetryConfig::immediate(3),
            move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(42)
            },
            |_| true,
        )
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn with_retry_succeeds_after_failures() {
        let calls = &AtomicU32::new(0);
        let started = tokio::time::Instant::now();

        let result = with_retry_if(
            &RetryConfig::default(),
            move || async move {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                if n < 3 { Err("not yet") } else { Ok(n) }
            },
            |_| true,
        )
        .await;

        assert_eq!(result.unwrap(), 3);
        // 1s after the first failure, 2s after the second
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_secs(3) && elapsed < Duration::from_secs(4));
    }

    #[tokio::test]
    async fn with_retry_exhausts_attempts() {
        let calls = &AtomicU32::new(0);
        let result: std::result::Result<(), _> = with_retry_if(
            &RetryConfig::immediate(3),
            move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err("always fails")
            },
            |_| true,
        )
        .await;

        let failure = result.unwrap_err();
        assert_eq!(failure.error, "always fails");
        assert_eq!(failure.attempts, 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn with_retry_if_stops_on_condition_false() {
        let calls = &AtomicU32::new(0);
        let result: std::result::Result<(), _> = with_retry_if(
            &RetryConfig::immediate(5),
            move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err("permanent")
            },
            |e: &&str| *e != "permanent",
        )
        .await;

        assert_eq!(result.unwrap_err().attempts, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
