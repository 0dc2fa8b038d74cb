//! Bounded retry with exponential backoff.
//!
//! [`RetryPolicy`] carries the tunable knobs; [`with_retry`] is the generic
//! driver. Errors are classified by a caller-supplied predicate into
//! [`ErrorClass::Transient`] (retried) or [`ErrorClass::Fatal`] (aborted
//! immediately), keeping the policy free of any domain coupling.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use tracing::warn;

// ============================================================================
// Error Classification
// ============================================================================

/// Whether a failed operation is worth retrying.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// May self-resolve: network blip, 5xx, transient rate limit.
    Transient,
    /// Will not self-resolve: auth failure, 4xx client error, quota
    /// exhausted. Retried zero times.
    Fatal,
}

// ============================================================================
// Retry Policy
// ============================================================================

/// Policy for retrying failed operations.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total number of attempts, first call included.
    pub max_attempts: u32,
    /// Base delay between attempts.
    pub base_delay: Duration,
    /// Whether to use exponential backoff.
    pub exponential_backoff: bool,
    /// Maximum delay between attempts.
    pub max_delay: Duration,
}

impl RetryPolicy {
    /// Creates a new retry policy with the given attempt bound.
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            base_delay: Duration::from_millis(1000),
            exponential_backoff: true,
            max_delay: Duration::from_secs(60),
        }
    }

    /// Disables retries: one attempt, no delay.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            base_delay: Duration::ZERO,
            exponential_backoff: false,
            max_delay: Duration::ZERO,
        }
    }

    /// Sets the base delay.
    pub fn with_base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    /// Enables or disables exponential backoff.
    pub fn with_exponential_backoff(mut self, enabled: bool) -> Self {
        self.exponential_backoff = enabled;
        self
    }

    /// Sets the maximum delay cap.
    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Calculates the delay after a given attempt number (1-based).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let delay = if self.exponential_backoff {
            self.base_delay
                .saturating_mul(2u32.saturating_pow(attempt.saturating_sub(1)))
        } else {
            self.base_delay
        };

        delay.min(self.max_delay)
    }

    /// Determines if a plain transport error should be retried.
    pub fn should_retry(&self, error: &reqwest::Error) -> bool {
        // Retry on connection errors and timeouts
        error.is_connect() || error.is_timeout()
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3)
    }
}

// ============================================================================
// Generic Driver
// ============================================================================

/// Runs `operation` under `policy`, retrying transient failures.
///
/// The operation is invoked at most `policy.max_attempts` times. After each
/// failure, `classify` decides the error's fate: [`ErrorClass::Fatal`]
/// propagates immediately without another attempt; [`ErrorClass::Transient`]
/// waits `delay_for_attempt` and retries while attempts remain. When the
/// attempt bound is exhausted, the last error is propagated.
///
/// # Errors
///
/// Returns the operation's own error, either the first fatal one or the
/// last transient one.
pub async fn with_retry<T, E, C, F, Fut>(
    policy: &RetryPolicy,
    classify: C,
    mut operation: F,
) -> Result<T, E>
where
    E: Display,
    C: Fn(&E) -> ErrorClass,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut attempt = 0u32;

    loop {
        attempt += 1;

        match operation().await {
            Ok(value) => return Ok(value),
            Err(error) => {
                if classify(&error) == ErrorClass::Fatal {
                    warn!(attempt, error = %error, "Fatal error, not retrying");
                    return Err(error);
                }
                if attempt >= policy.max_attempts {
                    warn!(attempt, error = %error, "Retry attempts exhausted");
                    return Err(error);
                }

                let delay = policy.delay_for_attempt(attempt);
                warn!(
                    attempt,
                    error = %error,
                    delay_ms = delay.as_millis(),
                    "Transient error, retrying"
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[derive(Debug, thiserror::Error)]
    enum TestError {
        #[error("transient")]
        Transient,
        #[error("fatal")]
        Fatal,
    }

    fn classify(error: &TestError) -> ErrorClass {
        match error {
            TestError::Transient => ErrorClass::Transient,
            TestError::Fatal => ErrorClass::Fatal,
        }
    }

    fn instant_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy::new(max_attempts).with_base_delay(Duration::ZERO)
    }

    #[test]
    fn test_exponential_backoff() {
        let policy = RetryPolicy::default();

        assert_eq!(policy.delay_for_attempt(1), Duration::from_secs(1));
        assert_eq!(policy.delay_for_attempt(2), Duration::from_secs(2));
        assert_eq!(policy.delay_for_attempt(3), Duration::from_secs(4));
        assert_eq!(policy.delay_for_attempt(4), Duration::from_secs(8));
    }

    #[test]
    fn test_flat_backoff() {
        let policy = RetryPolicy::new(3)
            .with_base_delay(Duration::from_millis(500))
            .with_exponential_backoff(false);

        assert_eq!(policy.delay_for_attempt(1), Duration::from_millis(500));
        assert_eq!(policy.delay_for_attempt(4), Duration::from_millis(500));
    }

    #[test]
    fn test_max_delay_cap() {
        let policy = RetryPolicy::new(10).with_base_delay(Duration::from_secs(10));

        // Should be capped at 60 seconds
        assert_eq!(policy.delay_for_attempt(5), Duration::from_secs(60));
    }

    #[tokio::test]
    async fn test_success_first_try_runs_once() {
        let calls = AtomicU32::new(0);
        let result: Result<u32, TestError> = with_retry(&instant_policy(3), classify, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok(42) }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_fatal_error_attempted_exactly_once() {
        let calls = AtomicU32::new(0);
        let result: Result<u32, TestError> = with_retry(&instant_policy(3), classify, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(TestError::Fatal) }
        })
        .await;

        assert!(matches!(result, Err(TestError::Fatal)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_transient_then_success_counts_attempts() {
        // Fails twice, succeeds on the third call: max_attempts invocations
        // in the worst case.
        let calls = AtomicU32::new(0);
        let result: Result<u32, TestError> = with_retry(&instant_policy(3), classify, || {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            async move {
                if n < 3 {
                    Err(TestError::Transient)
                } else {
                    Ok(n)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_exhaustion_propagates_last_error() {
        let calls = AtomicU32::new(0);
        let result: Result<u32, TestError> = with_retry(&instant_policy(3), classify, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(TestError::Transient) }
        })
        .await;

        assert!(matches!(result, Err(TestError::Transient)));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_no_retry_policy_runs_once() {
        let calls = AtomicU32::new(0);
        let result: Result<u32, TestError> = with_retry(&RetryPolicy::no_retry(), classify, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(TestError::Transient) }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
