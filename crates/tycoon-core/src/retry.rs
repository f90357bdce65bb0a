//! Bounded retries for flaky page lookups
//!
//! Pages render asynchronously, so an element looked up right after a click
//! may not exist yet. [`retry_when`] re-runs a lookup while the error matches a
//! predicate, sleeping between attempts according to a [`DelayPolicy`]. Errors
//! that do not match, and the last error once attempts run out, are returned
//! to the caller unchanged.

use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

use crate::{Result, TycoonError};

/// Pause between two attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelayPolicy {
    /// Same pause after every failure
    Fixed(Duration),
    /// `initial`, then `initial + step`, `initial + 2 * step`, ...
    Linear { initial: Duration, step: Duration },
}

impl DelayPolicy {
    /// Pause after the given failed attempt (1-based)
    pub fn delay_after(&self, attempt: usize) -> Duration {
        match *self {
            Self::Fixed(delay) => delay,
            Self::Linear { initial, step } => {
                let steps = u32::try_from(attempt.saturating_sub(1)).unwrap_or(u32::MAX);
                initial.saturating_add(step.saturating_mul(steps))
            }
        }
    }
}

/// Attempt bound and delay for one retried operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first one
    pub max_attempts: usize,
    pub delay: DelayPolicy,
}

impl RetryPolicy {
    pub fn fixed(max_attempts: usize, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay: DelayPolicy::Fixed(delay),
        }
    }

    pub fn linear(max_attempts: usize, initial: Duration, step: Duration) -> Self {
        Self {
            max_attempts,
            delay: DelayPolicy::Linear { initial, step },
        }
    }

    /// Single attempt, no retry
    pub fn once() -> Self {
        Self::fixed(1, Duration::ZERO)
    }
}

/// Run `f` until it succeeds, fails with an error `should_retry` rejects, or
/// `policy.max_attempts` attempts have been made
///
/// # Usage
///
/// ```no_run
/// use std::time::Duration;
/// use tycoon_core::retry::{retry_when, RetryPolicy};
/// use tycoon_core::{Result, TycoonError};
///
/// async fn press_calculate() -> Result<()> {
///     Ok(())
/// }
///
/// async fn example() -> Result<()> {
///     let policy = RetryPolicy::fixed(6, Duration::from_secs(5));
///     retry_when("calculate", &policy, TycoonError::is_transient, || press_calculate()).await
/// }
/// ```
pub async fn retry_when<F, Fut, T, P>(
    operation_name: &str,
    policy: &RetryPolicy,
    should_retry: P,
    mut f: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
    P: Fn(&TycoonError) -> bool,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match f().await {
            Ok(val) => {
                if attempt > 1 {
                    debug!("{} succeeded on attempt {}", operation_name, attempt);
                }
                return Ok(val);
            }
            Err(e) if !should_retry(&e) => return Err(e),
            Err(e) if attempt >= max_attempts => {
                warn!(
                    "{} failed after {} attempts: {}",
                    operation_name, max_attempts, e
                );
                return Err(e);
            }
            Err(e) => {
                let delay = policy.delay.delay_after(attempt);
                debug!(
                    "{} failed (attempt {}/{}), retrying in {:?}: {}",
                    operation_name, attempt, max_attempts, delay, e
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

/// [`retry_when`] retrying only transient lookup failures
pub async fn retry_transient<F, Fut, T>(operation_name: &str, policy: &RetryPolicy, f: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    retry_when(operation_name, policy, TycoonError::is_transient, f).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quick(max_attempts: usize) -> RetryPolicy {
        RetryPolicy::fixed(max_attempts, Duration::ZERO)
    }

    #[test]
    fn test_delay_policies() {
        let fixed = DelayPolicy::Fixed(Duration::from_secs(5));
        assert_eq!(fixed.delay_after(1), Duration::from_secs(5));
        assert_eq!(fixed.delay_after(4), Duration::from_secs(5));

        let linear = DelayPolicy::Linear {
            initial: Duration::from_secs(1),
            step: Duration::from_secs(1),
        };
        assert_eq!(linear.delay_after(1), Duration::from_secs(1));
        assert_eq!(linear.delay_after(3), Duration::from_secs(3));
    }

    #[tokio::test]
    async fn test_success_first_try() {
        let mut attempts = 0;
        let result = retry_transient("test_op", &quick(3), || {
            attempts += 1;
            async move { Ok::<_, TycoonError>(42) }
        })
        .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(attempts, 1);
    }

    #[tokio::test]
    async fn test_success_after_transient_failures() {
        let mut attempts = 0;
        let result = retry_transient("test_op", &quick(6), || {
            attempts += 1;
            let current = attempts;
            async move {
                if current < 3 {
                    Err(TycoonError::TransientLookup("#calculate_button".to_string()))
                } else {
                    Ok(current)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 3);
        assert_eq!(attempts, 3);
    }

    #[tokio::test]
    async fn test_non_retryable_error_stops_immediately() {
        let mut attempts = 0;
        let result = retry_transient("test_op", &quick(6), || {
            attempts += 1;
            async move { Err::<i32, _>(TycoonError::Parse("pax".to_string())) }
        })
        .await;
        assert!(matches!(result, Err(TycoonError::Parse(_))));
        assert_eq!(attempts, 1);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        let mut attempts = 0;
        let result = retry_transient("test_op", &quick(4), || {
            attempts += 1;
            async move { Err::<i32, _>(TycoonError::TransientLookup("#missing".to_string())) }
        })
        .await;
        assert!(result.unwrap_err().is_transient());
        assert_eq!(attempts, 4);
    }

    #[tokio::test]
    async fn test_custom_predicate() {
        let mut attempts = 0;
        let result = retry_when(
            "test_op",
            &quick(3),
            |e| matches!(e, TycoonError::Browser(_)),
            || {
                attempts += 1;
                async move { Err::<i32, _>(TycoonError::Browser("click intercepted".to_string())) }
            },
        )
        .await;
        assert!(result.is_err());
        assert_eq!(attempts, 3);
    }

    #[tokio::test]
    async fn test_zero_attempts_still_runs_once() {
        let mut attempts = 0;
        let result = retry_transient("test_op", &quick(0), || {
            attempts += 1;
            async move { Ok::<_, TycoonError>(()) }
        })
        .await;
        assert!(result.is_ok());
        assert_eq!(attempts, 1);
    }
}
