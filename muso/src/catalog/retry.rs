//! Bounded retry with exponential backoff
//!
//! Transient catalog errors (rate limiting, outages, transport failures)
//! are retried up to a fixed attempt ceiling with a doubling delay.
//! Permanent errors fail immediately. The base delay is part of the
//! policy so tests can run the loop in milliseconds.

use std::time::Duration;

use tracing::{debug, warn};

use super::CatalogError;

/// Retry policy for catalog requests
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub max_attempts: u32,
    /// Delay before the first retry; doubles each attempt
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Policy with a negligible delay, for tests.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            base_delay: Duration::from_millis(1),
        }
    }
}

/// Run `operation` until it succeeds, fails permanently, or exhausts the
/// policy's attempts. The final transient error is returned to the caller
/// after the ceiling is hit.
pub async fn with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    operation_name: &str,
    mut operation: F,
) -> Result<T, CatalogError>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, CatalogError>>,
{
    let mut delay = policy.base_delay;
    let mut attempt = 0u32;

    loop {
        attempt += 1;

        match operation().await {
            Ok(value) => {
                if attempt > 1 {
                    debug!(operation = operation_name, attempt, "catalog request succeeded after retry");
                }
                return Ok(value);
            }
            Err(err) if !err.is_transient() => {
                warn!(operation = operation_name, error = %err, "permanent catalog error, not retrying");
                return Err(err);
            }
            Err(err) => {
                if attempt >= policy.max_attempts {
                    warn!(
                        operation = operation_name,
                        attempt,
                        error = %err,
                        "catalog retries exhausted"
                    );
                    return Err(err);
                }

                debug!(
                    operation = operation_name,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "transient catalog error, backing off"
                );
                tokio::time::sleep(delay).await;
                delay *= 2;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn succeeds_first_attempt() {
        let mut attempts = 0;
        let result = with_retry(&RetryPolicy::immediate(3), "test", || {
            attempts += 1;
            async { Ok::<_, CatalogError>(42) }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(attempts, 1);
    }

    #[tokio::test]
    async fn retries_rate_limit_then_succeeds() {
        let mut attempts = 0;
        let result = with_retry(&RetryPolicy::immediate(3), "test", || {
            attempts += 1;
            let fail = attempts < 3;
            async move {
                if fail {
                    Err(CatalogError::RateLimited)
                } else {
                    Ok(7)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(attempts, 3);
    }

    #[tokio::test]
    async fn bad_request_is_not_retried() {
        let mut attempts = 0;
        let result: Result<(), _> = with_retry(&RetryPolicy::immediate(3), "test", || {
            attempts += 1;
            async { Err(CatalogError::BadRequest("malformed id".to_string())) }
        })
        .await;

        assert!(matches!(result, Err(CatalogError::BadRequest(_))));
        assert_eq!(attempts, 1);
    }

    #[tokio::test]
    async fn not_found_is_not_retried() {
        let mut attempts = 0;
        let result: Result<(), _> = with_retry(&RetryPolicy::immediate(3), "test", || {
            attempts += 1;
            async { Err(CatalogError::NotFound("gone".to_string())) }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(attempts, 1);
    }

    #[tokio::test]
    async fn exhausts_attempts_on_persistent_transient_error() {
        let mut attempts = 0;
        let result: Result<(), _> = with_retry(&RetryPolicy::immediate(3), "test", || {
            attempts += 1;
            async { Err(CatalogError::Unavailable) }
        })
        .await;

        assert!(matches!(result, Err(CatalogError::Unavailable)));
        assert_eq!(attempts, 3);
    }
}
