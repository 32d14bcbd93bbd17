//! Retry utilities for transient collaborator failures.
//!
//! Provides classification of retryable errors and exponential backoff.

use std::future::Future;
use std::time::Duration;

use crate::config::RetryConfig;
use crate::error::PipelineError;

/// Determine whether a pipeline error is worth retrying.
///
/// Retryable errors: timeouts, rate limits (429), server errors (5xx).
/// Non-retryable: auth failures, bad requests, local decode/encode errors.
pub fn is_retryable(error: &PipelineError) -> bool {
    match error {
        PipelineError::Timeout { .. } => true,
        PipelineError::Matting {
            status_code,
            message,
            ..
        }
        | PipelineError::Naming {
            status_code,
            message,
        } => {
            // Classify by HTTP status code when available (structured)
            if let Some(code) = status_code {
                return *code == 429 || (500..=599).contains(code);
            }
            // Fallback for non-HTTP errors (e.g., connection refused, DNS failure)
            message.contains("timed out") || message.contains("connect")
        }
        _ => false,
    }
}

/// Calculate exponential backoff duration for a given attempt.
///
/// Uses `base_delay * 2^attempt` with a cap at 30 seconds.
pub fn backoff_duration(attempt: u32, base_delay_ms: u64) -> Duration {
    let delay = base_delay_ms.saturating_mul(2u64.saturating_pow(attempt));
    Duration::from_millis(delay.min(30_000))
}

/// Run `operation` up to `config.attempts` times, backing off between
/// retryable failures. The final error is returned unchanged.
pub async fn with_retry<F, Fut, T>(config: &RetryConfig, mut operation: F) -> Result<T, PipelineError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, PipelineError>>,
{
    let attempts = config.attempts.max(1);
    let mut last_error = None;

    for attempt in 0..attempts {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(error) => {
                let final_attempt = attempt + 1 == attempts;
                if final_attempt || !is_retryable(&error) {
                    return Err(error);
                }
                let delay = backoff_duration(attempt, config.base_delay_ms);
                tracing::debug!(
                    "Retryable failure (attempt {}/{}), backing off {:?}: {}",
                    attempt + 1,
                    attempts,
                    delay,
                    error
                );
                tokio::time::sleep(delay).await;
                last_error = Some(error);
            }
        }
    }

    // Unreachable with attempts >= 1; keeps the compiler satisfied.
    Err(last_error.unwrap_or(PipelineError::Naming {
        message: "retry loop exhausted".to_string(),
        status_code: None,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn test_timeout_is_retryable() {
        let err = PipelineError::Timeout {
            image_id: "abc".to_string(),
            stage: "matting".to_string(),
            timeout_ms: 60000,
        };
        assert!(is_retryable(&err));
    }

    #[test]
    fn test_rate_limit_is_retryable() {
        let err = PipelineError::Naming {
            message: "HTTP 429: rate limit exceeded".to_string(),
            status_code: Some(429),
        };
        assert!(is_retryable(&err));
    }

    #[test]
    fn test_server_error_is_retryable() {
        let err = PipelineError::Matting {
            image_id: "abc".to_string(),
            message: "HTTP 503: service unavailable".to_string(),
            status_code: Some(503),
        };
        assert!(is_retryable(&err));
    }

    #[test]
    fn test_auth_error_not_retryable() {
        let err = PipelineError::Naming {
            message: "HTTP 401: unauthorized".to_string(),
            status_code: Some(401),
        };
        assert!(!is_retryable(&err));
    }

    #[test]
    fn test_decode_error_not_retryable() {
        let err = PipelineError::Decode {
            image_id: "abc".to_string(),
            message: "invalid header".to_string(),
        };
        assert!(!is_retryable(&err));
    }

    #[test]
    fn test_message_with_500_in_body_not_retryable_without_status() {
        let err = PipelineError::Naming {
            message: "Suggested 500 names successfully".to_string(),
            status_code: None,
        };
        assert!(!is_retryable(&err));
    }

    #[test]
    fn test_connection_error_retryable_without_status() {
        let err = PipelineError::Matting {
            image_id: "abc".to_string(),
            message: "connection refused".to_string(),
            status_code: None,
        };
        assert!(is_retryable(&err));
    }

    #[test]
    fn test_backoff_exponential() {
        assert_eq!(backoff_duration(0, 1000), Duration::from_millis(1000));
        assert_eq!(backoff_duration(1, 1000), Duration::from_millis(2000));
        assert_eq!(backoff_duration(2, 1000), Duration::from_millis(4000));
        assert_eq!(backoff_duration(3, 1000), Duration::from_millis(8000));
    }

    #[test]
    fn test_backoff_capped_at_30s() {
        assert_eq!(backoff_duration(10, 1000), Duration::from_millis(30_000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_with_retry_recovers_from_transient_failure() {
        let calls = AtomicU32::new(0);
        let config = RetryConfig {
            attempts: 3,
            base_delay_ms: 10,
        };
        let result = with_retry(&config, || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n == 0 {
                    Err(PipelineError::Naming {
                        message: "HTTP 503".to_string(),
                        status_code: Some(503),
                    })
                } else {
                    Ok(42)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_with_retry_gives_up_on_permanent_failure() {
        let calls = AtomicU32::new(0);
        let config = RetryConfig::default();
        let result: Result<(), _> = with_retry(&config, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async {
                Err(PipelineError::Naming {
                    message: "HTTP 401: unauthorized".to_string(),
                    status_code: Some(401),
                })
            }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
