// SPDX-License-Identifier: MIT
//
// Upload retry policy: exponential backoff for transient store failures.
//
// The documented policy is 3 attempts with delays of 1s, 2s, 4s between
// them. Only store-level and connection-class I/O errors are retried;
// everything else (bad input, encoding failures) is permanent.

use std::future::Future;
use std::time::Duration;

use notendruck_core::error::NotendruckError;
use tracing::{debug, warn};

/// Retry configuration for store writes.
#[derive(Debug, Clone, Copy)]
pub struct RetryConfig {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    /// Delay before the first retry; doubles each attempt.
    pub base_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl RetryConfig {
    /// Delay before retry number `attempt` (0-based): base × 2^attempt.
    pub fn delay(&self, attempt: u32) -> Duration {
        self.base_delay * 2u32.saturating_pow(attempt.min(16))
    }
}

/// Whether an error is worth retrying.
pub fn is_transient(err: &NotendruckError) -> bool {
    match err {
        NotendruckError::Store(_) => true,
        NotendruckError::Io(io_err) => matches!(
            io_err.kind(),
            std::io::ErrorKind::TimedOut
                | std::io::ErrorKind::ConnectionRefused
                | std::io::ErrorKind::ConnectionReset
                | std::io::ErrorKind::ConnectionAborted
                | std::io::ErrorKind::Interrupted
        ),
        _ => false,
    }
}

/// Run an async store operation with the configured backoff.
///
/// Returns the first success, or the last error once attempts are
/// exhausted or a permanent error is seen.
pub async fn with_retries<T, F, Fut>(
    config: &RetryConfig,
    operation_name: &str,
    mut operation: F,
) -> Result<T, NotendruckError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, NotendruckError>>,
{
    let mut attempt: u32 = 0;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) if is_transient(&err) && attempt + 1 < config.max_attempts => {
                let delay = config.delay(attempt);
                warn!(
                    operation = operation_name,
                    attempt = attempt + 1,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "transient failure, backing off"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(err) => {
                debug!(operation = operation_name, attempts = attempt + 1, "giving up");
                return Err(err);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn store_errors_are_transient() {
        assert!(is_transient(&NotendruckError::Store("hiccup".into())));
    }

    #[test]
    fn encoding_errors_are_permanent() {
        assert!(!is_transient(&NotendruckError::Image("bad png".into())));
        assert!(!is_transient(&NotendruckError::Qr("overflow".into())));
    }

    #[test]
    fn delays_follow_the_documented_policy() {
        let config = RetryConfig::default();
        assert_eq!(config.delay(0), Duration::from_secs(1));
        assert_eq!(config.delay(1), Duration::from_secs(2));
        assert_eq!(config.delay(2), Duration::from_secs(4));
    }

    #[tokio::test(start_paused = true)]
    async fn retries_until_success() {
        let calls = AtomicU32::new(0);
        let result = with_retries(&RetryConfig::default(), "test", || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(NotendruckError::Store("blip".into()))
                } else {
                    Ok(n)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn exhaustion_returns_last_error() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = with_retries(&RetryConfig::default(), "test", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(NotendruckError::Store("down".into())) }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn permanent_errors_fail_immediately() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = with_retries(&RetryConfig::default(), "test", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(NotendruckError::Pdf("malformed".into())) }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
