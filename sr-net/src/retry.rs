//! Stateless retry policy with exponential backoff.
//!
//! The policy is threaded explicitly through each call rather than living in
//! ambient state. A caller-supplied deadline is a first-class input: it
//! aborts an in-progress backoff sleep and surfaces as
//! [`NetError::DeadlineExceeded`], never as silently partial data.

use chrono::{DateTime, Utc};
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::NetError;

/// Classification of one failed fetch attempt, decided by the caller from
/// the response it saw.
#[derive(Debug)]
pub enum FetchError {
    /// Upstream says the target does not exist. Never retried.
    NotFound,
    /// Quota exhausted; retry no earlier than `reset_at` when known.
    RateLimited { reset_at: Option<DateTime<Utc>> },
    /// Timeout, 5xx, or connection failure. Retried with backoff.
    Transient(String),
}

/// Retry configuration: attempt ceiling and backoff base.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Maximum attempts per request
    pub max_attempts: u32,
    /// Base backoff delay, doubled per attempt
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    /// Backoff for the given zero-based attempt: `base × 2^attempt`.
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.base_delay * 2u32.saturating_pow(attempt)
    }
}

/// Run `op` until it succeeds, fails permanently, or attempts run out.
///
/// Rate-limited attempts wait until the advertised reset or the backoff
/// floor, whichever is longer. `NotFound` short-circuits without retrying.
pub async fn with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    deadline: Option<Instant>,
    what: &str,
    mut op: F,
) -> Result<T, NetError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, FetchError>>,
{
    let mut last_error = String::new();

    for attempt in 0..policy.max_attempts {
        match op().await {
            Ok(value) => return Ok(value),
            Err(FetchError::NotFound) => return Err(NetError::NotFound),
            Err(FetchError::RateLimited { reset_at }) => {
                let floor = policy.backoff(attempt);
                let wait = rate_limit_wait(reset_at).map_or(floor, |r| r.max(floor));
                last_error = "rate limited".to_string();
                warn!("{} rate limited, waiting {:?} (attempt {})", what, wait, attempt + 1);
                if attempt + 1 < policy.max_attempts {
                    sleep_bounded(wait, deadline).await?;
                }
            }
            Err(FetchError::Transient(msg)) => {
                let wait = policy.backoff(attempt);
                debug!("{} failed: {} (attempt {}, backoff {:?})", what, msg, attempt + 1, wait);
                last_error = msg;
                if attempt + 1 < policy.max_attempts {
                    sleep_bounded(wait, deadline).await?;
                }
            }
        }
    }

    Err(NetError::RetriesExhausted {
        attempts: policy.max_attempts,
        last_error,
    })
}

/// Time until the advertised quota reset, `None` if unknown or in the past.
fn rate_limit_wait(reset_at: Option<DateTime<Utc>>) -> Option<Duration> {
    let reset = reset_at?;
    (reset - Utc::now()).to_std().ok()
}

/// Sleep for `wait`, aborting early if the deadline fires first.
async fn sleep_bounded(wait: Duration, deadline: Option<Instant>) -> Result<(), NetError> {
    match deadline {
        None => {
            tokio::time::sleep(wait).await;
            Ok(())
        }
        Some(d) => {
            tokio::select! {
                _ = tokio::time::sleep(wait) => Ok(()),
                _ = tokio::time::sleep_until(d) => Err(NetError::DeadlineExceeded),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn test_backoff_doubles() {
        let policy = RetryPolicy {
            max_attempts: 4,
            base_delay: Duration::from_millis(100),
        };
        assert_eq!(policy.backoff(0), Duration::from_millis(100));
        assert_eq!(policy.backoff(1), Duration::from_millis(200));
        assert_eq!(policy.backoff(2), Duration::from_millis(400));
    }

    #[tokio::test]
    async fn test_succeeds_after_transient_failures() {
        let policy = RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_millis(1),
        };
        let calls = AtomicU32::new(0);

        let result = with_retry(&policy, None, "test", || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(FetchError::Transient("flaky".to_string()))
                } else {
                    Ok(42)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_not_found_short_circuits() {
        let policy = RetryPolicy::default();
        let calls = AtomicU32::new(0);

        let result: Result<(), _> = with_retry(&policy, None, "test", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(FetchError::NotFound) }
        })
        .await;

        assert!(matches!(result, Err(NetError::NotFound)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retries_exhausted() {
        let policy = RetryPolicy {
            max_attempts: 2,
            base_delay: Duration::from_millis(1),
        };

        let result: Result<(), _> = with_retry(&policy, None, "test", || async {
            Err(FetchError::Transient("down".to_string()))
        })
        .await;

        match result {
            Err(NetError::RetriesExhausted { attempts, last_error }) => {
                assert_eq!(attempts, 2);
                assert_eq!(last_error, "down");
            }
            other => panic!("expected RetriesExhausted, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_deadline_aborts_backoff() {
        let policy = RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_secs(60),
        };
        let deadline = Instant::now() + Duration::from_millis(20);

        let start = std::time::Instant::now();
        let result: Result<(), _> = with_retry(&policy, Some(deadline), "test", || async {
            Err(FetchError::Transient("down".to_string()))
        })
        .await;

        assert!(matches!(result, Err(NetError::DeadlineExceeded)));
        // the 60s backoff sleep must have been cut short
        assert!(start.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_rate_limit_waits_at_least_backoff_floor() {
        let policy = RetryPolicy {
            max_attempts: 2,
            base_delay: Duration::from_millis(5),
        };
        // reset already in the past: the backoff floor still applies
        let reset = Utc::now() - chrono::Duration::seconds(10);
        let calls = AtomicU32::new(0);

        let result = with_retry(&policy, None, "test", || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n == 0 {
                    Err(FetchError::RateLimited {
                        reset_at: Some(reset),
                    })
                } else {
                    Ok(7)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 7);
    }
}
