//! Retry wrapper with exponential backoff and GitHub rate-limit awareness.

use std::future::Future;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use prfeed_core::config::RetryConfig;
use prfeed_core::{Error, RateLimitHeaders, Result};
use tracing::{info, warn};

/// Longest wait for a primary rate-limit reset.
const PRIMARY_WAIT_CAP: Duration = Duration::from_secs(30);

/// Longest wait requested by a secondary rate limit.
const SECONDARY_WAIT_CAP: Duration = Duration::from_secs(60);

/// How often and how patiently a single API call is attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one
    pub max_retries: u32,
    /// Delay before the second attempt; doubles afterwards
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(1000),
        }
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            base_delay: Duration::from_millis(config.base_delay_ms),
        }
    }
}

impl RetryPolicy {
    /// `base_delay * 2^(attempt-1)`, saturating.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.base_delay.saturating_mul(factor)
    }

    fn attempts(&self) -> u32 {
        self.max_retries.max(1)
    }
}

/// Run `call` until it succeeds or the policy is exhausted.
///
/// Primary rate limits (403 with no remaining quota) wait for the reset
/// time, secondary rate limits (429) honour `retry-after`, any other error
/// backs off exponentially. Exhausted rate limits surface as
/// [`Error::RateLimitExceeded`] / [`Error::SecondaryRateLimitExceeded`];
/// other errors are returned unchanged after the final attempt.
pub async fn with_retry<T, F, Fut>(policy: &RetryPolicy, operation: &str, mut call: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let attempts = policy.attempts();
    let mut attempt = 1;

    loop {
        let error = match call().await {
            Ok(value) => return Ok(value),
            Err(error) => error,
        };
        let last_attempt = attempt >= attempts;

        let wait = if error.is_primary_rate_limit() {
            if last_attempt {
                warn!(operation, attempts, "Rate limit exceeded, giving up");
                return Err(Error::RateLimitExceeded { attempts });
            }
            let wait = primary_wait(policy, attempt, error.rate_limit_headers(), now_millis());
            info!(
                operation,
                attempt,
                wait_ms = wait.as_millis() as u64,
                "Rate limit hit, waiting for reset"
            );
            wait
        } else if error.is_secondary_rate_limit() {
            if last_attempt {
                warn!(operation, attempts, "Secondary rate limit exceeded, giving up");
                return Err(Error::SecondaryRateLimitExceeded { attempts });
            }
            let wait = secondary_wait(policy, attempt, error.rate_limit_headers());
            info!(
                operation,
                attempt,
                wait_ms = wait.as_millis() as u64,
                "Secondary rate limit hit, backing off"
            );
            wait
        } else {
            if last_attempt {
                return Err(error);
            }
            let wait = policy.backoff(attempt);
            info!(
                operation,
                attempt,
                wait_ms = wait.as_millis() as u64,
                error = %error,
                "Request failed, retrying"
            );
            wait
        };

        tokio::time::sleep(wait).await;
        attempt += 1;
    }
}

/// Wait until `x-ratelimit-reset`, or back off when the reset is unknown
/// or already behind us.
fn primary_wait(
    policy: &RetryPolicy,
    attempt: u32,
    headers: Option<&RateLimitHeaders>,
    now_ms: u64,
) -> Duration {
    let until_reset = headers
        .and_then(|h| h.reset)
        .map(|reset| reset.saturating_mul(1000).saturating_sub(now_ms))
        .filter(|ms| *ms > 0)
        .map(Duration::from_millis);

    until_reset
        .unwrap_or_else(|| policy.backoff(attempt))
        .min(PRIMARY_WAIT_CAP)
}

/// Honour `retry-after` seconds, or back off when absent.
fn secondary_wait(policy: &RetryPolicy, attempt: u32, headers: Option<&RateLimitHeaders>) -> Duration {
    headers
        .and_then(|h| h.retry_after)
        .map(Duration::from_secs)
        .unwrap_or_else(|| policy.backoff(attempt))
        .min(SECONDARY_WAIT_CAP)
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
