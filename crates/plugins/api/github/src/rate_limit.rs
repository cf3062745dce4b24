//! Proactive quota check performed before a batch of API calls.
//!
//! The check fails open: if GitHub cannot tell us the current quota, the
//! operation proceeds with optimistic defaults rather than being blocked
//! by a secondary outage.

use std::time::{SystemTime, UNIX_EPOCH};

use prfeed_core::{Error, RateLimitStatus, Result};
use tracing::{debug, warn};

use crate::api::GitHubApi;

/// Operations whose API cost can be estimated up front.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiOperation {
    /// One search call plus a PR and a repository call per item.
    PullRequests { item_count: u64 },
    /// PR detail plus the comments list.
    PullRequestDetails,
}

impl ApiOperation {
    pub fn estimated_calls(&self) -> u64 {
        match self {
            ApiOperation::PullRequests { item_count } => 1 + item_count * 2,
            ApiOperation::PullRequestDetails => 2,
        }
    }
}

/// Quota assumed when the rate-limit endpoint is unavailable.
fn fallback_status() -> RateLimitStatus {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    RateLimitStatus {
        limit: 5000,
        remaining: 4000,
        reset: now + 3600,
        used: 1000,
    }
}

/// Fetch the current core quota, falling back to optimistic defaults.
pub async fn fetch_status(api: &dyn GitHubApi) -> RateLimitStatus {
    match api.get_rate_limit().await {
        Ok(status) => {
            debug!(
                remaining = status.remaining,
                limit = status.limit,
                "Fetched rate limit"
            );
            status
        }
        Err(e) => {
            warn!(error = %e, "Rate limit check failed, assuming quota is available");
            fallback_status()
        }
    }
}

/// Fail with [`Error::InsufficientRateLimit`] if `operation` would exceed
/// the remaining quota.
pub async fn ensure_quota(api: &dyn GitHubApi, operation: ApiOperation) -> Result<()> {
    let required = operation.estimated_calls();
    let status = fetch_status(api).await;

    if required > status.remaining {
        warn!(
            ?operation,
            required,
            remaining = status.remaining,
            "Insufficient rate limit for operation"
        );
        return Err(Error::InsufficientRateLimit {
            required,
            remaining: status.remaining,
        });
    }

    Ok(())
}
