//! Feed trait implemented by pull request sources.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{DetailedPullRequestResponse, PullRequestPage, RateLimitReport};

/// A source of pull request feed data (GitHub today).
#[async_trait]
pub trait PullRequestFeed: Send + Sync {
    /// Get the provider name (e.g., "github")
    fn name(&self) -> &str;

    /// Get one page of pull requests authored by `username`.
    async fn get_pull_requests(
        &self,
        username: &str,
        page: u32,
        per_page: u32,
    ) -> Result<PullRequestPage>;

    /// Get the full detail of a single pull request.
    async fn get_pull_request_details(
        &self,
        owner: &str,
        repo: &str,
        pull_number: i64,
    ) -> Result<DetailedPullRequestResponse>;

    /// Get the current API quota.
    async fn get_rate_limit(&self) -> Result<RateLimitReport>;
}
