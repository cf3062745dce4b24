//! Transport seam between the feed pipeline and GitHub.

use async_trait::async_trait;
use prfeed_core::{RateLimitStatus, Result};

use crate::types::{GitHubComment, GitHubPullRequest, GitHubRepository, GitHubSearchResponse};

/// The GitHub REST endpoints the feed consumes.
///
/// Each method performs exactly one HTTP request; retries and pacing are
/// layered on top by the pipeline.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GitHubApi: Send + Sync {
    /// `GET /search/issues?q=..&sort=created&order=desc&per_page=..&page=..`
    ///
    /// Hits come back newest first, so a capped prefix of the results is
    /// always the most recent pull requests.
    async fn search_issues(
        &self,
        query: &str,
        page: u32,
        per_page: u32,
    ) -> Result<GitHubSearchResponse>;

    /// `GET /repos/{owner}/{repo}/pulls/{number}`
    async fn get_pull_request(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
    ) -> Result<GitHubPullRequest>;

    /// `GET /repos/{owner}/{repo}`
    async fn get_repository(&self, owner: &str, repo: &str) -> Result<GitHubRepository>;

    /// `GET /repos/{owner}/{repo}/issues/{number}/comments`
    async fn list_issue_comments(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
    ) -> Result<Vec<GitHubComment>>;

    /// `GET /rate_limit` (core bucket)
    async fn get_rate_limit(&self) -> Result<RateLimitStatus>;
}
