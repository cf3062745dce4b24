//! GitHub API response types.
//!
//! These types represent the raw JSON responses from GitHub API.
//! Search hits are validated into [`SearchItem`] at the boundary; the
//! other types are mapped to the unified feed types in `mapping`.

use prfeed_core::{Error, RateLimitStatus, Result};
use serde::{Deserialize, Serialize};

// =============================================================================
// User
// =============================================================================

/// GitHub user representation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubUser {
    pub id: u64,
    pub login: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub html_url: Option<String>,
}

// =============================================================================
// Search
// =============================================================================

/// Response of `GET /search/issues`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubSearchResponse {
    pub total_count: u64,
    #[serde(default)]
    pub incomplete_results: bool,
    #[serde(default)]
    pub items: Vec<GitHubSearchItem>,
}

/// A single issue/PR hit as returned by the search endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubSearchItem {
    pub id: u64,
    pub number: u64,
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
    pub html_url: String,
    pub created_at: String,
    pub updated_at: String,
    #[serde(default)]
    pub closed_at: Option<String>,
    pub state: String,
}

/// A search hit whose repository coordinates have been validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchItem {
    pub id: u64,
    pub number: u64,
    pub title: String,
    pub body: Option<String>,
    pub html_url: String,
    pub owner: String,
    pub repo: String,
    pub created_at: String,
    pub updated_at: String,
    pub closed_at: Option<String>,
    pub state: String,
}

impl TryFrom<GitHubSearchItem> for SearchItem {
    type Error = Error;

    fn try_from(item: GitHubSearchItem) -> Result<Self> {
        let (owner, repo) = parse_repo_from_html_url(&item.html_url)?;
        Ok(SearchItem {
            id: item.id,
            number: item.number,
            title: item.title,
            body: item.body,
            html_url: item.html_url,
            owner,
            repo,
            created_at: item.created_at,
            updated_at: item.updated_at,
            closed_at: item.closed_at,
            state: item.state,
        })
    }
}

/// Extract `(owner, repo)` from a URL like `https://github.com/owner/repo/pull/1`.
pub fn parse_repo_from_html_url(html_url: &str) -> Result<(String, String)> {
    let segments: Vec<&str> = html_url.split('/').collect();
    match (segments.get(3), segments.get(4)) {
        (Some(owner), Some(repo)) if !owner.is_empty() && !repo.is_empty() => {
            Ok((owner.to_string(), repo.to_string()))
        }
        _ => Err(Error::InvalidData(format!(
            "Cannot determine repository from URL: {}",
            html_url
        ))),
    }
}

// =============================================================================
// Pull Request
// =============================================================================

/// GitHub pull request representation (`GET /repos/{owner}/{repo}/pulls/{n}`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubPullRequest {
    pub id: u64,
    pub number: u64,
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
    pub state: String,
    pub html_url: String,
    #[serde(default)]
    pub draft: bool,
    #[serde(default)]
    pub merged_at: Option<String>,
    #[serde(default)]
    pub closed_at: Option<String>,
    #[serde(default)]
    pub user: Option<GitHubUser>,
    pub created_at: String,
    pub updated_at: String,
    #[serde(default)]
    pub commits: u64,
    #[serde(default)]
    pub additions: u64,
    #[serde(default)]
    pub deletions: u64,
    #[serde(default)]
    pub changed_files: u64,
    #[serde(default)]
    pub base: Option<GitHubBranchRef>,
}

/// GitHub branch reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubBranchRef {
    #[serde(rename = "ref", default)]
    pub ref_name: String,
    #[serde(default)]
    pub sha: String,
    /// Null when the repository was deleted
    #[serde(default)]
    pub repo: Option<GitHubRepository>,
}

// =============================================================================
// Repository
// =============================================================================

/// GitHub repository representation (`GET /repos/{owner}/{repo}`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubRepository {
    pub name: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    pub html_url: String,
}

// =============================================================================
// Comments
// =============================================================================

/// GitHub issue/PR comment (general comments, not code review).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubComment {
    pub id: u64,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub user: Option<GitHubUser>,
    #[serde(default)]
    pub created_at: Option<String>,
}

// =============================================================================
// Rate limit
// =============================================================================

/// Response of `GET /rate_limit`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubRateLimitResponse {
    pub resources: GitHubRateLimitResources,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubRateLimitResources {
    pub core: GitHubRateLimit,
}

/// Quota of a single rate-limit bucket.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GitHubRateLimit {
    pub limit: u64,
    pub remaining: u64,
    pub reset: u64,
    #[serde(default)]
    pub used: u64,
}

impl From<GitHubRateLimit> for RateLimitStatus {
    fn from(rate: GitHubRateLimit) -> Self {
        RateLimitStatus {
            limit: rate.limit,
            remaining: rate.remaining,
            reset: rate.reset,
            used: rate.used,
        }
    }
}
