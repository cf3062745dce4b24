//! Public response types produced by the pull request feed.

use serde::{Deserialize, Serialize};

/// Lifecycle state of a pull request as exposed to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PullRequestState {
    Open,
    Closed,
    Merged,
}

impl PullRequestState {
    /// Derive the public state from upstream fields.
    ///
    /// A merge timestamp always wins over whatever `state` GitHub reported,
    /// so `Merged` holds exactly when `merged_at` is present.
    pub fn derive(merged_at: Option<&str>, raw_state: &str) -> Self {
        if merged_at.is_some() {
            PullRequestState::Merged
        } else if raw_state.eq_ignore_ascii_case("closed") {
            PullRequestState::Closed
        } else {
            PullRequestState::Open
        }
    }
}

/// Repository the pull request targets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositorySummary {
    pub name: String,
    pub description: Option<String>,
    pub language: Option<String>,
    pub html_url: String,
}

/// Enriched pull request entry of the feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestResponse {
    pub id: u64,
    pub number: u64,
    pub title: String,
    pub description: Option<String>,
    pub created_at: String,
    pub merged_at: Option<String>,
    pub html_url: String,
    pub state: PullRequestState,
    pub repository: RepositorySummary,
}

/// Author of a pull request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestAuthor {
    pub login: String,
    pub avatar_url: String,
    pub html_url: String,
}

/// Full detail view of a single pull request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailedPullRequestResponse {
    #[serde(flatten)]
    pub summary: PullRequestResponse,
    pub updated_at: String,
    pub closed_at: Option<String>,
    pub draft: bool,
    pub commits: u64,
    pub additions: u64,
    pub deletions: u64,
    pub changed_files: u64,
    pub comments: u64,
    pub author: PullRequestAuthor,
}

/// Pagination metadata for a feed page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationMeta {
    pub page: u32,
    pub per_page: u32,
    pub total_count: u64,
    pub total_pages: u64,
    pub has_next_page: bool,
    pub has_previous_page: bool,
}

impl PaginationMeta {
    /// Compute metadata for `page` of size `per_page` over `total_count` items.
    ///
    /// `per_page` must be at least 1; callers clamp before getting here.
    pub fn new(page: u32, per_page: u32, total_count: u64) -> Self {
        let total_pages = total_count.div_ceil(u64::from(per_page.max(1)));
        Self {
            page,
            per_page,
            total_count,
            total_pages,
            has_next_page: u64::from(page) < total_pages,
            has_previous_page: page > 1,
        }
    }
}

/// One page of the pull request feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestPage {
    pub pull_requests: Vec<PullRequestResponse>,
    pub pagination: PaginationMeta,
}

/// Core API quota as reported by GitHub.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitStatus {
    pub limit: u64,
    pub remaining: u64,
    /// Epoch seconds at which the quota resets.
    pub reset: u64,
    pub used: u64,
}

/// Quota wrapped with a status message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitReport {
    pub message: String,
    pub rate_limit: RateLimitStatus,
}
