//! GitHub pull request feed for prfeed.
//!
//! Fetches a user's pull requests through the search API, enriches each hit
//! with PR and repository details, and pages the result. All outbound calls
//! go through a rate-limit aware retry wrapper.

mod api;
mod client;
mod enrich;
mod mapping;
mod pagination;
mod rate_limit;
mod retry;
mod search;
mod service;
mod types;

pub use api::GitHubApi;
pub use client::GitHubClient;
pub use enrich::{DetailEnricher, ENRICHMENT_CAP};
pub use pagination::assemble_page;
pub use rate_limit::{ensure_quota, fetch_status, ApiOperation};
pub use retry::{with_retry, RetryPolicy};
pub use search::{author_query, SearchFetcher, SEARCH_PAGE_LIMIT, SEARCH_RESULT_LIMIT};
pub use service::GitHubPullRequestService;
pub use types::*;

/// Default GitHub API URL.
pub const DEFAULT_GITHUB_URL: &str = "https://api.github.com";
