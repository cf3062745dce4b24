//! Pull request feed service: the public façade over the GitHub pipeline.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use prfeed_core::{
    Config, DetailedPullRequestResponse, Error, PullRequestFeed, PullRequestPage,
    RateLimitReport, Result,
};
use tracing::{debug, error, info, warn};

use crate::api::GitHubApi;
use crate::enrich::{DetailEnricher, DEFAULT_ITEM_DELAY, ENRICHMENT_CAP};
use crate::mapping::map_detailed_pull_request;
use crate::pagination::assemble_page;
use crate::rate_limit::{ensure_quota, fetch_status, ApiOperation};
use crate::retry::{with_retry, RetryPolicy};
use crate::search::{author_query, SearchFetcher, DEFAULT_PAGE_DELAY, SEARCH_RESULT_LIMIT};

/// Feed backed by the GitHub REST API.
///
/// The service owns no mutable state; the injected [`GitHubApi`] is the
/// only collaborator, so one instance can serve concurrent requests.
pub struct GitHubPullRequestService {
    api: Arc<dyn GitHubApi>,
    retry: RetryPolicy,
    page_delay: Duration,
    item_delay: Duration,
}

impl GitHubPullRequestService {
    pub fn new(api: Arc<dyn GitHubApi>) -> Self {
        Self {
            api,
            retry: RetryPolicy::default(),
            page_delay: DEFAULT_PAGE_DELAY,
            item_delay: DEFAULT_ITEM_DELAY,
        }
    }

    /// Build a service with the retry settings from `config`.
    pub fn from_config(api: Arc<dyn GitHubApi>, config: &Config) -> Self {
        Self::new(api).with_retry_policy(RetryPolicy::from(&config.retry))
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Override the pauses between search pages and enriched items.
    pub fn with_delays(mut self, page_delay: Duration, item_delay: Duration) -> Self {
        self.page_delay = page_delay;
        self.item_delay = item_delay;
        self
    }

    async fn list_pull_requests(
        &self,
        username: &str,
        page: u32,
        per_page: u32,
    ) -> Result<PullRequestPage> {
        let page = page.max(1);
        let per_page = per_page.max(1);
        let items_needed = (u64::from(page) * u64::from(per_page)).min(SEARCH_RESULT_LIMIT);
        let item_count = items_needed.min(ENRICHMENT_CAP as u64);

        ensure_quota(self.api.as_ref(), ApiOperation::PullRequests { item_count }).await?;

        let query = author_query(username);
        let fetcher = SearchFetcher::new(self.api.as_ref(), self.retry).with_page_delay(self.page_delay);

        let total_count = fetcher.fetch_total_count(&query).await?;
        let items = fetcher.fetch_items(&query, items_needed).await;
        debug!(
            username,
            total_count,
            fetched = items.len(),
            "Search results collected"
        );

        let enriched = DetailEnricher::new(self.api.as_ref(), self.retry)
            .with_item_delay(self.item_delay)
            .enrich(&items)
            .await;

        let result = assemble_page(enriched, page, per_page, total_count);
        info!(
            username,
            page,
            per_page,
            returned = result.pull_requests.len(),
            total_count,
            "Pull requests fetched"
        );
        Ok(result)
    }
}

/// Reject bad coordinates before anything goes over the network.
fn validate_detail_args<'a>(
    owner: &'a str,
    repo: &'a str,
    pull_number: i64,
) -> Result<(&'a str, &'a str, u64)> {
    let owner = owner.trim();
    let repo = repo.trim();

    if owner.is_empty() {
        return Err(Error::InvalidInput("owner must not be empty".to_string()));
    }
    if repo.is_empty() {
        return Err(Error::InvalidInput("repo must not be empty".to_string()));
    }
    let number = u64::try_from(pull_number)
        .ok()
        .filter(|n| *n > 0)
        .ok_or_else(|| {
            Error::InvalidInput(format!(
                "pull number must be a positive integer, got {}",
                pull_number
            ))
        })?;

    Ok((owner, repo, number))
}

#[async_trait]
impl PullRequestFeed for GitHubPullRequestService {
    fn name(&self) -> &str {
        "github"
    }

    async fn get_pull_requests(
        &self,
        username: &str,
        page: u32,
        per_page: u32,
    ) -> Result<PullRequestPage> {
        self.list_pull_requests(username, page, per_page)
            .await
            .map_err(|e| {
                error!(username, error = %e, "Failed to fetch pull requests");
                Error::GitHub(e.to_string())
            })
    }

    async fn get_pull_request_details(
        &self,
        owner: &str,
        repo: &str,
        pull_number: i64,
    ) -> Result<DetailedPullRequestResponse> {
        let (owner, repo, number) = validate_detail_args(owner, repo, pull_number)?;

        ensure_quota(self.api.as_ref(), ApiOperation::PullRequestDetails).await?;

        let api = self.api.as_ref();
        let fetched = tokio::try_join!(
            with_retry(&self.retry, "get_pull_request", || {
                api.get_pull_request(owner, repo, number)
            }),
            with_retry(&self.retry, "list_issue_comments", || {
                api.list_issue_comments(owner, repo, number)
            }),
        );

        let (pr, comments) = match fetched {
            Ok(parts) => parts,
            Err(e) if e.is_not_found() => {
                warn!(owner, repo, number, "Pull request not found");
                return Err(e);
            }
            Err(e) => {
                error!(owner, repo, number, error = %e, "Failed to fetch pull request details");
                return Err(e);
            }
        };

        Ok(map_detailed_pull_request(
            &pr,
            owner,
            repo,
            comments.len() as u64,
        ))
    }

    async fn get_rate_limit(&self) -> Result<RateLimitReport> {
        let rate_limit = fetch_status(self.api.as_ref()).await;
        Ok(RateLimitReport {
            message: "Rate limit retrieved successfully".to_string(),
            rate_limit,
        })
    }
}
