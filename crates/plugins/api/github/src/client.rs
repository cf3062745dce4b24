//! GitHub API client implementation.

use std::time::Duration;

use async_trait::async_trait;
use prfeed_core::{Config, Error, RateLimitHeaders, RateLimitStatus, Result};
use reqwest::header::{HeaderMap, LINK};
use reqwest::Url;
use tracing::{debug, warn};

use crate::api::GitHubApi;
use crate::types::{
    GitHubComment, GitHubPullRequest, GitHubRateLimitResponse, GitHubRepository,
    GitHubSearchResponse,
};
use crate::DEFAULT_GITHUB_URL;

/// Page size used when listing issue comments; further pages are
/// followed through the `Link` header.
const COMMENTS_PAGE_SIZE: u32 = 100;

/// Default HTTP timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// GitHub API client.
pub struct GitHubClient {
    base_url: Url,
    token: Option<String>,
    client: reqwest::Client,
}

impl GitHubClient {
    /// Create a new GitHub client against api.github.com.
    pub fn new(token: Option<String>) -> Result<Self> {
        Self::with_base_url(DEFAULT_GITHUB_URL, token)
    }

    /// Create a new GitHub client with a custom base URL.
    pub fn with_base_url(base_url: impl Into<String>, token: Option<String>) -> Result<Self> {
        Self::build(base_url.into(), token, DEFAULT_TIMEOUT)
    }

    /// Create a client from loaded configuration.
    pub fn from_config(config: &Config, token: Option<String>) -> Result<Self> {
        let base_url = config
            .github
            .base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_GITHUB_URL.to_string());
        Self::build(
            base_url,
            token,
            Duration::from_secs(config.github.timeout_secs.max(1)),
        )
    }

    fn build(base_url: String, token: Option<String>, timeout: Duration) -> Result<Self> {
        let token = token.filter(|t| !t.is_empty());
        if token.is_none() {
            warn!("No GitHub token configured, requests are limited to the anonymous quota");
        }

        let base_url = Url::parse(base_url.trim())
            .map_err(|e| Error::Config(format!("Invalid GitHub API URL {}: {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(Error::Config(format!("Invalid GitHub API URL: {}", base_url)));
        }

        let client = reqwest::Client::builder()
            .user_agent("prfeed")
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Http(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            base_url,
            token,
            client,
        })
    }

    /// Build an absolute API URL from path segments and query parameters.
    ///
    /// Each segment is percent-encoded, so owner and repo names can never
    /// alter the path or query of the request.
    fn url(&self, segments: &[&str], params: &[(&str, String)]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::Config(format!("Invalid GitHub API URL: {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        if !params.is_empty() {
            url.query_pairs_mut().extend_pairs(params);
        }
        Ok(url)
    }

    /// Send an authenticated GET request and fail on non-success status.
    async fn send(&self, url: Url) -> Result<reqwest::Response> {
        debug!(url = %url, "GitHub GET request");

        let mut request = self
            .client
            .get(url)
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28");
        if let Some(token) = &self.token {
            request = request.header("Authorization", format!("Bearer {}", token));
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let status_code = status.as_u16();
            let rate_limit = rate_limit_headers(response.headers());
            let message = response.text().await.unwrap_or_default();
            warn!(
                status = status_code,
                message = message,
                remaining = ?rate_limit.remaining,
                "GitHub API error response"
            );
            return Err(Error::from_status(status_code, message, rate_limit));
        }

        Ok(response)
    }

    /// Make an authenticated GET request with typed deserialization.
    async fn get<T: serde::de::DeserializeOwned>(&self, url: Url) -> Result<T> {
        decode(self.send(url).await?).await
    }

    /// Follow `rel="next"` links, only within the configured API origin.
    fn next_page(&self, headers: &HeaderMap) -> Option<Url> {
        next_link(headers).filter(|next| next.origin() == self.base_url.origin())
    }
}

async fn decode<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    response
        .json()
        .await
        .map_err(|e| Error::InvalidData(format!("Failed to parse response: {}", e)))
}

/// Capture the rate-limit headers of a response.
fn rate_limit_headers(headers: &HeaderMap) -> RateLimitHeaders {
    RateLimitHeaders {
        remaining: header_u64(headers, "x-ratelimit-remaining"),
        reset: header_u64(headers, "x-ratelimit-reset"),
        retry_after: header_u64(headers, "retry-after"),
    }
}

fn header_u64(headers: &HeaderMap, name: &str) -> Option<u64> {
    headers.get(name)?.to_str().ok()?.trim().parse().ok()
}

/// Target of the `rel="next"` entry of a `Link` header.
fn next_link(headers: &HeaderMap) -> Option<Url> {
    let link = headers.get(LINK)?.to_str().ok()?;
    link.split(',').find_map(|entry| {
        let (target, params) = entry.split_once(';')?;
        if !params.split(';').any(|p| p.trim() == "rel=\"next\"") {
            return None;
        }
        let target = target.trim().strip_prefix('<')?.strip_suffix('>')?;
        Url::parse(target).ok()
    })
}

#[async_trait]
impl GitHubApi for GitHubClient {
    async fn search_issues(
        &self,
        query: &str,
        page: u32,
        per_page: u32,
    ) -> Result<GitHubSearchResponse> {
        let url = self.url(
            &["search", "issues"],
            &[
                ("q", query.to_string()),
                ("sort", "created".to_string()),
                ("order", "desc".to_string()),
                ("per_page", per_page.to_string()),
                ("page", page.to_string()),
            ],
        )?;
        self.get(url).await
    }

    async fn get_pull_request(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
    ) -> Result<GitHubPullRequest> {
        let number = number.to_string();
        let url = self.url(&["repos", owner, repo, "pulls", &number], &[])?;
        self.get(url).await
    }

    async fn get_repository(&self, owner: &str, repo: &str) -> Result<GitHubRepository> {
        let url = self.url(&["repos", owner, repo], &[])?;
        self.get(url).await
    }

    async fn list_issue_comments(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
    ) -> Result<Vec<GitHubComment>> {
        let number = number.to_string();
        let mut next = Some(self.url(
            &["repos", owner, repo, "issues", &number, "comments"],
            &[
                ("per_page", COMMENTS_PAGE_SIZE.to_string()),
                ("page", "1".to_string()),
            ],
        )?);

        let mut comments = Vec::new();
        while let Some(url) = next.take() {
            let response = self.send(url).await?;
            next = self.next_page(response.headers());
            let page: Vec<GitHubComment> = decode(response).await?;
            comments.extend(page);
        }

        debug!(owner, repo, number = %number, count = comments.len(), "Comments fetched");
        Ok(comments)
    }

    async fn get_rate_limit(&self) -> Result<RateLimitStatus> {
        let url = self.url(&["rate_limit"], &[])?;
        let response: GitHubRateLimitResponse = self.get(url).await?;
        Ok(response.resources.core.into())
    }
}

// =============================================================================
// Tests
// =============================================================================
