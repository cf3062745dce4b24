//! Paginated issue/PR search.

use std::time::Duration;

use prfeed_core::Result;
use tracing::{debug, warn};

use crate::api::GitHubApi;
use crate::retry::{with_retry, RetryPolicy};
use crate::types::SearchItem;

/// Maximum page size accepted by the search endpoint.
pub const SEARCH_PAGE_LIMIT: u32 = 100;

/// The search endpoint never returns more than this many results.
pub const SEARCH_RESULT_LIMIT: u64 = 1000;

/// Pause between consecutive search pages.
pub const DEFAULT_PAGE_DELAY: Duration = Duration::from_millis(100);

/// Search query matching pull requests authored by `username`.
pub fn author_query(username: &str) -> String {
    format!("author:{} type:pr", username)
}

/// Walks the search endpoint page by page.
pub struct SearchFetcher<'a> {
    api: &'a dyn GitHubApi,
    retry: RetryPolicy,
    page_delay: Duration,
}

impl<'a> SearchFetcher<'a> {
    pub fn new(api: &'a dyn GitHubApi, retry: RetryPolicy) -> Self {
        Self {
            api,
            retry,
            page_delay: DEFAULT_PAGE_DELAY,
        }
    }

    pub fn with_page_delay(mut self, page_delay: Duration) -> Self {
        self.page_delay = page_delay;
        self
    }

    /// Collect up to `items_needed` search hits for `query`.
    ///
    /// Pages are fetched sequentially. A short page ends the walk, and so
    /// does a failed page: whatever was gathered so far is returned.
    /// Every page uses the same size so GitHub's page offsets line up.
    pub async fn fetch_items(&self, query: &str, items_needed: u64) -> Vec<SearchItem> {
        let items_needed = items_needed.min(SEARCH_RESULT_LIMIT);
        if items_needed == 0 {
            return Vec::new();
        }

        let per_page = items_needed.min(u64::from(SEARCH_PAGE_LIMIT)) as u32;
        let pages = items_needed.div_ceil(u64::from(per_page)) as u32;
        let mut items: Vec<SearchItem> = Vec::with_capacity(items_needed as usize);

        for page in 1..=pages {
            if page > 1 {
                tokio::time::sleep(self.page_delay).await;
            }

            debug!(query, page, per_page, "Fetching search page");
            let response = match with_retry(&self.retry, "search_issues", || {
                self.api.search_issues(query, page, per_page)
            })
            .await
            {
                Ok(response) => response,
                Err(e) => {
                    warn!(
                        query,
                        page,
                        collected = items.len(),
                        error = %e,
                        "Search page failed, returning partial results"
                    );
                    break;
                }
            };

            let received = response.items.len();
            for raw in response.items {
                match SearchItem::try_from(raw) {
                    Ok(item) => items.push(item),
                    Err(e) => warn!(error = %e, "Skipping search hit with unusable URL"),
                }
            }

            if received < per_page as usize {
                debug!(page, received, "Short search page, no more results");
                break;
            }
        }

        items.truncate(items_needed as usize);
        items
    }

    /// Authoritative number of results matching `query`.
    pub async fn fetch_total_count(&self, query: &str) -> Result<u64> {
        let response = with_retry(&self.retry, "search_total_count", || {
            self.api.search_issues(query, 1, 1)
        })
        .await?;
        Ok(response.total_count)
    }
}
