//! Detail enrichment of search hits.

use std::time::Duration;

use prfeed_core::{PullRequestResponse, Result};
use tracing::{debug, warn};

use crate::api::GitHubApi;
use crate::mapping::{map_pull_request, map_repository};
use crate::retry::{with_retry, RetryPolicy};
use crate::types::SearchItem;

/// Maximum number of search hits enriched per request. Each hit costs two
/// API calls.
pub const ENRICHMENT_CAP: usize = 20;

/// Pause after each enriched item.
pub const DEFAULT_ITEM_DELAY: Duration = Duration::from_millis(50);

/// Turns search hits into feed entries, one item at a time.
pub struct DetailEnricher<'a> {
    api: &'a dyn GitHubApi,
    retry: RetryPolicy,
    item_delay: Duration,
}

impl<'a> DetailEnricher<'a> {
    pub fn new(api: &'a dyn GitHubApi, retry: RetryPolicy) -> Self {
        Self {
            api,
            retry,
            item_delay: DEFAULT_ITEM_DELAY,
        }
    }

    pub fn with_item_delay(mut self, item_delay: Duration) -> Self {
        self.item_delay = item_delay;
        self
    }

    /// Enrich at most [`ENRICHMENT_CAP`] items. Items that fail are logged
    /// and left out; the rest of the batch carries on.
    pub async fn enrich(&self, items: &[SearchItem]) -> Vec<PullRequestResponse> {
        let batch = &items[..items.len().min(ENRICHMENT_CAP)];
        let mut enriched = Vec::with_capacity(batch.len());

        for item in batch {
            match self.enrich_item(item).await {
                Ok(pr) => enriched.push(pr),
                Err(e) => warn!(
                    owner = %item.owner,
                    repo = %item.repo,
                    number = item.number,
                    error = %e,
                    "Failed to enrich pull request, skipping"
                ),
            }
            tokio::time::sleep(self.item_delay).await;
        }

        debug!(
            requested = items.len(),
            enriched = enriched.len(),
            "Enrichment finished"
        );
        enriched
    }

    async fn enrich_item(&self, item: &SearchItem) -> Result<PullRequestResponse> {
        let pr = with_retry(&self.retry, "get_pull_request", || {
            self.api
                .get_pull_request(&item.owner, &item.repo, item.number)
        })
        .await?;
        let repo = with_retry(&self.retry, "get_repository", || {
            self.api.get_repository(&item.owner, &item.repo)
        })
        .await?;

        Ok(map_pull_request(&pr, map_repository(&repo)))
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::api::MockGitHubApi;
    use prfeed_core::{Error, PullRequestState};
    use tokio::time::Instant;

    fn fast_retry() -> RetryPolicy {
        RetryPolicy {
            max_retries: 3,
            base_delay: Duration::from_millis(10),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_caps_batch_and_skips_failed_item() {
        let mut api = MockGitHubApi::new();
        api.expect_get_pull_request()
            .returning(|_, _, number| {
                if number == 10 {
                    Err(Error::Http("upstream reset".to_string()))
                } else {
                    Ok(pull_request(number))
                }
            });
        api.expect_get_repository()
            .times(19)
            .returning(|_, _| Ok(repository()));

        let items: Vec<SearchItem> = (1..=25).map(search_item).collect();
        let enriched = DetailEnricher::new(&api, fast_retry()).enrich(&items).await;

        assert_eq!(enriched.len(), 19);
        assert!(enriched.iter().all(|pr| pr.number <= 20));
        assert!(enriched.iter().all(|pr| pr.number != 10));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_item_is_retried_before_skipping() {
        let mut api = MockGitHubApi::new();
        api.expect_get_pull_request()
            .times(3)
            .returning(|_, _, _| Err(Error::Http("down".to_string())));

        let items = vec![search_item(1)];
        let enriched = DetailEnricher::new(&api, fast_retry()).enrich(&items).await;

        assert!(enriched.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_state_is_derived_from_merged_at() {
        let mut api = MockGitHubApi::new();
        api.expect_get_pull_request()
            .returning(|_, _, number| Ok(pull_request(number)));
        api.expect_get_repository().returning(|_, _| Ok(repository()));

        let items: Vec<SearchItem> = (1..=8).map(search_item).collect();
        let enriched = DetailEnricher::new(&api, fast_retry()).enrich(&items).await;

        assert_eq!(enriched.len(), 8);
        for pr in &enriched {
            assert_eq!(pr.state == PullRequestState::Merged, pr.merged_at.is_some());
        }
        assert_eq!(enriched[0].repository.language.as_deref(), Some("Rust"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_items_are_spaced_out() {
        let mut api = MockGitHubApi::new();
        api.expect_get_pull_request()
            .returning(|_, _, number| Ok(pull_request(number)));
        api.expect_get_repository().returning(|_, _| Ok(repository()));

        let items: Vec<SearchItem> = (1..=4).map(search_item).collect();
        let start = Instant::now();
        DetailEnricher::new(&api, fast_retry()).enrich(&items).await;

        assert_eq!(start.elapsed(), DEFAULT_ITEM_DELAY * 4);
    }

    #[tokio::test]
    async fn test_empty_input() {
        let api = MockGitHubApi::new();
        let enriched = DetailEnricher::new(&api, fast_retry()).enrich(&[]).await;
        assert!(enriched.is_empty());
    }
}
