//! Assembles the caller's page out of the enriched pull requests.

use chrono::{DateTime, Utc};
use prfeed_core::{PaginationMeta, PullRequestPage, PullRequestResponse};

/// Sort newest first, cut out `page`, and describe it against the
/// authoritative `total_count` reported by search.
///
/// `page` and `per_page` must be at least 1. The metadata deliberately uses
/// `total_count` rather than the number of enriched items, which can be
/// smaller.
pub fn assemble_page(
    mut pull_requests: Vec<PullRequestResponse>,
    page: u32,
    per_page: u32,
    total_count: u64,
) -> PullRequestPage {
    // Stable sort: equal timestamps keep their search order. Unparseable
    // timestamps compare as None and therefore sort last.
    pull_requests.sort_by_cached_key(|pr| std::cmp::Reverse(parse_timestamp(&pr.created_at)));

    let start = (page.saturating_sub(1) as usize).saturating_mul(per_page as usize);
    let end = start.saturating_add(per_page as usize);
    let window = if start >= pull_requests.len() {
        Vec::new()
    } else {
        pull_requests
            .drain(start..end.min(pull_requests.len()))
            .collect()
    };

    PullRequestPage {
        pull_requests: window,
        pagination: PaginationMeta::new(page, per_page, total_count),
    }
}

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
