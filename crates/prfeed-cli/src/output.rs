//! JSON envelopes printed by the CLI.

use prfeed_core::{PaginationMeta, PullRequestPage, PullRequestResponse};
use serde::Serialize;

/// `{ "data": ... }`
#[derive(Debug, Serialize)]
pub struct DataEnvelope<'a, T: Serialize> {
    pub data: &'a T,
}

/// Feed listing with request metadata.
#[derive(Debug, Serialize)]
pub struct ListEnvelope<'a> {
    pub data: &'a [PullRequestResponse],
    pub meta: ListMeta<'a>,
}

#[derive(Debug, Serialize)]
pub struct ListMeta<'a> {
    pub username: &'a str,
    pub count: usize,
    pub pagination: PaginationMeta,
}

impl<'a> ListEnvelope<'a> {
    pub fn new(username: &'a str, page: &'a PullRequestPage) -> Self {
        Self {
            data: &page.pull_requests,
            meta: ListMeta {
                username,
                count: page.pull_requests.len(),
                pagination: page.pagination,
            },
        }
    }
}

/// Pretty-print `value` as JSON on stdout.
pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
