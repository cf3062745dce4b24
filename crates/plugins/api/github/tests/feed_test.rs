//! End-to-end feed tests: real reqwest client against an httpmock server.

use std::sync::Arc;
use std::time::Duration;

use httpmock::prelude::*;
use prfeed_core::{PullRequestFeed, PullRequestState};
use prfeed_github::{GitHubClient, GitHubPullRequestService, RetryPolicy};
use serde_json::json;

fn service_for(server: &MockServer) -> GitHubPullRequestService {
    let client = GitHubClient::with_base_url(server.base_url(), Some("test-token".to_string()))
        .expect("client");
    GitHubPullRequestService::new(Arc::new(client))
        .with_retry_policy(RetryPolicy {
            max_retries: 1,
            base_delay: Duration::ZERO,
        })
        .with_delays(Duration::ZERO, Duration::ZERO)
}

fn mock_rate_limit(server: &MockServer, remaining: u64) {
    server.mock(|when, then| {
        when.method(GET).path("/rate_limit");
        then.status(200).json_body(json!({
            "resources": {
                "core": {"limit": 5000, "remaining": remaining, "reset": 1700003600, "used": 5000 - remaining}
            }
        }));
    });
}

fn search_hit(number: u64, repo: &str, created_at: &str) -> serde_json::Value {
    json!({
        "id": number,
        "number": number,
        "title": format!("PR {}", number),
        "body": null,
        "html_url": format!("https://github.com/alice/{}/pull/{}", repo, number),
        "created_at": created_at,
        "updated_at": created_at,
        "closed_at": null,
        "state": "open"
    })
}

fn pull_request(number: u64, repo: &str, state: &str, merged_at: Option<&str>) -> serde_json::Value {
    json!({
        "id": 1000 + number,
        "number": number,
        "title": format!("PR {}", number),
        "body": "Description",
        "state": state,
        "html_url": format!("https://github.com/alice/{}/pull/{}", repo, number),
        "draft": false,
        "merged_at": merged_at,
        "closed_at": merged_at,
        "user": {"id": 1, "login": "alice", "avatar_url": "https://avatars.example/alice", "html_url": "https://github.com/alice"},
        "created_at": "2024-01-01T00:00:00Z",
        "updated_at": "2024-01-02T00:00:00Z",
        "commits": 2,
        "additions": 30,
        "deletions": 5,
        "changed_files": 3,
        "base": {
            "ref": "main",
            "sha": "abc",
            "repo": {
                "name": repo,
                "full_name": format!("alice/{}", repo),
                "description": "A repository",
                "language": "Rust",
                "html_url": format!("https://github.com/alice/{}", repo)
            }
        }
    })
}

fn repository(repo: &str, language: &str) -> serde_json::Value {
    json!({
        "name": repo,
        "full_name": format!("alice/{}", repo),
        "description": null,
        "language": language,
        "html_url": format!("https://github.com/alice/{}", repo)
    })
}

#[tokio::test]
async fn test_feed_lists_enriched_pull_requests() {
    let server = MockServer::start();
    mock_rate_limit(&server, 4999);

    server.mock(|when, then| {
        when.method(GET)
            .path("/search/issues")
            .query_param("per_page", "1");
        then.status(200).json_body(json!({
            "total_count": 3,
            "incomplete_results": false,
            "items": [search_hit(1, "alpha", "2024-01-01T00:00:00Z")]
        }));
    });
    let search = server.mock(|when, then| {
        when.method(GET)
            .path("/search/issues")
            .query_param("per_page", "2")
            .query_param("page", "1");
        then.status(200).json_body(json!({
            "total_count": 3,
            "incomplete_results": false,
            "items": [
                search_hit(1, "alpha", "2024-01-01T00:00:00Z"),
                search_hit(2, "beta", "2024-02-01T00:00:00Z")
            ]
        }));
    });

    server.mock(|when, then| {
        when.method(GET).path("/repos/alice/alpha/pulls/1");
        then.status(200)
            .json_body(pull_request(1, "alpha", "closed", Some("2024-01-05T00:00:00Z")));
    });
    server.mock(|when, then| {
        when.method(GET).path("/repos/alice/beta/pulls/2");
        then.status(200).json_body(pull_request(2, "beta", "open", None));
    });
    server.mock(|when, then| {
        when.method(GET).path("/repos/alice/alpha");
        then.status(200).json_body(repository("alpha", "Rust"));
    });
    server.mock(|when, then| {
        when.method(GET).path("/repos/alice/beta");
        then.status(200).json_body(repository("beta", "Go"));
    });

    let result = service_for(&server)
        .get_pull_requests("alice", 1, 2)
        .await
        .unwrap();

    search.assert();
    assert_eq!(result.pull_requests.len(), 2);
    assert_eq!(result.pagination.total_count, 3);
    assert_eq!(result.pagination.total_pages, 2);
    assert!(result.pagination.has_next_page);

    let merged = result
        .pull_requests
        .iter()
        .find(|p| p.number == 1)
        .unwrap();
    assert_eq!(merged.state, PullRequestState::Merged);
    assert_eq!(merged.repository.language.as_deref(), Some("Rust"));

    let open = result
        .pull_requests
        .iter()
        .find(|p| p.number == 2)
        .unwrap();
    assert_eq!(open.state, PullRequestState::Open);
    assert_eq!(open.repository.name, "beta");
}

#[tokio::test]
async fn test_first_page_holds_the_newest_pull_requests() {
    let server = MockServer::start();
    mock_rate_limit(&server, 4999);

    // Upstream only answers the creation-ordered query, newest first.
    server.mock(|when, then| {
        when.method(GET)
            .path("/search/issues")
            .query_param("sort", "created")
            .query_param("order", "desc")
            .query_param("per_page", "1");
        then.status(200).json_body(json!({
            "total_count": 25,
            "incomplete_results": false,
            "items": [search_hit(25, "alpha", "2024-01-25T00:00:00Z")]
        }));
    });
    server.mock(|when, then| {
        when.method(GET)
            .path("/search/issues")
            .query_param("sort", "created")
            .query_param("order", "desc")
            .query_param("per_page", "20")
            .query_param("page", "1");
        let items: Vec<_> = (6..=25)
            .rev()
            .map(|n| search_hit(n, "alpha", &format!("2024-01-{:02}T00:00:00Z", n)))
            .collect();
        then.status(200).json_body(json!({
            "total_count": 25,
            "incomplete_results": false,
            "items": items
        }));
    });
    for n in 6..=25u64 {
        server.mock(|when, then| {
            when.method(GET)
                .path(format!("/repos/alice/alpha/pulls/{}", n).as_str());
            let mut pr = pull_request(n, "alpha", "open", None);
            pr["created_at"] = json!(format!("2024-01-{:02}T00:00:00Z", n));
            then.status(200).json_body(pr);
        });
    }
    server.mock(|when, then| {
        when.method(GET).path("/repos/alice/alpha");
        then.status(200).json_body(repository("alpha", "Rust"));
    });

    let result = service_for(&server)
        .get_pull_requests("alice", 1, 20)
        .await
        .unwrap();

    let numbers: Vec<u64> = result.pull_requests.iter().map(|p| p.number).collect();
    assert_eq!(numbers, (6..=25).rev().collect::<Vec<u64>>());
    assert_eq!(result.pagination.total_count, 25);
    assert_eq!(result.pagination.total_pages, 2);
}

#[tokio::test]
async fn test_feed_skips_items_that_fail_enrichment() {
    let server = MockServer::start();
    mock_rate_limit(&server, 4999);

    server.mock(|when, then| {
        when.method(GET).path("/search/issues");
        then.status(200).json_body(json!({
            "total_count": 2,
            "incomplete_results": false,
            "items": [
                search_hit(1, "alpha", "2024-01-01T00:00:00Z"),
                search_hit(2, "gone", "2024-02-01T00:00:00Z")
            ]
        }));
    });
    server.mock(|when, then| {
        when.method(GET).path("/repos/alice/alpha/pulls/1");
        then.status(200).json_body(pull_request(1, "alpha", "open", None));
    });
    server.mock(|when, then| {
        when.method(GET).path("/repos/alice/alpha");
        then.status(200).json_body(repository("alpha", "Rust"));
    });
    server.mock(|when, then| {
        when.method(GET).path("/repos/alice/gone/pulls/2");
        then.status(404).body("{\"message\":\"Not Found\"}");
    });

    let result = service_for(&server)
        .get_pull_requests("alice", 1, 20)
        .await
        .unwrap();

    assert_eq!(result.pull_requests.len(), 1);
    assert_eq!(result.pull_requests[0].number, 1);
    assert_eq!(result.pagination.total_count, 2);
}

#[tokio::test]
async fn test_pull_request_details() {
    let server = MockServer::start();
    mock_rate_limit(&server, 100);

    server.mock(|when, then| {
        when.method(GET).path("/repos/alice/alpha/pulls/7");
        then.status(200)
            .json_body(pull_request(7, "alpha", "closed", Some("2024-01-05T00:00:00Z")));
    });
    server.mock(|when, then| {
        when.method(GET).path("/repos/alice/alpha/issues/7/comments");
        then.status(200).json_body(json!([
            {"id": 1, "body": "Looks good"},
            {"id": 2, "body": "Merged, thanks"}
        ]));
    });

    let detail = service_for(&server)
        .get_pull_request_details("alice", "alpha", 7)
        .await
        .unwrap();

    assert_eq!(detail.summary.number, 7);
    assert_eq!(detail.summary.state, PullRequestState::Merged);
    assert_eq!(detail.comments, 2);
    assert_eq!(detail.additions, 30);
    assert_eq!(detail.author.login, "alice");
    assert_eq!(detail.summary.repository.description.as_deref(), Some("A repository"));
}

#[tokio::test]
async fn test_pull_request_details_not_found() {
    let server = MockServer::start();
    mock_rate_limit(&server, 100);

    server.mock(|when, then| {
        when.method(GET).path("/repos/alice/alpha/pulls/99");
        then.status(404).body("{\"message\":\"Not Found\"}");
    });
    server.mock(|when, then| {
        when.method(GET).path("/repos/alice/alpha/issues/99/comments");
        then.status(404).body("{\"message\":\"Not Found\"}");
    });

    let err = service_for(&server)
        .get_pull_request_details("alice", "alpha", 99)
        .await
        .unwrap_err();

    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_rate_limit_endpoint_outage_fails_open() {
    let server = MockServer::start();

    server.mock(|when, then| {
        when.method(GET).path("/rate_limit");
        then.status(503).body("unavailable");
    });

    let report = service_for(&server).get_rate_limit().await.unwrap();

    assert_eq!(report.rate_limit.limit, 5000);
    assert_eq!(report.rate_limit.remaining, 4000);
}
