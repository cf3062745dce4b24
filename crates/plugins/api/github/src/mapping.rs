//! Mapping functions: GitHub types -> feed types.

use prfeed_core::{
    DetailedPullRequestResponse, PullRequestAuthor, PullRequestResponse, PullRequestState,
    RepositorySummary,
};

use crate::types::{GitHubPullRequest, GitHubRepository, GitHubUser};

pub(crate) fn map_repository(repo: &GitHubRepository) -> RepositorySummary {
    RepositorySummary {
        name: repo.name.clone(),
        description: repo.description.clone(),
        language: repo.language.clone(),
        html_url: repo.html_url.clone(),
    }
}

/// Summary entry; the state is always derived from `merged_at`.
pub(crate) fn map_pull_request(
    pr: &GitHubPullRequest,
    repository: RepositorySummary,
) -> PullRequestResponse {
    PullRequestResponse {
        id: pr.id,
        number: pr.number,
        title: pr.title.clone(),
        description: pr.body.clone(),
        created_at: pr.created_at.clone(),
        merged_at: pr.merged_at.clone(),
        html_url: pr.html_url.clone(),
        state: PullRequestState::derive(pr.merged_at.as_deref(), &pr.state),
        repository,
    }
}

fn map_author(user: Option<&GitHubUser>) -> PullRequestAuthor {
    match user {
        Some(u) => PullRequestAuthor {
            login: u.login.clone(),
            avatar_url: u.avatar_url.clone().unwrap_or_default(),
            html_url: u
                .html_url
                .clone()
                .unwrap_or_else(|| format!("https://github.com/{}", u.login)),
        },
        None => PullRequestAuthor {
            login: "unknown".to_string(),
            avatar_url: String::new(),
            html_url: String::new(),
        },
    }
}

/// Detail view. The repository comes from the PR's base branch; when
/// GitHub omits it (deleted fork) it is rebuilt from the coordinates.
pub(crate) fn map_detailed_pull_request(
    pr: &GitHubPullRequest,
    owner: &str,
    repo: &str,
    comments: u64,
) -> DetailedPullRequestResponse {
    let repository = pr
        .base
        .as_ref()
        .and_then(|base| base.repo.as_ref())
        .map(map_repository)
        .unwrap_or_else(|| RepositorySummary {
            name: repo.to_string(),
            description: None,
            language: None,
            html_url: format!("https://github.com/{}/{}", owner, repo),
        });

    DetailedPullRequestResponse {
        summary: map_pull_request(pr, repository),
        updated_at: pr.updated_at.clone(),
        closed_at: pr.closed_at.clone(),
        draft: pr.draft,
        commits: pr.commits,
        additions: pr.additions,
        deletions: pr.deletions,
        changed_files: pr.changed_files,
        comments,
        author: map_author(pr.user.as_ref()),
    }
}
