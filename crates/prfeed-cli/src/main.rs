//! prfeed CLI - a user's GitHub pull requests as JSON.

mod output;

use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use prfeed_core::{Config, PullRequestFeed};
use prfeed_github::{GitHubClient, GitHubPullRequestService};
use tracing_subscriber::EnvFilter;

use crate::output::{print_json, DataEnvelope, ListEnvelope};

#[derive(Parser)]
#[command(name = "prfeed")]
#[command(author, version, about = "prfeed - GitHub pull request feed", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// GitHub access token (overrides GITHUB_TOKEN)
    #[arg(long, global = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List pull requests authored by a user, newest first
    PullRequests {
        /// GitHub username (defaults to feed.username)
        username: Option<String>,

        /// Page number, starting at 1
        #[arg(long, default_value = "1")]
        page: u32,

        /// Items per page (clamped to feed.max_per_page)
        #[arg(long)]
        per_page: Option<u32>,
    },

    /// Show a single pull request with details
    PullRequest {
        /// Repository owner
        owner: String,

        /// Repository name
        repo: String,

        /// Pull request number
        #[arg(allow_negative_numbers = true)]
        number: i64,
    },

    /// Show the remaining GitHub API quota
    RateLimit,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Get a value by key (e.g. feed.username)
    Get { key: String },

    /// Set a value by key (e.g. retry.max_retries 5)
    Set { key: String, value: String },

    /// Print the config file location
    Path,
}

fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });

    // stdout carries the JSON output
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn build_service(config: &Config, token: Option<String>) -> anyhow::Result<GitHubPullRequestService> {
    let token = token.or_else(Config::token_from_env);
    let client = GitHubClient::from_config(config, token)?;
    Ok(GitHubPullRequestService::from_config(
        Arc::new(client),
        config,
    ))
}

fn resolve_username(config: &Config, username: Option<String>) -> anyhow::Result<String> {
    match username
        .or_else(|| config.feed.username.clone())
        .map(|u| u.trim().to_string())
    {
        Some(u) if !u.is_empty() => Ok(u),
        _ => bail!("No username given. Pass USERNAME or run `prfeed config set feed.username <name>`"),
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = Config::load().context("Failed to load configuration")?;

    match cli.command {
        Some(Commands::PullRequests {
            username,
            page,
            per_page,
        }) => {
            config.apply_env();
            let username = resolve_username(&config, username)?;
            let per_page = config.clamp_per_page(per_page);
            let service = build_service(&config, cli.token)?;

            let result = service
                .get_pull_requests(&username, page.max(1), per_page)
                .await?;
            print_json(&ListEnvelope::new(&username, &result))?;
        }
        Some(Commands::PullRequest {
            owner,
            repo,
            number,
        }) => {
            config.apply_env();
            let service = build_service(&config, cli.token)?;

            match service.get_pull_request_details(&owner, &repo, number).await {
                Ok(detail) => print_json(&DataEnvelope { data: &detail })?,
                Err(e) if e.is_not_found() => bail!("Pull request not found"),
                Err(e) => return Err(e.into()),
            }
        }
        Some(Commands::RateLimit) => {
            config.apply_env();
            let service = build_service(&config, cli.token)?;
            print_json(&service.get_rate_limit().await?)?;
        }
        Some(Commands::Config { command }) => match command {
            ConfigCommands::Show => {
                print!("{}", toml::to_string_pretty(&config)?);
            }
            ConfigCommands::Get { key } => match config.get(&key)? {
                Some(value) => println!("{}", value),
                None => println!("(not set)"),
            },
            ConfigCommands::Set { key, value } => {
                config.set(&key, &value)?;
                config.save()?;
                tracing::info!(key = %key, "Configuration updated");
            }
            ConfigCommands::Path => {
                println!("{}", Config::config_path()?.display());
            }
        },
        None => {
            println!("prfeed - GitHub pull request feed");
            println!("Run with --help for usage information");
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    run(cli).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pull_requests_args() {
        let cli = Cli::try_parse_from([
            "prfeed",
            "pull-requests",
            "octocat",
            "--page",
            "3",
            "--per-page",
            "75",
        ])
        .unwrap();

        match cli.command {
            Some(Commands::PullRequests {
                username,
                page,
                per_page,
            }) => {
                assert_eq!(username.as_deref(), Some("octocat"));
                assert_eq!(page, 3);
                assert_eq!(per_page, Some(75));
            }
            _ => panic!("expected pull-requests"),
        }
    }

    #[test]
    fn test_parse_pull_request_args() {
        let cli = Cli::try_parse_from(["prfeed", "--token", "t", "pull-request", "octo", "hello", "42"])
            .unwrap();

        assert_eq!(cli.token.as_deref(), Some("t"));
        match cli.command {
            Some(Commands::PullRequest {
                owner,
                repo,
                number,
            }) => {
                assert_eq!(owner, "octo");
                assert_eq!(repo, "hello");
                assert_eq!(number, 42);
            }
            _ => panic!("expected pull-request"),
        }
    }

    #[test]
    fn test_resolve_username_prefers_argument() {
        let mut config = Config::default();
        config.feed.username = Some("from-config".to_string());

        assert_eq!(
            resolve_username(&config, Some("octocat".to_string())).unwrap(),
            "octocat"
        );
        assert_eq!(resolve_username(&config, None).unwrap(), "from-config");
    }

    #[test]
    fn test_resolve_username_requires_a_value() {
        let config = Config::default();
        assert!(resolve_username(&config, None).is_err());
        assert!(resolve_username(&config, Some("   ".to_string())).is_err());
    }

    #[test]
    fn test_per_page_is_clamped() {
        let config = Config::default();
        assert_eq!(config.clamp_per_page(Some(75)), 50);
        assert_eq!(config.clamp_per_page(Some(0)), 1);
        assert_eq!(config.clamp_per_page(None), 20);
    }
}
