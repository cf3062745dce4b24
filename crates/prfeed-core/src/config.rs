//! Configuration management for prfeed.
//!
//! Handles loading and saving configuration from TOML files.
//! Config files are stored in platform-specific locations:
//!
//! - **macOS/Linux**: `~/.config/prfeed/config.toml`
//! - **Windows**: `%APPDATA%\prfeed\config.toml`
//!
//! The GitHub token is never written to the config file; it is read from
//! the `GITHUB_TOKEN` environment variable (or passed on the command line).
//!
//! # Example
//!
//! ```ignore
//! use prfeed_core::config::Config;
//!
//! let mut config = Config::load()?;
//! config.apply_env();
//! config.set("feed.username", "octocat")?;
//! config.save()?;
//! ```

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info};

/// Config file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Config directory name.
const CONFIG_DIR_NAME: &str = "prfeed";

/// Environment variable holding the GitHub token.
pub const TOKEN_ENV_VAR: &str = "GITHUB_TOKEN";

/// Environment variable overriding the GitHub API base URL.
pub const API_URL_ENV_VAR: &str = "GITHUB_API_URL";

// =============================================================================
// Configuration structures
// =============================================================================

/// Main configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// GitHub connection settings
    #[serde(default)]
    pub github: GitHubConfig,

    /// Retry settings for outbound API calls
    #[serde(default)]
    pub retry: RetryConfig,

    /// Feed defaults
    #[serde(default)]
    pub feed: FeedConfig,
}

/// GitHub connection configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GitHubConfig {
    /// GitHub API base URL (for GitHub Enterprise)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// HTTP client timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Retry configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum attempts per API call
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Base backoff delay in milliseconds
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
}

/// Feed configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Username listed when none is given
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default = "default_per_page")]
    pub default_per_page: u32,
    /// Upper bound applied to a requested page size
    #[serde(default = "default_max_per_page")]
    pub max_per_page: u32,
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

fn default_base_delay_ms() -> u64 {
    1000
}

fn default_per_page() -> u32 {
    20
}

fn default_max_per_page() -> u32 {
    50
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            base_delay_ms: default_base_delay_ms(),
        }
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            username: None,
            default_per_page: default_per_page(),
            max_per_page: default_max_per_page(),
        }
    }
}

// =============================================================================
// Config implementation
// =============================================================================

impl Config {
    /// Get the configuration directory path.
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|p| p.join(CONFIG_DIR_NAME))
            .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))
    }

    /// Get the configuration file path.
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE_NAME))
    }

    /// Load configuration from the default location.
    ///
    /// Returns a default config if the file doesn't exist.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        Self::load_from(&path)
    }

    /// Load configuration from a specific path.
    ///
    /// Returns a default config if the file doesn't exist.
    pub fn load_from(path: &PathBuf) -> Result<Self> {
        if !path.exists() {
            debug!(path = ?path, "Config file does not exist, using defaults");
            return Ok(Self::default());
        }

        debug!(path = ?path, "Loading config");

        let contents = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read config file: {}", e)))?;

        let config: Config = toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse config file: {}", e)))?;

        info!(path = ?path, "Config loaded successfully");
        Ok(config)
    }

    /// Save configuration to the default location.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        self.save_to(&path)
    }

    /// Save configuration to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| Error::Config(format!("Failed to create config directory: {}", e)))?;
        }

        debug!(path = ?path, "Saving config");

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, contents)
            .map_err(|e| Error::Config(format!("Failed to write config file: {}", e)))?;

        info!(path = ?path, "Config saved successfully");
        Ok(())
    }

    /// Apply overrides from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_env_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides using a custom variable lookup.
    pub fn apply_env_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(API_URL_ENV_VAR).filter(|v| !v.trim().is_empty()) {
            debug!(base_url = %url, "Using GitHub API URL from environment");
            self.github.base_url = Some(url);
        }
    }

    /// Read the GitHub token from the environment.
    ///
    /// Empty values are treated as unset.
    pub fn token_from_env() -> Option<String> {
        std::env::var(TOKEN_ENV_VAR)
            .ok()
            .filter(|t| !t.trim().is_empty())
    }

    /// Clamp a requested page size into `1..=max_per_page`.
    pub fn clamp_per_page(&self, requested: Option<u32>) -> u32 {
        requested
            .unwrap_or(self.feed.default_per_page)
            .clamp(1, self.feed.max_per_page.max(1))
    }

    /// Set a configuration value by key path.
    ///
    /// Key format: `section.field` (e.g., `feed.username`, `retry.max_retries`)
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let (section, field) = split_key(key)?;

        match (section, field) {
            ("github", "base_url" | "url") => self.github.base_url = Some(value.to_string()),
            ("github", "timeout_secs" | "timeout") => {
                self.github.timeout_secs = parse_number(key, value)?
            }
            ("github", "token") => {
                return Err(Error::Config(format!(
                    "The token is not stored in the config file; set {} instead",
                    TOKEN_ENV_VAR
                )))
            }
            ("retry", "max_retries") => self.retry.max_retries = parse_number(key, value)?,
            ("retry", "base_delay_ms") => self.retry.base_delay_ms = parse_number(key, value)?,
            ("feed", "username" | "user") => self.feed.username = Some(value.to_string()),
            ("feed", "default_per_page") => self.feed.default_per_page = parse_number(key, value)?,
            ("feed", "max_per_page") => self.feed.max_per_page = parse_number(key, value)?,
            ("github" | "retry" | "feed", _) => {
                return Err(Error::Config(format!(
                    "Unknown {} config field: {}",
                    section, field
                )))
            }
            _ => return Err(Error::Config(format!("Unknown section: {}", section))),
        }

        Ok(())
    }

    /// Get a configuration value by key path.
    ///
    /// Key format: `section.field` (e.g., `feed.username`, `github.base_url`)
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let (section, field) = split_key(key)?;

        match (section, field) {
            ("github", "base_url" | "url") => Ok(self.github.base_url.clone()),
            ("github", "timeout_secs" | "timeout") => Ok(Some(self.github.timeout_secs.to_string())),
            ("retry", "max_retries") => Ok(Some(self.retry.max_retries.to_string())),
            ("retry", "base_delay_ms") => Ok(Some(self.retry.base_delay_ms.to_string())),
            ("feed", "username" | "user") => Ok(self.feed.username.clone()),
            ("feed", "default_per_page") => Ok(Some(self.feed.default_per_page.to_string())),
            ("feed", "max_per_page") => Ok(Some(self.feed.max_per_page.to_string())),
            ("github" | "retry" | "feed", _) => Err(Error::Config(format!(
                "Unknown {} config field: {}",
                section, field
            ))),
            _ => Err(Error::Config(format!("Unknown section: {}", section))),
        }
    }
}

fn split_key(key: &str) -> Result<(&str, &str)> {
    match key.split_once('.') {
        Some((section, field)) if !field.contains('.') => Ok((section, field)),
        _ => Err(Error::Config(format!(
            "Invalid config key '{}'. Expected format: section.field",
            key
        ))),
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::Config(format!("Value for '{}' must be a number: {}", key, value)))
}

// =============================================================================
// Tests
// =============================================================================
