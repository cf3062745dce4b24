//! Core traits, types, and error handling for prfeed.
//!
//! This crate provides the foundational abstractions shared by the GitHub
//! plugin and the command-line front end.

pub mod config;
pub mod error;
pub mod provider;
pub mod types;

pub use config::Config;
pub use error::{Error, RateLimitHeaders, Result};
pub use provider::PullRequestFeed;
pub use types::*;
