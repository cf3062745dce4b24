//! Error types for prfeed.

use thiserror::Error;

/// Rate-limit headers captured from a failed GitHub response.
///
/// Only the headers the retry wrapper needs are kept:
/// `x-ratelimit-remaining`, `x-ratelimit-reset` (epoch seconds) and
/// `retry-after` (seconds).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RateLimitHeaders {
    pub remaining: Option<u64>,
    pub reset: Option<u64>,
    pub retry_after: Option<u64>,
}

/// Main error type for prfeed operations.
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP request failed before a response was received
    #[error("HTTP error: {0}")]
    Http(String),

    /// GitHub rejected the credentials
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Requested resource does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// API returned a non-success status
    #[error("API error: {status} - {message}")]
    Api {
        status: u16,
        message: String,
        rate_limit: RateLimitHeaders,
    },

    /// Primary rate limit still exhausted after every retry
    #[error("GitHub API rate limit exceeded after {attempts} attempts")]
    RateLimitExceeded { attempts: u32 },

    /// Secondary (abuse) rate limit still active after every retry
    #[error("GitHub API secondary rate limit exceeded after {attempts} attempts")]
    SecondaryRateLimitExceeded { attempts: u32 },

    /// Not enough quota left to run an operation
    #[error("Insufficient GitHub API rate limit: operation needs {required} calls, {remaining} remaining")]
    InsufficientRateLimit { required: u64, remaining: u64 },

    /// Caller supplied invalid arguments
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Upstream data could not be interpreted
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Serialization/deserialization failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Wrapped failure of a pull request listing
    #[error("GitHub API error: {0}")]
    GitHub(String),

    /// Generic error
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// Map an HTTP error status to the matching variant.
    pub fn from_status(status: u16, message: String, rate_limit: RateLimitHeaders) -> Self {
        match status {
            401 => Error::Unauthorized(message),
            404 => Error::NotFound(message),
            _ => Error::Api {
                status,
                message,
                rate_limit,
            },
        }
    }

    /// 403 with `x-ratelimit-remaining: 0`.
    pub fn is_primary_rate_limit(&self) -> bool {
        matches!(
            self,
            Error::Api {
                status: 403,
                rate_limit: RateLimitHeaders {
                    remaining: Some(0),
                    ..
                },
                ..
            }
        )
    }

    /// 429 Too Many Requests.
    pub fn is_secondary_rate_limit(&self) -> bool {
        matches!(self, Error::Api { status: 429, .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }

    /// Rate-limit headers captured with the error, if any.
    pub fn rate_limit_headers(&self) -> Option<&RateLimitHeaders> {
        match self {
            Error::Api { rate_limit, .. } => Some(rate_limit),
            _ => None,
        }
    }
}

/// Result type alias for prfeed operations.
pub type Result<T> = std::result::Result<T, Error>;
