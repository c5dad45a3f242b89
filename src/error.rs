// src/error.rs

//! Unified error handling for the generator application.
//!
//! The acquisition pipeline has its own small taxonomy so the aggregator can
//! apply a different retry policy per failure class:
//!
//! - [`FetchError`]: raised by a single provider adapter
//! - [`AcquisitionError`]: raised by the aggregator once every provider failed
//! - [`GenerationError`]: raised by the line generator
//!
//! [`AppError`] wraps all of them together with the I/O and parsing errors of
//! the surrounding application.

use std::fmt;

use thiserror::Error;

use crate::models::{GameType, Provider};

/// Result type alias for application operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Failure of one provider to deliver draw records.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Transport error, timeout or non-success HTTP status. Worth a retry.
    #[error("network failure: {0}")]
    NetworkFailure(String),

    /// The page was fetched but no valid draw could be extracted.
    #[error("parse failure: {0}")]
    ParseFailure(String),
}

impl FetchError {
    pub fn network(message: impl fmt::Display) -> Self {
        Self::NetworkFailure(message.to_string())
    }

    pub fn parse(message: impl fmt::Display) -> Self {
        Self::ParseFailure(message.to_string())
    }

    /// Whether the aggregator may retry the same provider.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::NetworkFailure(_))
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(error: reqwest::Error) -> Self {
        Self::network(error)
    }
}

/// Why a provider did not contribute a record set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    Failed(FetchError),
    Empty,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Failed(error) => write!(f, "{error}"),
            Self::Empty => f.write_str("returned no draws"),
        }
    }
}

/// Diagnostic entry for one provider in a failed acquisition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderFailure {
    pub provider: Provider,
    pub reason: FailureReason,
}

impl fmt::Display for ProviderFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.provider, self.reason)
    }
}

/// Failure of the whole acquisition pipeline.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AcquisitionError {
    #[error("all sources exhausted for {game}: [{}]", join_failures(.failures))]
    AllSourcesExhausted {
        game: GameType,
        failures: Vec<ProviderFailure>,
    },
}

impl AcquisitionError {
    /// Per-provider reasons, in priority order.
    pub fn failures(&self) -> &[ProviderFailure] {
        match self {
            Self::AllSourcesExhausted { failures, .. } => failures,
        }
    }
}

fn join_failures(failures: &[ProviderFailure]) -> String {
    if failures.is_empty() {
        return "no sources configured".to_string();
    }
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Failure to produce a line.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    #[error("invalid game configuration: {0}")]
    InvalidConfig(String),

    #[error("weighted sampling failed: {0}")]
    Sampling(String),
}

impl GenerationError {
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }
}

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP client construction or request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// TOML serialization failed
    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// CSV read/write failed
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// Regex compilation failed
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    /// CSS selector parsing failed
    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration validation error
    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Acquisition(#[from] AcquisitionError),

    #[error(transparent)]
    Generation(#[from] GenerationError),
}

impl AppError {
    /// Create a selector parsing error.
    pub fn selector(selector: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Selector {
            selector: selector.into(),
            message: message.to_string(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}
