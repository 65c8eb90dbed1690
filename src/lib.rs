//! Forum-Harvest: a polite extractor for community forum ideas
//!
//! This crate pulls idea threads from a Khoros-style community forum through
//! its LiQL search endpoint, normalizes them into flat records and writes
//! them out as JSON and CSV.

pub mod client;
pub mod config;
pub mod extract;
pub mod normalize;
pub mod output;

use thiserror::Error;

/// Main error type for Forum-Harvest operations
#[derive(Debug, Error)]
pub enum ForumError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Transient HTTP {status} after {attempts} attempts (query={query:?})")]
    Transient {
        status: u16,
        attempts: u32,
        query: String,
    },

    #[error("Network error after {attempts} attempts (query={query:?}): {source}")]
    Network {
        attempts: u32,
        query: String,
        source: reqwest::Error,
    },

    #[error("HTTP {status} (query={query:?})")]
    HttpStatus { status: u16, query: String },

    #[error("API error: {message} (query={query:?})")]
    Api { message: String, query: String },

    #[error("Malformed response: {reason} (query={query:?})")]
    MalformedResponse { reason: String, query: String },

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ForumError {
    /// Returns true for failures that the retry loop is allowed to repeat
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient { .. } | Self::Network { .. })
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Forum-Harvest operations
pub type Result<T> = std::result::Result<T, ForumError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use client::{ForumClient, ForumSource, Page, Query};
pub use config::Config;
pub use extract::{ExtractOptions, Extraction, ExtractionState, Progress};
pub use normalize::{normalize_idea, normalize_reply, strip_markup, Idea, Lifecycle, Reply};
