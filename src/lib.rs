//! Vagas-Ripple: a quota-bounded job listing harvester
//!
//! This crate crawls the paginated search results of a job board, reads the job
//! payloads embedded as inline JSON in each rendered page, deduplicates and
//! filters them, optionally enriches them from per-job detail pages, and emits a
//! normalized record stream plus a run summary.

pub mod config;
pub mod crawler;
pub mod extract;
pub mod location;
pub mod output;
pub mod state;
pub mod storage;
pub mod text;
pub mod url;

use thiserror::Error;

/// Main error type for Vagas-Ripple operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid state transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::RequestState,
        to: state::RequestState,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("No results scraped after {pages} page(s). Check input parameters and proxy configuration.")]
    NoResults { pages: u32 },
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

/// Result type alias for Vagas-Ripple operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use extract::{build_record, JobRecord, RecordSource};
pub use location::matches_location;
pub use state::{CrawlState, RequestState};
pub use text::{normalize_for_compare, to_slug};
pub use url::{build_search_url, parse_search_url, SearchParameters};
