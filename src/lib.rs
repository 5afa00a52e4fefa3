//! Shopsweep: a Shopify catalog and reviews harvester
//!
//! This crate crawls storefronts exposing the standard JSON catalog API,
//! collects product records and their paginated customer reviews, cleans
//! embedded HTML into plain text, and persists one JSON document per
//! product while skipping products already harvested in earlier runs.

pub mod catalog;
pub mod config;
pub mod dedup;
pub mod fetch;
pub mod reviews;
pub mod session;
pub mod storage;
pub mod text;

use thiserror::Error;

/// Main error type for Shopsweep operations
#[derive(Debug, Error)]
pub enum SweepError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Session task failed for {store}: {message}")]
    Session { store: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
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

/// Result type alias for Shopsweep operations
pub type Result<T> = std::result::Result<T, SweepError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use catalog::{CatalogCrawler, Product};
pub use config::Config;
pub use dedup::DedupIndex;
pub use reviews::{Review, ReviewCrawler};
pub use session::{Orchestrator, SessionReport};
pub use text::normalize;
