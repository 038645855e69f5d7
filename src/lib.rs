//! Trawler: a bounded, polite, concurrent web scraper
//!
//! This crate implements a breadth-first crawl engine that fetches seed URLs,
//! extracts page text and outbound links, and optionally follows those links
//! up to a fixed depth while honouring per-run concurrency and per-domain
//! rate limits.

pub mod config;
pub mod crawler;
pub mod output;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for Trawler operations
#[derive(Debug, Error)]
pub enum TrawlerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Crawl task panicked: {0}")]
    Join(#[from] tokio::task::JoinError),
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
}

/// URL-specific errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Per-task failure reasons
///
/// None of these abort a run: they are recorded against the URL that
/// produced them and the traversal carries on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CrawlError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP status {code}")]
    HttpStatus { code: u16 },

    #[error("Content exceeds {limit} bytes")]
    ContentTooLarge { limit: usize },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Cancelled")]
    Cancelled,
}

impl From<UrlError> for CrawlError {
    fn from(err: UrlError) -> Self {
        CrawlError::InvalidUrl(err.to_string())
    }
}

/// Result type alias for Trawler operations
pub type Result<T> = std::result::Result<T, TrawlerError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use crate::config::{Config, FetcherConfig, Settings, SettingsBuilder};
pub use crate::crawler::{
    CrawlEvent, CrawlOutput, CrawlResult, CrawlStream, FailedUrl, Fetcher, ScrapedRecord,
    Scraper, SkippedUrl,
};
pub use crate::url::{extract_domain, is_blacklisted, normalize_url};
