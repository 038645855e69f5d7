//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with a content size cap
//! - HTML extraction of text and links
//! - Per-domain rate limiting and the bounded worker pool
//! - Overall crawl coordination and result delivery

mod coordinator;
mod extractor;
mod fetcher;
mod rate_limiter;
mod result;
mod scheduler;
mod stream;

pub use coordinator::{Scraper, DEFAULT_CANCEL_GRACE};
pub use extractor::Extractor;
pub use fetcher::{build_http_client, decode_body, Fetcher, HttpFetcher, MAX_REDIRECTS};
pub use rate_limiter::DomainRateLimiter;
pub use result::{CrawlEvent, CrawlResult, FailedUrl, ScrapedRecord, SkippedUrl};
pub use scheduler::{CrawlTask, TaskOutcome};
pub use stream::{CrawlOutput, CrawlStream};

use crate::config::Config;
use crate::TrawlerError;

/// Runs a crawl over the seeds and settings of a loaded config
///
/// This is a convenience entry point for callers that start from a
/// [`Config`]. It will:
/// 1. Build the HTTP fetcher from `config.fetcher`
/// 2. Crawl `config.seeds` to completion with `config.scraper`
///
/// # Returns
///
/// * `Ok(CrawlResult)` - The run finished (individual pages may have failed)
/// * `Err(TrawlerError)` - Invalid configuration or HTTP client failure
pub async fn crawl(config: Config) -> Result<CrawlResult, TrawlerError> {
    let scraper = Scraper::new(config.scraper, &config.fetcher)?;
    Ok(scraper.run(config.seeds).await)
}
