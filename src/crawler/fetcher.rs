//! HTTP fetcher implementation
//!
//! This module handles the network side of a crawl task:
//! - Building the HTTP client with the configured user agent and timeouts
//! - GET requests with a hard cap on the response size
//! - Decoding the body with the charset declared in `Content-Type`
//! - Classifying failures into [`CrawlError`] variants
//!
//! Fetching never retries; a failed fetch is reported once and the scheduler
//! records it.

use crate::config::FetcherConfig;
use crate::CrawlError;
use async_trait::async_trait;
use encoding_rs::{Encoding, UTF_8};
use reqwest::header::CONTENT_TYPE;
use reqwest::{redirect::Policy, Client};
use std::time::Duration;
use url::Url;

/// Maximum redirect hops followed for a single fetch
pub const MAX_REDIRECTS: usize = 10;

/// Source of page content
///
/// The scheduler only talks to this trait, so runs can be driven by an
/// in-memory fetcher in tests.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetches the body of `url` as text
    ///
    /// # Returns
    ///
    /// * `Ok(String)` - The decoded body of a 2xx response
    /// * `Err(CrawlError::Network)` - Connection, DNS or timeout failure
    /// * `Err(CrawlError::HttpStatus)` - Non-2xx response
    /// * `Err(CrawlError::ContentTooLarge)` - Body exceeded the safety cap
    /// * `Err(CrawlError::Parse)` - Body is malformed in its declared encoding
    async fn fetch(&self, url: &Url) -> Result<String, CrawlError>;
}

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```
/// use trawler::config::FetcherConfig;
/// use trawler::crawler::build_http_client;
///
/// let client = build_http_client(&FetcherConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &FetcherConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()
}

/// reqwest-backed [`Fetcher`]
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    max_content_bytes: usize,
}

impl HttpFetcher {
    pub fn new(config: &FetcherConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(config)?,
            max_content_bytes: config.max_content_bytes,
        })
    }

    /// Wraps an already configured client
    pub fn with_client(client: Client, max_content_bytes: usize) -> Self {
        Self {
            client,
            max_content_bytes,
        }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<String, CrawlError> {
        let mut response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(classify_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(CrawlError::HttpStatus {
                code: status.as_u16(),
            });
        }

        let charset = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .and_then(charset_of)
            .map(str::to_string);
        let limit = self.max_content_bytes;

        // Reject early when the server announces an oversized body
        if let Some(length) = response.content_length() {
            if length > limit as u64 {
                return Err(CrawlError::ContentTooLarge { limit });
            }
        }

        // Content-Length can be absent or wrong, so count while streaming too
        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await.map_err(classify_error)? {
            if body.len() + chunk.len() > limit {
                return Err(CrawlError::ContentTooLarge { limit });
            }
            body.extend_from_slice(&chunk);
        }

        decode_body(&body, charset.as_deref())
    }
}

/// Extracts the `charset` parameter of a `Content-Type` value
fn charset_of(content_type: &str) -> Option<&str> {
    content_type.split(';').skip(1).find_map(|param| {
        let (name, value) = param.split_once('=')?;
        if name.trim().eq_ignore_ascii_case("charset") {
            Some(value.trim().trim_matches('"'))
        } else {
            None
        }
    })
}

/// Decodes a response body to text
///
/// A byte order mark wins over the declared charset, which wins over the
/// UTF-8 default. Unknown charset labels fall back to UTF-8. Bytes that are
/// malformed in the chosen encoding are a parse failure, never replaced.
pub fn decode_body(body: &[u8], charset: Option<&str>) -> Result<String, CrawlError> {
    let (encoding, bom_length) = match Encoding::for_bom(body) {
        Some((encoding, length)) => (encoding, length),
        None => (
            charset
                .and_then(|label| Encoding::for_label(label.as_bytes()))
                .unwrap_or(UTF_8),
            0,
        ),
    };

    encoding
        .decode_without_bom_handling_and_without_replacement(&body[bom_length..])
        .map(|text| text.into_owned())
        .ok_or_else(|| CrawlError::Parse(format!("content is not valid {}", encoding.name())))
}

/// Maps a transport error onto the crawl failure taxonomy
fn classify_error(e: reqwest::Error) -> CrawlError {
    if e.is_timeout() {
        CrawlError::Network("Request timeout".to_string())
    } else if e.is_connect() {
        CrawlError::Network("Connection refused".to_string())
    } else if e.is_redirect() {
        CrawlError::Network(format!("Too many redirects: {}", e))
    } else if let Some(status) = e.status() {
        CrawlError::HttpStatus {
            code: status.as_u16(),
        }
    } else {
        CrawlError::Network(e.to_string())
    }
}
