//! Result types produced by a crawl run

use crate::CrawlError;

/// Data scraped from one successfully fetched page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapedRecord {
    /// Normalized URL the page was fetched from
    pub source_url: String,

    /// BFS level at which the URL was discovered (seeds are 0)
    pub depth: u32,

    /// Page title, if the document had a non-empty one
    pub title: Option<String>,

    /// Visible page text, truncated to the configured maximum
    pub data: String,

    /// Absolute outbound links in document order (empty unless links are handled)
    pub links: Vec<String>,
}

/// A URL that could not be scraped
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedUrl {
    pub url: String,
    pub depth: u32,
    pub reason: CrawlError,
}

/// A URL excluded by the blacklist; never fetched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedUrl {
    pub url: String,
    pub depth: u32,
}

/// One item of an async result stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrawlEvent {
    Record(ScrapedRecord),
    Failure(FailedUrl),
    Skipped(SkippedUrl),
    /// The run was cancelled; always the last event when present
    Cancelled,
}

/// Aggregate outcome of a run
///
/// Records, failures and skips are each kept in discovery order (the order in
/// which URLs were first admitted), not completion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlResult {
    pub records: Vec<ScrapedRecord>,
    pub failures: Vec<FailedUrl>,
    pub skipped: Vec<SkippedUrl>,
    /// Set when the run stopped early because of a cancellation signal
    pub cancelled: bool,
}

impl CrawlResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an event to the matching list
    pub fn push(&mut self, event: CrawlEvent) {
        match event {
            CrawlEvent::Record(record) => self.records.push(record),
            CrawlEvent::Failure(failure) => self.failures.push(failure),
            CrawlEvent::Skipped(skipped) => self.skipped.push(skipped),
            CrawlEvent::Cancelled => self.cancelled = true,
        }
    }

    /// Number of URLs that were dispatched (success or failure)
    pub fn attempted(&self) -> usize {
        self.records.len() + self.failures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty() && self.failures.is_empty() && self.skipped.is_empty()
    }

    pub fn record_for(&self, url: &str) -> Option<&ScrapedRecord> {
        self.records.iter().find(|r| r.source_url == url)
    }

    pub fn failure_for(&self, url: &str) -> Option<&FailedUrl> {
        self.failures.iter().find(|f| f.url == url)
    }
}

impl Extend<CrawlEvent> for CrawlResult {
    fn extend<T: IntoIterator<Item = CrawlEvent>>(&mut self, iter: T) {
        for event in iter {
            self.push(event);
        }
    }
}

impl FromIterator<CrawlEvent> for CrawlResult {
    fn from_iter<T: IntoIterator<Item = CrawlEvent>>(iter: T) -> Self {
        let mut result = CrawlResult::new();
        result.extend(iter);
        result
    }
}
