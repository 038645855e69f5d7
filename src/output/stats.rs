//! Statistics derived from a finished crawl
//!
//! This module summarizes a [`CrawlResult`] for display: counts per outcome,
//! pages per depth, domains touched and failures grouped by kind.

use crate::crawler::CrawlResult;
use crate::CrawlError;
use std::collections::{BTreeMap, HashSet};
use url::Url;

/// Crawl statistics summary
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunStatistics {
    /// Pages fetched and extracted successfully
    pub scraped: usize,

    /// URLs that were dispatched but failed (including invalid seeds)
    pub failed: usize,

    /// URLs excluded by the blacklist
    pub skipped: usize,

    /// Successful pages per BFS level
    pub pages_by_depth: BTreeMap<u32, usize>,

    /// Number of distinct hosts among scraped and failed URLs
    pub unique_domains: usize,

    /// Outbound links reported by scraped pages
    pub total_links: usize,

    /// Failures grouped by kind (`http-status`, `network`, ...)
    pub failures_by_kind: BTreeMap<&'static str, usize>,

    pub cancelled: bool,
}

impl RunStatistics {
    /// Share of dispatched URLs that were scraped, in percent
    pub fn success_rate(&self) -> f64 {
        let attempted = self.scraped + self.failed;
        if attempted == 0 {
            0.0
        } else {
            (self.scraped as f64 / attempted as f64) * 100.0
        }
    }
}

impl CrawlResult {
    /// Computes summary statistics for this result
    pub fn stats(&self) -> RunStatistics {
        let mut pages_by_depth = BTreeMap::new();
        for record in &self.records {
            *pages_by_depth.entry(record.depth).or_insert(0) += 1;
        }

        let mut failures_by_kind = BTreeMap::new();
        for failure in &self.failures {
            *failures_by_kind.entry(kind(&failure.reason)).or_insert(0) += 1;
        }

        let domains: HashSet<String> = self
            .records
            .iter()
            .map(|r| r.source_url.as_str())
            .chain(self.failures.iter().map(|f| f.url.as_str()))
            .filter_map(|u| Url::parse(u).ok())
            .filter_map(|u| u.host_str().map(str::to_lowercase))
            .collect();

        RunStatistics {
            scraped: self.records.len(),
            failed: self.failures.len(),
            skipped: self.skipped.len(),
            pages_by_depth,
            unique_domains: domains.len(),
            total_links: self.records.iter().map(|r| r.links.len()).sum(),
            failures_by_kind,
            cancelled: self.cancelled,
        }
    }
}

/// Short label for a failure reason
pub fn kind(error: &CrawlError) -> &'static str {
    match error {
        CrawlError::InvalidUrl(_) => "invalid-url",
        CrawlError::Network(_) => "network",
        CrawlError::HttpStatus { .. } => "http-status",
        CrawlError::ContentTooLarge { .. } => "too-large",
        CrawlError::Parse(_) => "parse",
        CrawlError::Cancelled => "cancelled",
    }
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &RunStatistics) {
    println!("=== Crawl Statistics ===\n");

    println!("Overview:");
    println!("  Pages scraped: {}", stats.scraped);
    println!("  Failed: {}", stats.failed);
    println!("  Skipped (blacklisted): {}", stats.skipped);
    println!("  Unique domains: {}", stats.unique_domains);
    println!("  Total links found: {}", stats.total_links);
    println!();

    if !stats.pages_by_depth.is_empty() {
        println!("Pages by Depth:");
        for (depth, count) in &stats.pages_by_depth {
            println!("  {}: {}", depth, count);
        }
        println!();
    }

    if !stats.failures_by_kind.is_empty() {
        println!("Error Summary:");
        let mut error_counts: Vec<_> = stats.failures_by_kind.iter().collect();
        error_counts.sort_by(|a, b| b.1.cmp(a.1));

        for (kind, count) in error_counts {
            println!("  {}: {}", kind, count);
        }
        println!();
    }

    println!(
        "Success Rate: {:.1}% ({} / {} pages successfully scraped)",
        stats.success_rate(),
        stats.scraped,
        stats.scraped + stats.failed
    );

    if stats.cancelled {
        println!("Run was cancelled; results are partial.");
    }
}
