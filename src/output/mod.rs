//! Output module for crawl reporting
//!
//! This module handles:
//! - Computing statistics for a finished run
//! - Printing streamed events and the final summary to the console

pub mod stats;

pub use stats::{print_statistics, RunStatistics};

use crate::crawler::{CrawlEvent, ScrapedRecord};

/// Length of the text preview printed for each record
const PREVIEW_CHARS: usize = 80;

/// Formats one streamed event as a single console line
pub fn format_event(event: &CrawlEvent) -> String {
    match event {
        CrawlEvent::Record(record) => format!(
            "[ok]      d={} {} {}",
            record.depth,
            record.source_url,
            describe(record)
        ),
        CrawlEvent::Failure(failure) => format!(
            "[failed]  d={} {} ({})",
            failure.depth, failure.url, failure.reason
        ),
        CrawlEvent::Skipped(skipped) => {
            format!("[skipped] d={} {}", skipped.depth, skipped.url)
        }
        CrawlEvent::Cancelled => "[cancelled]".to_string(),
    }
}

/// Prints one streamed event to stdout
pub fn print_event(event: &CrawlEvent) {
    println!("{}", format_event(event));
}

fn describe(record: &ScrapedRecord) -> String {
    let preview: String = record.data.chars().take(PREVIEW_CHARS).collect();
    let ellipsis = if record.data.chars().count() > PREVIEW_CHARS {
        "..."
    } else {
        ""
    };

    match &record.title {
        Some(title) => format!(
            "\"{}\" ({} links): {}{}",
            title,
            record.links.len(),
            preview,
            ellipsis
        ),
        None => format!("({} links): {}{}", record.links.len(), preview, ellipsis),
    }
}
