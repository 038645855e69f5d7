//! HTML extractor for page text and outbound links
//!
//! This module turns a fetched body into a [`ScrapedRecord`]:
//! - The page title (from `<title>`)
//! - Visible body text, whitespace-collapsed and capped in length
//! - Outbound links, resolved against the page URL (only when requested)

use crate::crawler::result::ScrapedRecord;
use crate::CrawlError;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Elements whose text never counts as page content
const SKIPPED_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// Turns raw page content into scraped records
#[derive(Debug, Clone, Copy)]
pub struct Extractor {
    handle_links: bool,
    max_data_length: usize,
}

impl Extractor {
    /// Creates an extractor
    ///
    /// `max_data_length` caps the scraped text in characters; 0 disables the cap.
    pub fn new(handle_links: bool, max_data_length: usize) -> Self {
        Self {
            handle_links,
            max_data_length,
        }
    }

    /// Parses `content` fetched from `source_url` at BFS level `depth`
    ///
    /// `content` is already decoded text; the fetcher handles charsets.
    ///
    /// # Returns
    ///
    /// * `Ok(ScrapedRecord)` - Text (truncated) and, if enabled, absolute links
    /// * `Err(CrawlError::Parse)` - Content is not a text document
    ///
    /// # Example
    ///
    /// ```
    /// use trawler::crawler::Extractor;
    /// use url::Url;
    ///
    /// let html = r#"<html><head><title>Test</title></head><body><a href="/page">Link</a></body></html>"#;
    /// let source = Url::parse("https://example.com/").unwrap();
    /// let record = Extractor::new(true, 0).extract(html, &source, 0).unwrap();
    /// assert_eq!(record.title, Some("Test".to_string()));
    /// assert_eq!(record.links, vec!["https://example.com/page".to_string()]);
    /// ```
    pub fn extract(
        &self,
        content: &str,
        source_url: &Url,
        depth: u32,
    ) -> Result<ScrapedRecord, CrawlError> {
        reject_binary(content)?;
        let document = Html::parse_document(content);

        let title = extract_title(&document);
        let data = truncate_chars(extract_text(&document), self.max_data_length);
        let links = if self.handle_links {
            extract_links(&document, source_url)
        } else {
            Vec::new()
        };

        Ok(ScrapedRecord {
            source_url: source_url.to_string(),
            depth,
            title,
            data,
            links,
        })
    }
}

/// Rejects content that decoded cleanly but is not a text document
fn reject_binary(content: &str) -> Result<(), CrawlError> {
    if content.contains('\0') {
        return Err(CrawlError::Parse(
            "content looks binary (contains NUL bytes)".to_string(),
        ));
    }
    Ok(())
}

/// Extracts the page title from the HTML document
fn extract_title(document: &Html) -> Option<String> {
    let title_selector = Selector::parse("title").ok()?;

    document
        .select(&title_selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Collects the visible text of the body as whitespace-separated words
fn extract_text(document: &Html) -> String {
    let root = Selector::parse("body")
        .ok()
        .and_then(|selector| document.select(&selector).next())
        .unwrap_or_else(|| document.root_element());

    let mut words: Vec<&str> = Vec::new();
    for node in root.descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|e| SKIPPED_ELEMENTS.contains(&e.name()))
        });
        if !hidden {
            words.extend(text.split_whitespace());
        }
    }

    words.join(" ")
}

/// Hard character cap; not word-boundary aware
fn truncate_chars(text: String, max_chars: usize) -> String {
    if max_chars == 0 {
        return text;
    }
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => text[..byte_index].to_string(),
        None => text,
    }
}

/// Extracts every resolvable `<a href>` in document order, without duplicates
fn extract_links(document: &Html, base_url: &Url) -> Vec<String> {
    let mut links = Vec::new();
    let mut seen = HashSet::new();

    let Ok(a_selector) = Selector::parse("a[href]") else {
        return links;
    };

    for element in document.select(&a_selector) {
        if let Some(absolute_url) = href_of(element).and_then(|href| resolve_link(href, base_url))
        {
            if seen.insert(absolute_url.clone()) {
                links.push(absolute_url);
            }
        }
    }

    links
}

fn href_of(element: ElementRef<'_>) -> Option<&str> {
    element.value().attr("href")
}

/// Resolves a link href to an absolute URL
///
/// Returns None if the link should be dropped:
/// - empty or fragment-only hrefs (same page anchors)
/// - hrefs that fail to resolve against the base
/// - anything that is not HTTP(S) after resolution (`javascript:`, `mailto:`, ...)
fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let mut absolute_url = base_url.join(href).ok()?;
    if absolute_url.scheme() != "http" && absolute_url.scheme() != "https" {
        return None;
    }
    absolute_url.set_fragment(None);

    Some(absolute_url.to_string())
}
