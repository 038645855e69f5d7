//! URL handling module for Trawler
//!
//! This module provides URL normalization, domain extraction and blacklist
//! filtering. Together they decide whether a candidate URL may enter the
//! frontier, and under which key it is deduplicated and rate limited.

mod blacklist;
mod domain;
mod normalize;

use ::url::Url;

// Re-export main functions
pub use blacklist::is_blacklisted;
pub use domain::extract_domain;
pub use normalize::normalize_url;

/// Outcome of filtering a raw candidate URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Candidate {
    /// Well-formed and not blacklisted
    Accepted(Url),
    /// Well-formed but excluded by a blacklist pattern
    Blacklisted(Url),
}

/// Normalizes a raw URL and applies the blacklist
///
/// Blacklisting is checked here, before any deduplication or rate limiting,
/// since it is the cheapest rejection.
///
/// # Examples
///
/// ```
/// use trawler::url::{filter_candidate, Candidate};
///
/// let patterns = vec!["login".to_string()];
/// let candidate = filter_candidate("http://a.test/login", &patterns).unwrap();
/// assert!(matches!(candidate, Candidate::Blacklisted(_)));
/// ```
pub fn filter_candidate(raw: &str, blacklist: &[String]) -> crate::UrlResult<Candidate> {
    let url = normalize_url(raw)?;
    if is_blacklisted(&url, blacklist) {
        Ok(Candidate::Blacklisted(url))
    } else {
        Ok(Candidate::Accepted(url))
    }
}
