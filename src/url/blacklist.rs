use url::Url;

/// Checks whether a URL is excluded by any blacklist pattern
///
/// A pattern matches when it is a case-insensitive substring of the URL's
/// path. Host and query are not inspected, so a pattern like `"login"`
/// excludes `https://site.test/user/login` but not `https://login.site.test/`.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use trawler::url::is_blacklisted;
///
/// let patterns = vec!["login".to_string()];
/// let url = Url::parse("https://example.com/User/LOGIN").unwrap();
/// assert!(is_blacklisted(&url, &patterns));
/// ```
pub fn is_blacklisted(url: &Url, patterns: &[String]) -> bool {
    let path = url.path().to_lowercase();
    patterns
        .iter()
        .filter(|p| !p.is_empty())
        .any(|p| path.contains(&p.to_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_BLACKLIST;

    fn defaults() -> Vec<String> {
        DEFAULT_BLACKLIST.iter().map(|s| s.to_string()).collect()
    }

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_matches_path_segment() {
        assert!(is_blacklisted(&url("http://a.test/login"), &defaults()));
        assert!(is_blacklisted(&url("http://a.test/account/signup/step1"), &defaults()));
    }

    #[test]
    fn test_substring_match() {
        // Substring, not whole-segment
        assert!(is_blacklisted(&url("http://a.test/user-logout-now"), &defaults()));
        assert!(is_blacklisted(&url("http://a.test/downloads"), &defaults()));
    }

    #[test]
    fn test_case_insensitive() {
        assert!(is_blacklisted(&url("http://a.test/LogIn"), &defaults()));
        let patterns = vec!["ADMIN".to_string()];
        assert!(is_blacklisted(&url("http://a.test/admin/panel"), &patterns));
    }

    #[test]
    fn test_host_and_query_ignored() {
        assert!(!is_blacklisted(&url("http://login.a.test/"), &defaults()));
        assert!(!is_blacklisted(&url("http://a.test/page?next=login"), &defaults()));
    }

    #[test]
    fn test_clean_url_passes() {
        assert!(!is_blacklisted(&url("http://b.test/x"), &defaults()));
    }

    #[test]
    fn test_empty_patterns() {
        assert!(!is_blacklisted(&url("http://a.test/login"), &[]));
        assert!(!is_blacklisted(&url("http://a.test/login"), &[String::new()]));
    }
}
