use crate::UrlError;
use url::Url;

/// Extracts the rate-limiting key of a URL
///
/// The key is the lowercase host. Ports are ignored, so two servers on the
/// same host share one politeness budget.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use trawler::url::extract_domain;
///
/// let url = Url::parse("https://EXAMPLE.COM:8080/path").unwrap();
/// assert_eq!(extract_domain(&url).unwrap(), "example.com");
/// ```
pub fn extract_domain(url: &Url) -> Result<String, UrlError> {
    url.host_str()
        .map(|h| h.to_lowercase())
        .ok_or(UrlError::MissingHost)
}
