use crate::UrlError;
use url::Url;

/// Tracking query parameters dropped during normalization
const TRACKING_PARAMS: &[&str] = &["fbclid", "gclid", "mc_eid"];

/// Normalizes a URL into the canonical form used for deduplication
///
/// # Normalization Steps
///
/// 1. Parse the URL; reject it if malformed or relative
/// 2. Reject any scheme other than `http` and `https`
/// 3. Reject URLs without a host
/// 4. Lowercase the host and drop default ports (done by the parser)
/// 5. Resolve dot segments in the path (done by the parser)
/// 6. Remove the fragment
/// 7. Remove tracking query parameters (`utm_*`, `fbclid`, ...)
/// 8. Sort remaining query parameters by key
/// 9. Remove an empty query string
///
/// Scheme, `www.` prefixes and trailing slashes are preserved: the normalized
/// URL is also the URL that gets fetched, and changing them can change the
/// resource a server returns.
///
/// # Examples
///
/// ```
/// use trawler::url::normalize_url;
///
/// let url = normalize_url("http://EXAMPLE.COM:80/a/../page?b=2&a=1#top").unwrap();
/// assert_eq!(url.as_str(), "http://example.com/page?a=1&b=2");
/// ```
pub fn normalize_url(url_str: &str) -> Result<Url, UrlError> {
    let mut url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    match url.host_str() {
        Some(host) if !host.is_empty() => {}
        _ => return Err(UrlError::MissingHost),
    }

    url.set_fragment(None);

    if url.query().is_some() {
        let params = filter_and_sort_query_params(&url);
        if params.is_empty() {
            url.set_query(None);
        } else {
            url.query_pairs_mut().clear().extend_pairs(params);
        }
    }

    Ok(url)
}

/// Filters out tracking parameters and sorts remaining query parameters
fn filter_and_sort_query_params(url: &Url) -> Vec<(String, String)> {
    let mut params: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| !is_tracking_param(key))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    // Stable sort keeps repeated keys in their original order
    params.sort_by(|a, b| a.0.cmp(&b.0));

    params
}

fn is_tracking_param(key: &str) -> bool {
    key.starts_with("utm_") || TRACKING_PARAMS.contains(&key)
}
