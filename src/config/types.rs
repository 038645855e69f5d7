use serde::Deserialize;

/// URL path fragments excluded from every crawl unless replaced
pub const DEFAULT_BLACKLIST: &[&str] = &[
    "login", "signup", "signin", "register", "logout", "download", "redirect",
];

/// Top-level configuration file layout
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Seed URLs to start the crawl from
    #[serde(default)]
    pub seeds: Vec<String>,

    #[serde(default)]
    pub scraper: Settings,

    #[serde(default)]
    pub fetcher: FetcherConfig,
}

/// Per-run crawl settings
///
/// Built once before a run starts and never mutated while the run is in
/// progress.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Deepest BFS level that is fetched (seeds are depth 0)
    #[serde(rename = "max-depth")]
    pub max_depth: u32,

    /// Number of fetch+extract operations allowed in flight at once
    pub parallels: usize,

    /// Minimum time between two requests to the same domain (milliseconds)
    #[serde(rename = "delay-millis")]
    pub delay_millis: u64,

    /// Deliver results as a stream instead of a single aggregate
    #[serde(rename = "async")]
    pub async_mode: bool,

    /// Case-insensitive substrings of the URL path that exclude a URL
    pub blacklist: Vec<String>,

    /// Collect and follow outbound links
    #[serde(rename = "handle-links")]
    pub handle_links: bool,

    /// Maximum characters of scraped text kept per page (0 = unlimited)
    #[serde(rename = "max-scraped-data-length")]
    pub max_scraped_data_length: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_depth: 1,
            parallels: 2,
            delay_millis: 3,
            async_mode: true,
            blacklist: DEFAULT_BLACKLIST.iter().map(|s| s.to_string()).collect(),
            handle_links: false,
            max_scraped_data_length: 15000,
        }
    }
}

/// HTTP transport configuration for the default fetcher
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FetcherConfig {
    /// User-Agent header sent with every request
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Whole-request timeout (seconds)
    #[serde(rename = "request-timeout-secs")]
    pub request_timeout_secs: u64,

    /// Connection establishment timeout (seconds)
    #[serde(rename = "connect-timeout-secs")]
    pub connect_timeout_secs: u64,

    /// Responses larger than this are rejected
    #[serde(rename = "max-content-bytes")]
    pub max_content_bytes: usize,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            user_agent: format!("Trawler/{}", env!("CARGO_PKG_VERSION")),
            request_timeout_secs: 30,
            connect_timeout_secs: 10,
            max_content_bytes: 10 * 1024 * 1024,
        }
    }
}
