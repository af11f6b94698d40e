use serde::Deserialize;

/// Default client timeout for the bundled HTTP fetcher
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Crawl job configuration
///
/// Immutable once a job has started. Numeric fields keep the raw values from
/// the file; use [`CrawlConfig::page_budget`] and [`CrawlConfig::concurrency`]
/// to read them with their coercions applied.
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlConfig {
    /// Name of the crawl job, used to tag log output
    pub name: String,

    /// Seed URLs loaded into the frontier when the job starts
    #[serde(rename = "starting-urls")]
    pub starting_urls: Vec<String>,

    /// Exact hostnames the crawl may visit (empty allows every host)
    #[serde(rename = "allowed-domains", default)]
    pub allowed_domains: Vec<String>,

    /// URLs containing any of these substrings are never queued
    #[serde(rename = "disallowed-patterns", default)]
    pub disallowed_patterns: Vec<String>,

    /// Maximum number of pages to dispatch (<= 0 means unlimited)
    #[serde(rename = "max-pages", default)]
    pub max_pages: i64,

    /// Maximum number of fetches per round (<= 0 is treated as 1)
    #[serde(rename = "max-concurrent-requests", default)]
    pub max_concurrent_requests: i64,

    /// Log rejected URLs at info level
    #[serde(default)]
    pub verbose: bool,

    /// Only log errors
    #[serde(default)]
    pub quiet: bool,

    /// Settings for the bundled HTTP fetcher and middleware
    #[serde(default)]
    pub http: HttpConfig,
}

impl CrawlConfig {
    /// Creates a job configuration with no domain restriction, no disallowed
    /// patterns, no page budget and a concurrency of one
    pub fn new(name: impl Into<String>, starting_urls: Vec<String>) -> Self {
        Self {
            name: name.into(),
            starting_urls,
            allowed_domains: Vec::new(),
            disallowed_patterns: Vec::new(),
            max_pages: 0,
            max_concurrent_requests: 1,
            verbose: false,
            quiet: false,
            http: HttpConfig::default(),
        }
    }

    /// Returns the page budget, or `None` when the crawl is unbounded
    pub fn page_budget(&self) -> Option<usize> {
        if self.max_pages <= 0 {
            None
        } else {
            Some(usize::try_from(self.max_pages).unwrap_or(usize::MAX))
        }
    }

    /// Returns the number of fetches allowed per round, never less than one
    pub fn concurrency(&self) -> usize {
        if self.max_concurrent_requests <= 0 {
            1
        } else {
            usize::try_from(self.max_concurrent_requests).unwrap_or(usize::MAX)
        }
    }
}

/// HTTP fetcher and request middleware configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    /// Whole-request timeout for the HTTP client (seconds)
    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Fixed User-Agent header sent with every request
    #[serde(rename = "user-agent", default)]
    pub user_agent: Option<String>,

    /// Pick a random browser User-Agent for every request
    #[serde(rename = "randomise-user-agent", default)]
    pub randomise_user_agent: bool,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: None,
            randomise_user_agent: false,
        }
    }
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}
