//! Skein: a configurable crawl engine
//!
//! This crate explores a link graph from a set of seed URLs under a page budget
//! and a concurrency bound. Fetching, link extraction and request mutation are
//! pluggable; the crate owns the frontier, admission control and the
//! round-based scheduler that ties them together.

pub mod config;
pub mod crawler;
pub mod frontier;
pub mod middleware;
pub mod output;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for Skein operations
#[derive(Debug, Error)]
pub enum SkeinError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),
}

/// Configuration-specific errors
///
/// Any of these stops a crawl job before it starts.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Crawl jobs must have a name")]
    MissingName,

    #[error("Crawl job must have starting URLs")]
    MissingStartingUrls,

    #[error("Crawl job must have a frontier")]
    MissingFrontier,

    #[error("Crawl job must have a fetcher")]
    MissingFetcher,

    #[error("Validation error: {0}")]
    Validation(String),
}

/// URL admission errors
///
/// These are per-URL and never abort a crawl; the URL is simply not fetched
/// or not added to the frontier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UrlError {
    #[error("Failed to parse URL {url}: {reason}")]
    Parse { url: String, reason: String },

    #[error("{0} is not an absolute URL")]
    NotAbsolute(String),

    #[error("{url} not listed as allowed (host {host})")]
    DomainNotAllowed { url: String, host: String },

    #[error("{url} is disallowed by pattern {pattern:?}")]
    Disallowed { url: String, pattern: String },
}

/// Fetch boundary errors
///
/// The scheduler treats every variant the same way: the URL yielded nothing.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error for {url}: {source}")]
    Transport { url: String, source: reqwest::Error },

    #[error("{url} returned non-okay status code {status}")]
    Status { url: String, status: u16 },

    #[error("{url} not a HTML page (content type {content_type:?})")]
    NotHtml { url: String, content_type: String },

    #[error("{0}")]
    Other(String),
}

/// Result type alias for Skein operations
pub type Result<T> = std::result::Result<T, SkeinError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

/// Result type alias for fetch operations
pub type FetchResult<T> = std::result::Result<T, FetchError>;

// Re-export commonly used types
pub use config::CrawlConfig;
pub use crawler::{Coordinator, CoordinatorBuilder, FetchedPage, Fetcher, LinkParser};
pub use frontier::{Frontier, InMemoryFrontier, UrlState};
pub use middleware::{MiddlewarePipeline, RequestMiddleware};
pub use output::CrawlReport;
pub use crate::url::{normalize_url, Admission};
