//! Crawler module for the crawl scheduler and its boundaries
//!
//! This module contains the core crawling logic, including:
//! - The fetch and parse boundaries (`Fetcher`, `LinkParser`) and their
//!   bundled HTTP/HTML implementations
//! - Budget accounting and the crawl phase machine
//! - The round-based coordinator that drives a job to completion

mod coordinator;
mod fetcher;
mod parser;
mod scheduler;

pub use coordinator::{run_crawl, Coordinator, CoordinatorBuilder};
pub use fetcher::{build_http_client, FetchedPage, Fetcher, HttpFetcher};
pub use parser::{extract_links, HtmlLinkParser, LinkParser};
pub use scheduler::{CrawlPhase, CrawlState};
