//! Configuration module for Skein
//!
//! This module handles loading, parsing, and validating crawl job configuration.
//!
//! # Example
//!
//! ```no_run
//! use skein::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("job.toml")).unwrap();
//! println!("Crawl {} will use {} workers", config.name, config.concurrency());
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{CrawlConfig, HttpConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate;
