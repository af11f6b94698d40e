//! Skein main entry point
//!
//! This is the command-line interface for the Skein crawl engine.

use anyhow::Context;
use clap::Parser;
use skein::config::{load_config_with_hash, CrawlConfig};
use skein::crawler::run_crawl;
use skein::output::print_report;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Skein: a configurable crawl engine
///
/// Skein crawls from a set of seed URLs, following links on allowed hosts
/// until the frontier is empty or the page budget is spent.
#[derive(Parser, Debug)]
#[command(name = "skein")]
#[command(version)]
#[command(about = "A configurable crawl engine", long_about = None)]
struct Cli {
    /// Path to TOML job configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;

    // Config flags raise the floor; CLI flags take it further
    let verbose = cli.verbose.max(u8::from(config.verbose));
    let quiet = cli.quiet || (config.quiet && cli.verbose == 0);
    setup_logging(verbose, quiet);

    tracing::info!(
        "Configuration loaded from {} (hash: {})",
        cli.config.display(),
        config_hash
    );

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    handle_crawl(config, quiet).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("skein=info,warn"),
            1 => EnvFilter::new("skein=debug,info"),
            2 => EnvFilter::new("skein=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: shows what would be crawled
fn handle_dry_run(config: &CrawlConfig) {
    println!("=== Skein Dry Run: {} ===\n", config.name);

    println!("Limits:");
    match config.page_budget() {
        Some(max) => println!("  Max pages: {}", max),
        None => println!("  Max pages: unlimited"),
    }
    println!("  Max concurrent requests: {}", config.concurrency());

    println!("\nHTTP:");
    println!("  Timeout: {}s", config.http.timeout_secs);
    if let Some(agent) = &config.http.user_agent {
        println!("  User agent: {}", agent);
    } else if config.http.randomise_user_agent {
        println!("  User agent: randomised");
    }

    println!("\nStarting URLs ({}):", config.starting_urls.len());
    for url in &config.starting_urls {
        println!("  - {}", url);
    }

    if config.allowed_domains.is_empty() {
        println!("\nAllowed Domains: all");
    } else {
        println!("\nAllowed Domains ({}):", config.allowed_domains.len());
        for domain in &config.allowed_domains {
            println!("  - {}", domain);
        }
    }

    println!("\nDisallowed Patterns ({}):", config.disallowed_patterns.len());
    for pattern in &config.disallowed_patterns {
        println!("  - {}", pattern);
    }

    println!("\n✓ Configuration is valid");
}

/// Handles the main crawl operation
async fn handle_crawl(config: CrawlConfig, quiet: bool) -> anyhow::Result<()> {
    tracing::info!(
        "Starting crawl {} with {} seed URLs",
        config.name,
        config.starting_urls.len()
    );

    let report = run_crawl(config).await.context("Crawl failed")?;

    if !quiet {
        print_report(&report);
    }

    Ok(())
}
