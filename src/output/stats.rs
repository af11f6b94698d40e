//! Crawl statistics
//!
//! This module accumulates per-task outcomes into a [`CrawlReport`] and
//! renders it for the command line.

use crate::state::{PageOutcome, PageState};
use chrono::{DateTime, Utc};

/// Summary of a finished (or running) crawl job
#[derive(Debug, Clone)]
pub struct CrawlReport {
    /// Name of the crawl job
    pub name: String,

    /// Pages charged against the budget
    pub dispatched: usize,

    /// Pages fetched successfully
    pub fetched: usize,

    /// Pages whose fetch failed (including panicked tasks)
    pub failed: usize,

    /// Pages that failed admission at dispatch time
    pub rejected: usize,

    /// Candidate links returned by the parser
    pub links_found: usize,

    /// Candidate links newly queued in the frontier
    pub links_queued: usize,

    /// Candidate links rejected by admission control
    pub links_rejected: usize,

    /// Completed dispatch rounds
    pub rounds: usize,

    pub started_at: DateTime<Utc>,

    pub finished_at: Option<DateTime<Utc>>,
}

impl CrawlReport {
    /// Creates an empty report stamped with the current time
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            dispatched: 0,
            fetched: 0,
            failed: 0,
            rejected: 0,
            links_found: 0,
            links_queued: 0,
            links_rejected: 0,
            rounds: 0,
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    /// Adds one task outcome to the totals
    pub fn record(&mut self, outcome: &PageOutcome) {
        match outcome.state {
            PageState::Fetched => self.fetched += 1,
            PageState::Rejected => self.rejected += 1,
            PageState::Failed => self.failed += 1,
        }
        self.links_found += outcome.links_found;
        self.links_queued += outcome.links_queued;
        self.links_rejected += outcome.links_rejected;
    }

    /// Counts a task that ended without an outcome
    pub fn record_panic(&mut self) {
        self.failed += 1;
    }

    /// Stamps the report as finished with the final dispatch count
    pub fn finish(&mut self, dispatched: usize) {
        self.dispatched = dispatched;
        self.finished_at = Some(Utc::now());
    }

    /// Wall-clock duration of the crawl, once finished
    pub fn duration(&self) -> Option<chrono::Duration> {
        self.finished_at.map(|finished| finished - self.started_at)
    }

    /// Candidate links that were admitted but already known to the frontier
    pub fn links_duplicate(&self) -> usize {
        self.links_found - self.links_queued - self.links_rejected
    }

    /// Percentage of dispatched pages that were fetched
    pub fn success_rate(&self) -> f64 {
        if self.dispatched == 0 {
            0.0
        } else {
            (self.fetched as f64 / self.dispatched as f64) * 100.0
        }
    }
}

/// Prints a report to stdout in a formatted manner
pub fn print_report(report: &CrawlReport) {
    println!("=== Crawl Report: {} ===\n", report.name);

    println!("Pages:");
    println!("  Dispatched: {}", report.dispatched);
    println!("  Fetched: {}", report.fetched);
    println!("  Failed: {}", report.failed);
    println!("  Rejected at dispatch: {}", report.rejected);
    println!();

    println!("Links:");
    println!("  Found: {}", report.links_found);
    println!("  Queued: {}", report.links_queued);
    println!("  Rejected: {}", report.links_rejected);
    println!("  Already known: {}", report.links_duplicate());
    println!();

    println!("Rounds: {}", report.rounds);
    if let Some(duration) = report.duration() {
        println!("Duration: {:.2}s", duration.num_milliseconds() as f64 / 1000.0);
    }

    println!(
        "Success Rate: {:.1}% ({} / {} pages fetched)",
        report.success_rate(),
        report.fetched,
        report.dispatched
    );
}
