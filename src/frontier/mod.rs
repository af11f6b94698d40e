//! Frontier tracking for crawl jobs
//!
//! The frontier holds every URL a job knows about, tagged as either pending
//! (waiting to be dispatched, in insertion order) or visited (dispatched at
//! least once). A URL is never in both sets, and once visited it stays
//! visited for the lifetime of the job.

mod memory;

pub use memory::InMemoryFrontier;

use std::fmt;

/// Which of the frontier's two sets a URL belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UrlState {
    /// Queued and not yet dispatched
    Pending,

    /// Dispatched (whether or not the fetch succeeded)
    Visited,
}

impl fmt::Display for UrlState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Visited => write!(f, "visited"),
        }
    }
}

/// Trait for frontier implementations
///
/// Every method may be called concurrently from several fetch tasks, so
/// implementations synchronize internally and each call is atomic.
pub trait Frontier: Send + Sync {
    /// Returns up to `n` pending URLs in FIFO order without removing them
    fn peek_batch(&self, n: usize) -> Vec<String>;

    /// Moves `url` into the visited set, removing it from pending if present
    ///
    /// Idempotent.
    fn mark_visited(&self, url: &str);

    /// Queues `url` unless it is already pending or visited
    ///
    /// Returns true if the URL was queued.
    fn add(&self, url: &str) -> bool;

    /// Returns true if at least one URL is pending
    fn has_pending(&self) -> bool;
}
