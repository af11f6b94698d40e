//! Round scheduling and budget accounting
//!
//! This module handles:
//! - The crawl state machine phases
//! - The `dispatched` counter, charged when a page is dispatched
//! - Batch sizing against the concurrency bound and remaining page budget
//! - The termination check run before every round

use crate::config::CrawlConfig;
use crate::frontier::Frontier;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Phases of a crawl job
///
/// `Idle -> Running -> (DrawBatch -> Dispatch -> Barrier)* -> Completed`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlPhase {
    /// Built but not started
    Idle,

    /// Seeding the frontier
    Running,

    /// Reading the next batch from the frontier
    DrawBatch,

    /// Marking the batch visited and spawning fetch tasks
    Dispatch,

    /// Waiting for every task of the round to finish
    Barrier,

    /// Frontier empty or budget spent
    Completed,
}

impl CrawlPhase {
    /// Returns true if `next` may follow this phase
    pub fn can_transition_to(&self, next: CrawlPhase) -> bool {
        use CrawlPhase::*;
        matches!(
            (self, next),
            (Idle, Running)
                | (Running, DrawBatch)
                | (Running, Completed)
                | (DrawBatch, Dispatch)
                | (DrawBatch, Completed)
                | (Dispatch, Barrier)
                | (Barrier, DrawBatch)
                | (Barrier, Completed)
        )
    }
}

impl fmt::Display for CrawlPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::DrawBatch => "draw-batch",
            Self::Dispatch => "dispatch",
            Self::Barrier => "barrier",
            Self::Completed => "completed",
        };
        f.write_str(name)
    }
}

/// Budget and dispatch accounting for one crawl job
#[derive(Debug)]
pub struct CrawlState {
    /// Pages dispatched so far; only ever increases
    dispatched: AtomicUsize,

    /// Page budget (`None` is unbounded)
    max_pages: Option<usize>,

    /// Maximum number of tasks per round
    max_concurrent: usize,
}

impl CrawlState {
    /// Creates the state for a job; a concurrency of zero is treated as one
    pub fn new(max_pages: Option<usize>, max_concurrent: usize) -> Self {
        Self {
            dispatched: AtomicUsize::new(0),
            max_pages,
            max_concurrent: max_concurrent.max(1),
        }
    }

    pub fn from_config(config: &CrawlConfig) -> Self {
        Self::new(config.page_budget(), config.concurrency())
    }

    /// Pages dispatched so far
    pub fn dispatched(&self) -> usize {
        self.dispatched.load(Ordering::SeqCst)
    }

    /// Pages left in the budget, or `None` when unbounded
    pub fn remaining(&self) -> Option<usize> {
        self.max_pages
            .map(|max| max.saturating_sub(self.dispatched()))
    }

    /// Returns true once a bounded budget has been spent
    pub fn budget_exhausted(&self) -> bool {
        self.remaining() == Some(0)
    }

    /// Size of the next batch: `min(max_concurrent, remaining budget)`
    pub fn batch_size(&self) -> usize {
        match self.remaining() {
            Some(remaining) => self.max_concurrent.min(remaining),
            None => self.max_concurrent,
        }
    }

    /// Charges one page against the budget, returning the new total
    pub fn record_dispatch(&self) -> usize {
        self.dispatched.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Returns true if the job should stop: budget spent or nothing pending
    pub fn is_done(&self, frontier: &dyn Frontier) -> bool {
        self.budget_exhausted() || !frontier.has_pending()
    }
}
