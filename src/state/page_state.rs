//! Per-page outcomes of a dispatched fetch task
//!
//! Every URL the scheduler dispatches ends in exactly one of these states.
//! Whatever the state, the URL stays visited and its budget slot is spent.

use std::fmt;

/// Represents how a dispatched page finished
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageState {
    /// Page was fetched (and parsed, if a parser is configured)
    Fetched,

    /// Page failed admission when its task started and was never requested
    Rejected,

    /// The fetch boundary returned an error, or the task panicked
    Failed,
}

impl PageState {
    /// Returns true if the page was fetched
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Fetched)
    }

    /// Returns the lowercase label used in logs and reports
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fetched => "fetched",
            Self::Rejected => "rejected",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for PageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The result of one fetch task, returned to the scheduler at the barrier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageOutcome {
    /// The dispatched URL
    pub url: String,

    /// How the task finished
    pub state: PageState,

    /// Candidate links returned by the parser
    pub links_found: usize,

    /// Candidates that were new to the frontier and got queued
    pub links_queued: usize,

    /// Candidates rejected by admission control
    pub links_rejected: usize,
}

impl PageOutcome {
    fn with_state(url: String, state: PageState) -> Self {
        Self {
            url,
            state,
            links_found: 0,
            links_queued: 0,
            links_rejected: 0,
        }
    }

    pub fn fetched(url: String) -> Self {
        Self::with_state(url, PageState::Fetched)
    }

    pub fn rejected(url: String) -> Self {
        Self::with_state(url, PageState::Rejected)
    }

    pub fn failed(url: String) -> Self {
        Self::with_state(url, PageState::Failed)
    }

    /// Candidates that passed admission but were already known to the frontier
    pub fn links_duplicate(&self) -> usize {
        self.links_found - self.links_rejected - self.links_queued
    }
}
