use crate::frontier::{Frontier, UrlState};
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// In-memory frontier guarded by a single mutex
///
/// The tag map is the source of truth for membership; `pending` only records
/// the order in which pending URLs were added.
#[derive(Debug, Default)]
pub struct InMemoryFrontier {
    inner: Mutex<FrontierInner>,
}

#[derive(Debug, Default)]
struct FrontierInner {
    tags: HashMap<String, UrlState>,
    pending: VecDeque<String>,
}

impl InMemoryFrontier {
    /// Creates an empty frontier
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns which set `url` is in, if any
    pub fn state_of(&self, url: &str) -> Option<UrlState> {
        self.lock().tags.get(url).copied()
    }

    /// Returns the number of pending URLs
    pub fn pending_len(&self) -> usize {
        self.lock().pending.len()
    }

    /// Returns the number of visited URLs
    pub fn visited_len(&self) -> usize {
        let inner = self.lock();
        inner.tags.len() - inner.pending.len()
    }

    // Poisoning is ignored: no mutation below can panic between updating
    // `tags` and `pending`.
    fn lock(&self) -> MutexGuard<'_, FrontierInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Frontier for InMemoryFrontier {
    fn peek_batch(&self, n: usize) -> Vec<String> {
        self.lock().pending.iter().take(n).cloned().collect()
    }

    fn mark_visited(&self, url: &str) {
        let mut inner = self.lock();
        let previous = inner.tags.insert(url.to_string(), UrlState::Visited);
        if previous == Some(UrlState::Pending) {
            if let Some(pos) = inner.pending.iter().position(|u| u == url) {
                inner.pending.remove(pos);
            }
        }
    }

    fn add(&self, url: &str) -> bool {
        let mut inner = self.lock();
        if inner.tags.contains_key(url) {
            return false;
        }
        inner.tags.insert(url.to_string(), UrlState::Pending);
        inner.pending.push_back(url.to_string());
        true
    }

    fn has_pending(&self) -> bool {
        !self.lock().pending.is_empty()
    }
}
