//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `PageState`: How a dispatched page finished (fetched, rejected, failed)
//! - `PageOutcome`: The per-task result handed back to the scheduler

mod page_state;

pub use page_state::{PageOutcome, PageState};
