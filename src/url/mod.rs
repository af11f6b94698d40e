//! URL handling module for Skein
//!
//! This module provides URL normalization, host extraction and the admission
//! checks every URL passes before it is fetched or queued.

mod admission;
mod domain;
mod normalize;

pub use admission::Admission;
pub use domain::extract_host;
pub use normalize::normalize_url;
