//! Request middleware
//!
//! Middleware hooks mutate every outgoing request in place before it reaches
//! the fetcher, for example to set headers. Hooks run in registration order
//! and cannot cancel, reorder or short-circuit a request.

mod user_agent;

pub use user_agent::{RandomUserAgent, StaticHeader, BROWSER_USER_AGENTS};

use crate::config::HttpConfig;
use crate::ConfigResult;
use reqwest::Request;
use std::fmt;
use std::sync::Arc;

/// A request mutation hook
///
/// Implemented for any `Fn(&mut Request)` closure.
pub trait RequestMiddleware: Send + Sync {
    /// Mutates the request in place
    fn apply(&self, request: &mut Request);
}

impl<F> RequestMiddleware for F
where
    F: Fn(&mut Request) + Send + Sync,
{
    fn apply(&self, request: &mut Request) {
        self(request)
    }
}

/// Ordered list of request middleware
///
/// Read-only once a crawl starts; cloning shares the registered hooks.
#[derive(Clone, Default)]
pub struct MiddlewarePipeline {
    hooks: Vec<Arc<dyn RequestMiddleware>>,
}

impl MiddlewarePipeline {
    /// Creates an empty pipeline
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the pipeline described by the HTTP configuration
    ///
    /// A configured `user-agent` becomes a [`StaticHeader`];
    /// `randomise-user-agent` adds a [`RandomUserAgent`].
    pub fn from_config(config: &HttpConfig) -> ConfigResult<Self> {
        let mut pipeline = Self::new();

        if let Some(user_agent) = &config.user_agent {
            pipeline.push(StaticHeader::user_agent(user_agent)?);
        }

        if config.randomise_user_agent {
            pipeline.push(RandomUserAgent::new());
        }

        Ok(pipeline)
    }

    /// Appends a hook to the end of the pipeline
    pub fn push(&mut self, middleware: impl RequestMiddleware + 'static) {
        self.hooks.push(Arc::new(middleware));
    }

    /// Builder-style variant of [`MiddlewarePipeline::push`]
    pub fn with(mut self, middleware: impl RequestMiddleware + 'static) -> Self {
        self.push(middleware);
        self
    }

    /// Returns the number of registered hooks
    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    /// Returns true if no hooks are registered
    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    /// Runs every hook, in registration order, on the request
    pub fn apply(&self, request: &mut Request) {
        for hook in &self.hooks {
            hook.apply(request);
        }
    }
}

impl fmt::Debug for MiddlewarePipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MiddlewarePipeline")
            .field("hooks", &self.hooks.len())
            .finish()
    }
}
