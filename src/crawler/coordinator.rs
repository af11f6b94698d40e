//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the round loop that ties the crawl together:
//! - Validating the job and seeding the frontier
//! - Drawing a bounded batch from the frontier each round
//! - Marking the batch visited and charging the budget before any fetch
//! - Running one fetch task per URL and joining them all at the barrier
//! - Re-admitting harvested links into the frontier

use crate::config::{validate, CrawlConfig};
use crate::crawler::fetcher::{Fetcher, HttpFetcher};
use crate::crawler::parser::{HtmlLinkParser, LinkParser};
use crate::crawler::scheduler::{CrawlPhase, CrawlState};
use crate::frontier::{Frontier, InMemoryFrontier};
use crate::middleware::{MiddlewarePipeline, RequestMiddleware};
use crate::output::CrawlReport;
use crate::state::PageOutcome;
use crate::url::{normalize_url, Admission};
use crate::{ConfigError, ConfigResult, Result, UrlError};
use reqwest::{Method, Request};
use std::sync::Arc;
use tokio::task::JoinSet;

/// Builder for [`Coordinator`]
///
/// The frontier and the fetcher are required; the parser and middleware are
/// optional.
pub struct CoordinatorBuilder {
    config: CrawlConfig,
    frontier: Option<Arc<dyn Frontier>>,
    fetcher: Option<Arc<dyn Fetcher>>,
    parser: Option<Arc<dyn LinkParser>>,
    middleware: MiddlewarePipeline,
}

impl CoordinatorBuilder {
    pub fn new(config: CrawlConfig) -> Self {
        Self {
            config,
            frontier: None,
            fetcher: None,
            parser: None,
            middleware: MiddlewarePipeline::new(),
        }
    }

    /// Sets the frontier; the caller may keep a handle to inspect it later
    pub fn frontier<F: Frontier + 'static>(mut self, frontier: Arc<F>) -> Self {
        let frontier: Arc<dyn Frontier> = frontier;
        self.frontier = Some(frontier);
        self
    }

    pub fn fetcher(mut self, fetcher: impl Fetcher + 'static) -> Self {
        self.fetcher = Some(Arc::new(fetcher));
        self
    }

    pub fn parser(mut self, parser: impl LinkParser + 'static) -> Self {
        self.parser = Some(Arc::new(parser));
        self
    }

    /// Appends one middleware hook
    pub fn middleware(mut self, middleware: impl RequestMiddleware + 'static) -> Self {
        self.middleware.push(middleware);
        self
    }

    /// Replaces the whole middleware pipeline
    pub fn middleware_pipeline(mut self, pipeline: MiddlewarePipeline) -> Self {
        self.middleware = pipeline;
        self
    }

    /// Validates the job and builds the coordinator
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run
    /// * `Err(ConfigError)` - Missing name, starting URLs, frontier or fetcher,
    ///   or an otherwise invalid configuration
    pub fn build(self) -> ConfigResult<Coordinator> {
        validate(&self.config)?;
        let frontier = self.frontier.ok_or(ConfigError::MissingFrontier)?;
        let fetcher = self.fetcher.ok_or(ConfigError::MissingFetcher)?;

        let context = TaskContext {
            name: self.config.name.clone(),
            verbose: self.config.verbose,
            admission: Admission::from_config(&self.config),
            frontier: Arc::clone(&frontier),
            fetcher,
            parser: self.parser,
            middleware: self.middleware,
        };

        Ok(Coordinator {
            state: CrawlState::from_config(&self.config),
            config: self.config,
            frontier,
            context: Arc::new(context),
            phase: CrawlPhase::Idle,
        })
    }
}

/// Everything a fetch task needs; shared read-only across the tasks of a round
struct TaskContext {
    name: String,
    verbose: bool,
    admission: Admission,
    frontier: Arc<dyn Frontier>,
    fetcher: Arc<dyn Fetcher>,
    parser: Option<Arc<dyn LinkParser>>,
    middleware: MiddlewarePipeline,
}

impl TaskContext {
    /// Fetches one dispatched URL and queues the links it yields
    ///
    /// The URL is already visited and charged against the budget; nothing
    /// here can undo that.
    async fn process(&self, url: String) -> PageOutcome {
        let target = match self.admission.admit(&url) {
            Ok(target) => target,
            Err(e) => {
                self.log_rejection(&e);
                return PageOutcome::rejected(url);
            }
        };

        let mut request = Request::new(Method::GET, target);
        self.middleware.apply(&mut request);

        let page = match self.fetcher.fetch(request).await {
            Ok(page) => page,
            Err(e) => {
                if self.verbose {
                    tracing::info!("[{}] {}", self.name, e);
                } else {
                    tracing::debug!("[{}] {}", self.name, e);
                }
                return PageOutcome::failed(url);
            }
        };

        tracing::info!("[{}] Spidered {}", self.name, url);
        let mut outcome = PageOutcome::fetched(url);

        let Some(parser) = &self.parser else {
            return outcome;
        };

        for link in parser.parse(&page) {
            outcome.links_found += 1;
            // Admission must see the same string the frontier stores
            let link = normalize_url(&link);
            match self.admission.admit(&link) {
                Ok(_) => {
                    if self.frontier.add(&link) {
                        outcome.links_queued += 1;
                    }
                }
                Err(e) => {
                    outcome.links_rejected += 1;
                    self.log_rejection(&e);
                }
            }
        }

        tracing::debug!(
            "[{}] {}: {} links found, {} queued, {} rejected, {} already known",
            self.name,
            outcome.url,
            outcome.links_found,
            outcome.links_queued,
            outcome.links_rejected,
            outcome.links_duplicate()
        );

        outcome
    }

    fn log_rejection(&self, error: &UrlError) {
        if self.verbose {
            tracing::info!("[{}] {}", self.name, error);
        } else {
            tracing::debug!("[{}] {}", self.name, error);
        }
    }
}

/// Main crawl job structure
///
/// Owns the frontier handle and the budget state for the lifetime of the job.
pub struct Coordinator {
    config: CrawlConfig,
    frontier: Arc<dyn Frontier>,
    context: Arc<TaskContext>,
    state: CrawlState,
    phase: CrawlPhase,
}

impl Coordinator {
    pub fn builder(config: CrawlConfig) -> CoordinatorBuilder {
        CoordinatorBuilder::new(config)
    }

    /// Current phase of the job
    pub fn phase(&self) -> CrawlPhase {
        self.phase
    }

    /// Budget and dispatch accounting
    pub fn state(&self) -> &CrawlState {
        &self.state
    }

    /// Runs the job to completion
    ///
    /// Each round draws up to `min(max_concurrent, remaining budget)` URLs,
    /// marks them visited and charges the budget, then fetches them all
    /// concurrently and waits for every task before the next round. A hung
    /// fetch stalls its round; there is no per-job deadline.
    ///
    /// The job stops when the frontier is empty or the budget is spent.
    /// Running a completed job again returns an empty report.
    pub async fn run(&mut self) -> CrawlReport {
        let mut report = CrawlReport::new(self.config.name.clone());

        if self.phase == CrawlPhase::Completed {
            tracing::warn!("[{}] Crawl already completed", self.config.name);
            report.finish(0);
            return report;
        }

        self.transition(CrawlPhase::Running);
        self.seed_frontier();
        tracing::info!("[{}] Starting spider", self.config.name);

        loop {
            if self.state.is_done(self.frontier.as_ref()) {
                break;
            }

            self.transition(CrawlPhase::DrawBatch);
            let batch = self.frontier.peek_batch(self.state.batch_size());
            if batch.is_empty() {
                break;
            }

            self.transition(CrawlPhase::Dispatch);
            let mut tasks = JoinSet::new();
            for url in batch {
                self.frontier.mark_visited(&url);
                self.state.record_dispatch();

                let context = Arc::clone(&self.context);
                tasks.spawn(async move { context.process(url).await });
            }

            self.transition(CrawlPhase::Barrier);
            while let Some(joined) = tasks.join_next().await {
                match joined {
                    Ok(outcome) => report.record(&outcome),
                    Err(e) => {
                        tracing::warn!("[{}] Fetch task failed: {}", self.config.name, e);
                        report.record_panic();
                    }
                }
            }
            report.rounds += 1;

            tracing::debug!(
                "[{}] Round {} done: {} dispatched, {:?} remaining",
                self.config.name,
                report.rounds,
                self.state.dispatched(),
                self.state.remaining()
            );
        }

        self.transition(CrawlPhase::Completed);
        report.finish(self.state.dispatched());

        tracing::info!(
            "[{}] has completed: {} pages dispatched in {} rounds",
            self.config.name,
            report.dispatched,
            report.rounds
        );

        report
    }

    fn seed_frontier(&self) {
        for url in &self.config.starting_urls {
            let normalized = normalize_url(url);
            if !self.frontier.add(&normalized) {
                tracing::debug!("[{}] Duplicate starting URL {}", self.config.name, url);
            }
        }
    }

    fn transition(&mut self, next: CrawlPhase) {
        debug_assert!(
            self.phase.can_transition_to(next),
            "invalid crawl phase transition {} -> {}",
            self.phase,
            next
        );
        tracing::trace!("[{}] {} -> {}", self.config.name, self.phase, next);
        self.phase = next;
    }
}

/// Runs a crawl with the bundled collaborators
///
/// Wires an [`InMemoryFrontier`], an [`HttpFetcher`], the [`HtmlLinkParser`]
/// and the middleware described by the job's `[http]` section.
///
/// # Example
///
/// ```no_run
/// use skein::config::load_config;
/// use skein::crawler::run_crawl;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("job.toml"))?;
/// let report = run_crawl(config).await?;
/// println!("{} pages fetched", report.fetched);
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(config: CrawlConfig) -> Result<CrawlReport> {
    let fetcher = HttpFetcher::from_config(&config.http)?;
    let middleware = MiddlewarePipeline::from_config(&config.http)?;

    let mut coordinator = Coordinator::builder(config)
        .frontier(Arc::new(InMemoryFrontier::new()))
        .fetcher(fetcher)
        .parser(HtmlLinkParser::new())
        .middleware_pipeline(middleware)
        .build()?;

    Ok(coordinator.run().await)
}
