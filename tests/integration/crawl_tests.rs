//! Integration tests for the crawler
//!
//! Scheduler behaviour is exercised with in-memory fetch and parse doubles;
//! the HTTP fetcher and the full default stack run against wiremock servers.

use async_trait::async_trait;
use reqwest::Request;
use skein::config::CrawlConfig;
use skein::crawler::{run_crawl, Coordinator, FetchedPage, Fetcher, HttpFetcher};
use skein::frontier::{Frontier, InMemoryFrontier, UrlState};
use skein::middleware::StaticHeader;
use skein::{FetchError, FetchResult};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Serves every request as an empty HTML page unless told to fail it
#[derive(Clone, Default)]
struct FakeFetcher {
    fail: HashSet<String>,
    delay: Option<Duration>,
    calls: Arc<Mutex<Vec<String>>>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
}

impl FakeFetcher {
    fn failing(urls: &[&str]) -> Self {
        Self {
            fail: urls.iter().map(|u| u.to_string()).collect(),
            ..Self::default()
        }
    }

    fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn calls_for(&self, url: &str) -> usize {
        self.calls().iter().filter(|u| *u == url).count()
    }
}

#[async_trait]
impl Fetcher for FakeFetcher {
    async fn fetch(&self, request: Request) -> FetchResult<FetchedPage> {
        let url = request.url().to_string();
        self.calls.lock().unwrap().push(url.clone());

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.fail.contains(&url) {
            return Err(FetchError::Other(format!("connection refused: {}", url)));
        }
        Ok(FetchedPage::html(request.url().clone(), ""))
    }
}

/// Returns the outgoing links of a fixed link graph
#[derive(Clone, Default)]
struct GraphParser {
    edges: HashMap<String, Vec<String>>,
}

impl GraphParser {
    fn new(edges: &[(&str, &[&str])]) -> Self {
        Self {
            edges: edges
                .iter()
                .map(|(from, to)| (from.to_string(), to.iter().map(|s| s.to_string()).collect()))
                .collect(),
        }
    }
}

impl skein::crawler::LinkParser for GraphParser {
    fn parse(&self, page: &FetchedPage) -> Vec<String> {
        self.edges.get(page.url.as_str()).cloned().unwrap_or_default()
    }
}

/// Frontier wrapper that checks the pending/visited partition after every call
struct CheckedFrontier {
    inner: InMemoryFrontier,
    violations: AtomicUsize,
}

impl CheckedFrontier {
    fn new() -> Self {
        Self {
            inner: InMemoryFrontier::new(),
            violations: AtomicUsize::new(0),
        }
    }

    fn check(&self) {
        let pending = self.inner.peek_batch(usize::MAX);
        let unique: HashSet<_> = pending.iter().collect();
        let disjoint = pending
            .iter()
            .all(|url| self.inner.state_of(url) == Some(UrlState::Pending));
        if !disjoint || unique.len() != pending.len() {
            self.violations.fetch_add(1, Ordering::SeqCst);
        }
    }
}

impl Frontier for CheckedFrontier {
    fn peek_batch(&self, n: usize) -> Vec<String> {
        self.inner.peek_batch(n)
    }

    fn mark_visited(&self, url: &str) {
        self.inner.mark_visited(url);
        self.check();
    }

    fn add(&self, url: &str) -> bool {
        let added = self.inner.add(url);
        self.check();
        added
    }

    fn has_pending(&self) -> bool {
        self.inner.has_pending()
    }
}

fn job(seeds: &[&str], allowed: &[&str], max_pages: i64, concurrency: i64) -> CrawlConfig {
    let mut config = CrawlConfig::new("test", seeds.iter().map(|s| s.to_string()).collect());
    config.allowed_domains = allowed.iter().map(|s| s.to_string()).collect();
    config.max_pages = max_pages;
    config.max_concurrent_requests = concurrency;
    config
}

#[tokio::test]
async fn test_scenario_a_budget_of_two() {
    let frontier = Arc::new(InMemoryFrontier::new());
    let fetcher = FakeFetcher::default();
    let always_b = |_: &FetchedPage| vec!["http://x/b".to_string()];

    let mut coordinator = Coordinator::builder(job(&["http://x/a"], &["x"], 2, 1))
        .frontier(Arc::clone(&frontier))
        .fetcher(fetcher.clone())
        .parser(always_b)
        .build()
        .unwrap();
    let report = coordinator.run().await;

    assert_eq!(report.dispatched, 2);
    assert_eq!(report.rounds, 2);
    assert_eq!(fetcher.calls(), vec!["http://x/a", "http://x/b"]);
    assert_eq!(frontier.state_of("http://x/a"), Some(UrlState::Visited));
    assert_eq!(frontier.state_of("http://x/b"), Some(UrlState::Visited));
    assert_eq!(frontier.visited_len(), 2);
}

#[tokio::test]
async fn test_scenario_b_foreign_domain_never_queued() {
    let frontier = Arc::new(InMemoryFrontier::new());
    let parser = GraphParser::new(&[("http://x/a", &["http://other/y", "http://x/c"])]);

    let mut coordinator = Coordinator::builder(job(&["http://x/a"], &["x"], 0, 1))
        .frontier(Arc::clone(&frontier))
        .fetcher(FakeFetcher::default())
        .parser(parser)
        .build()
        .unwrap();
    let report = coordinator.run().await;

    assert_eq!(frontier.state_of("http://other/y"), None);
    assert_eq!(frontier.state_of("http://x/c"), Some(UrlState::Visited));
    assert_eq!(report.links_rejected, 1);
    assert_eq!(report.dispatched, 2);
}

#[tokio::test]
async fn test_scenario_c_disallowed_substring() {
    let frontier = Arc::new(InMemoryFrontier::new());
    let fetcher = FakeFetcher::default();
    let parser = GraphParser::new(&[(
        "http://x/a",
        &["http://x/team/about-us", "http://x/team"],
    )]);

    let mut config = job(&["http://x/a"], &["x"], 0, 2);
    config.disallowed_patterns = vec!["/about".to_string()];

    let mut coordinator = Coordinator::builder(config)
        .frontier(Arc::clone(&frontier))
        .fetcher(fetcher.clone())
        .parser(parser)
        .build()
        .unwrap();
    coordinator.run().await;

    assert_eq!(frontier.state_of("http://x/team/about-us"), None);
    assert_eq!(fetcher.calls_for("http://x/team/about-us"), 0);
    assert_eq!(fetcher.calls_for("http://x/team"), 1);
}

#[tokio::test]
async fn test_scenario_d_failed_fetch_never_retried() {
    let frontier = Arc::new(InMemoryFrontier::new());
    let fetcher = FakeFetcher::failing(&["http://x/a"]);
    // c links back to a after a has already failed
    let parser = GraphParser::new(&[("http://x/c", &["http://x/a", "http://x/d"])]);

    let mut coordinator = Coordinator::builder(job(&["http://x/a", "http://x/c"], &["x"], 0, 2))
        .frontier(Arc::clone(&frontier))
        .fetcher(fetcher.clone())
        .parser(parser)
        .build()
        .unwrap();
    let report = coordinator.run().await;

    assert_eq!(fetcher.calls_for("http://x/a"), 1);
    assert_eq!(frontier.state_of("http://x/a"), Some(UrlState::Visited));
    assert_eq!(report.failed, 1);
    assert_eq!(report.fetched, 2);
    assert_eq!(report.dispatched, 3);
}

#[tokio::test]
async fn test_budget_never_exceeded() {
    let fetcher = FakeFetcher::default();
    // Every page links to ten fresh pages
    let fan_out = |page: &FetchedPage| {
        (0..10)
            .map(|i| format!("{}/{}", page.url.as_str().trim_end_matches('/'), i))
            .collect::<Vec<_>>()
    };

    let mut coordinator = Coordinator::builder(job(&["http://x/"], &["x"], 7, 3))
        .frontier(Arc::new(InMemoryFrontier::new()))
        .fetcher(fetcher.clone())
        .parser(fan_out)
        .build()
        .unwrap();
    let report = coordinator.run().await;

    assert_eq!(report.dispatched, 7);
    assert_eq!(fetcher.calls().len(), 7);
    assert_eq!(coordinator.state().dispatched(), 7);
    // 1 + 3 + 3 per round
    assert_eq!(report.rounds, 3);
}

#[tokio::test]
async fn test_cyclic_graph_terminates_unbounded() {
    let frontier = Arc::new(InMemoryFrontier::new());
    let fetcher = FakeFetcher::default();
    let parser = GraphParser::new(&[
        ("http://x/a", &["http://x/b", "http://x/c"]),
        ("http://x/b", &["http://x/a", "http://x/c"]),
        ("http://x/c", &["http://x/a", "http://x/b", "http://x/c"]),
    ]);

    let mut coordinator = Coordinator::builder(job(&["http://x/a"], &["x"], 0, 2))
        .frontier(Arc::clone(&frontier))
        .fetcher(fetcher.clone())
        .parser(parser)
        .build()
        .unwrap();
    let report = coordinator.run().await;

    assert_eq!(report.dispatched, 3);
    assert_eq!(fetcher.calls().len(), 3);
    assert!(!frontier.has_pending());
    assert_eq!(frontier.visited_len(), 3);
}

#[tokio::test]
async fn test_same_link_found_twice_in_one_round() {
    let frontier = Arc::new(InMemoryFrontier::new());
    let fetcher = FakeFetcher::default();
    let parser = GraphParser::new(&[
        ("http://x/a", &["http://x/shared"]),
        ("http://x/b", &["http://x/shared"]),
    ]);

    let mut coordinator = Coordinator::builder(job(&["http://x/a", "http://x/b"], &["x"], 0, 2))
        .frontier(Arc::clone(&frontier))
        .fetcher(fetcher.clone())
        .parser(parser)
        .build()
        .unwrap();
    let report = coordinator.run().await;

    assert_eq!(report.links_queued, 1);
    assert_eq!(fetcher.calls_for("http://x/shared"), 1);
    assert_eq!(report.dispatched, 3);
}

#[tokio::test]
async fn test_partition_holds_throughout_run() {
    let frontier = Arc::new(CheckedFrontier::new());
    let parser = GraphParser::new(&[
        ("http://x/", &["http://x/1", "http://x/2", "http://x/3"]),
        ("http://x/1", &["http://x/2", "http://x/", "http://x/4"]),
        ("http://x/2", &["http://x/4", "http://x/5"]),
        ("http://x/4", &["http://x/1", "http://x/6"]),
    ]);

    let mut coordinator = Coordinator::builder(job(&["http://x/"], &["x"], 0, 3))
        .frontier(Arc::clone(&frontier))
        .fetcher(FakeFetcher::default())
        .parser(parser)
        .build()
        .unwrap();
    let report = coordinator.run().await;

    assert_eq!(frontier.violations.load(Ordering::SeqCst), 0);
    assert_eq!(report.dispatched, 7);
}

#[tokio::test]
async fn test_round_concurrency_bounded() {
    let fetcher = FakeFetcher::with_delay(Duration::from_millis(20));
    let seeds: Vec<String> = (0..10).map(|i| format!("http://x/{}", i)).collect();
    let seed_refs: Vec<&str> = seeds.iter().map(String::as_str).collect();

    let mut coordinator = Coordinator::builder(job(&seed_refs, &["x"], 0, 4))
        .frontier(Arc::new(InMemoryFrontier::new()))
        .fetcher(fetcher.clone())
        .build()
        .unwrap();
    let report = coordinator.run().await;

    assert_eq!(report.dispatched, 10);
    assert_eq!(report.rounds, 3);
    assert!(fetcher.max_in_flight.load(Ordering::SeqCst) <= 4);
    assert_eq!(fetcher.in_flight.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_batches_follow_fifo_order() {
    let fetcher = FakeFetcher::default();
    let parser = GraphParser::new(&[("http://x/1", &["http://x/4", "http://x/5"])]);

    let mut coordinator =
        Coordinator::builder(job(&["http://x/1", "http://x/2", "http://x/3"], &["x"], 0, 1))
            .frontier(Arc::new(InMemoryFrontier::new()))
            .fetcher(fetcher.clone())
            .parser(parser)
            .build()
            .unwrap();
    coordinator.run().await;

    assert_eq!(
        fetcher.calls(),
        vec![
            "http://x/1",
            "http://x/2",
            "http://x/3",
            "http://x/4",
            "http://x/5"
        ]
    );
}

#[tokio::test]
async fn test_empty_allow_list_follows_any_host() {
    let frontier = Arc::new(InMemoryFrontier::new());
    let parser = GraphParser::new(&[("http://x/a", &["http://other/y", "/relative"])]);

    let mut coordinator = Coordinator::builder(job(&["http://x/a"], &[], 0, 1))
        .frontier(Arc::clone(&frontier))
        .fetcher(FakeFetcher::default())
        .parser(parser)
        .build()
        .unwrap();
    let report = coordinator.run().await;

    assert_eq!(frontier.state_of("http://other/y"), Some(UrlState::Visited));
    assert_eq!(frontier.state_of("/relative"), None);
    assert_eq!(report.links_rejected, 1);
}

#[tokio::test]
async fn test_fragment_links_deduplicated() {
    let fetcher = FakeFetcher::default();
    let parser = GraphParser::new(&[("http://x/a", &["http://x/b#top", "http://x/b#bottom"])]);

    let mut coordinator = Coordinator::builder(job(&["http://x/a"], &["x"], 0, 2))
        .frontier(Arc::new(InMemoryFrontier::new()))
        .fetcher(fetcher.clone())
        .parser(parser)
        .build()
        .unwrap();
    coordinator.run().await;

    assert_eq!(fetcher.calls(), vec!["http://x/a", "http://x/b"]);
}

#[tokio::test]
async fn test_disallow_checked_against_normalized_link() {
    let frontier = Arc::new(InMemoryFrontier::new());
    let fetcher = FakeFetcher::default();
    // Both spellings normalize to http://x/about
    let parser = GraphParser::new(&[("http://x/a", &["http://x/a/../about", "http://X/about"])]);

    let mut config = job(&["http://x/a"], &["x"], 0, 2);
    config.disallowed_patterns = vec!["x/about".to_string()];

    let mut coordinator = Coordinator::builder(config)
        .frontier(Arc::clone(&frontier))
        .fetcher(fetcher.clone())
        .parser(parser)
        .build()
        .unwrap();
    let report = coordinator.run().await;

    assert_eq!(frontier.state_of("http://x/about"), None);
    assert_eq!(fetcher.calls_for("http://x/about"), 0);
    assert_eq!(report.links_rejected, 2);
    assert_eq!(report.dispatched, 1);
    assert_eq!(report.rejected, 0);
}

/// Panics on any URL ending in `/boom`
struct PanickingFetcher;

#[async_trait]
impl Fetcher for PanickingFetcher {
    async fn fetch(&self, request: Request) -> FetchResult<FetchedPage> {
        if request.url().path().ends_with("/boom") {
            panic!("fetcher blew up on {}", request.url());
        }
        Ok(FetchedPage::html(request.url().clone(), ""))
    }
}

#[tokio::test]
async fn test_panicking_task_counts_as_failed() {
    let frontier = Arc::new(InMemoryFrontier::new());

    let mut coordinator = Coordinator::builder(job(&["http://x/boom", "http://x/ok"], &["x"], 0, 2))
        .frontier(Arc::clone(&frontier))
        .fetcher(PanickingFetcher)
        .build()
        .unwrap();
    let report = coordinator.run().await;

    assert_eq!(report.dispatched, 2);
    assert_eq!(report.failed, 1);
    assert_eq!(report.fetched, 1);
    assert_eq!(report.rounds, 1);
    assert_eq!(frontier.state_of("http://x/boom"), Some(UrlState::Visited));
    assert_eq!(frontier.state_of("http://x/ok"), Some(UrlState::Visited));
}

fn host_of(server: &MockServer) -> String {
    let url = url::Url::parse(&server.uri()).expect("Failed to parse mock server URI");
    format!(
        "{}:{}",
        url.host_str().expect("Failed to extract host"),
        url.port().expect("Mock server has no port")
    )
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.to_string(), "text/html; charset=utf-8")
}

#[tokio::test]
async fn test_http_fetcher_rejects_non_html() {
    let mock_server = MockServer::start().await;

    Mock::given(method("HEAD"))
        .and(path("/report.pdf"))
        .respond_with(ResponseTemplate::new(200).insert_header("content-type", "application/pdf"))
        .mount(&mock_server)
        .await;

    // The GET must never be issued once the HEAD probe fails
    Mock::given(method("GET"))
        .and(path("/report.pdf"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let fetcher = HttpFetcher::new(reqwest::Client::new());
    let url = url::Url::parse(&format!("{}/report.pdf", mock_server.uri())).unwrap();
    let result = fetcher.fetch(Request::new(reqwest::Method::GET, url)).await;

    assert!(matches!(result, Err(FetchError::NotHtml { .. })));
}

#[tokio::test]
async fn test_http_fetcher_rejects_error_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("HEAD"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404).insert_header("content-type", "text/html"))
        .mount(&mock_server)
        .await;

    let fetcher = HttpFetcher::new(reqwest::Client::new());
    let url = url::Url::parse(&format!("{}/missing", mock_server.uri())).unwrap();
    let result = fetcher.fetch(Request::new(reqwest::Method::GET, url)).await;

    assert!(matches!(result, Err(FetchError::Status { status: 404, .. })));
}

#[tokio::test]
async fn test_http_fetcher_returns_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("HEAD"))
        .and(path("/page"))
        .respond_with(html(""))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/page"))
        .respond_with(html("<html><body>hello</body></html>"))
        .mount(&mock_server)
        .await;

    let fetcher = HttpFetcher::new(reqwest::Client::new());
    let url = url::Url::parse(&format!("{}/page", mock_server.uri())).unwrap();
    let page = fetcher
        .fetch(Request::new(reqwest::Method::GET, url))
        .await
        .unwrap();

    assert_eq!(page.status, 200);
    assert_eq!(page.body, "<html><body>hello</body></html>");
    assert!(page.content_type.unwrap().contains("text/html"));
}

#[tokio::test]
async fn test_http_fetcher_connection_refused() {
    let fetcher = HttpFetcher::new(reqwest::Client::new());
    let url = url::Url::parse("http://127.0.0.1:1/").unwrap();
    let result = fetcher.fetch(Request::new(reqwest::Method::GET, url)).await;

    assert!(matches!(result, Err(FetchError::Transport { .. })));
}

#[tokio::test]
async fn test_full_crawl_single_domain() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("HEAD"))
        .respond_with(html(""))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(&format!(
            r##"<html><body>
            <a href="{}/page1">Page 1</a>
            <a href="/page2">Page 2</a>
            <a href="/about">About</a>
            <a href="https://elsewhere.example/">Elsewhere</a>
            <a href="#top">Top</a>
            </body></html>"##,
            base_url
        )))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/page1"))
        .respond_with(html(r#"<html><body><a href="/page2">Page 2</a></body></html>"#))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/page2"))
        .respond_with(html(r#"<html><body><a href="/">Home</a></body></html>"#))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/about"))
        .respond_with(html(""))
        .expect(0)
        .mount(&mock_server)
        .await;

    let mut config = job(&[&format!("{}/", base_url)], &[&host_of(&mock_server)], 0, 2);
    config.disallowed_patterns = vec!["/about".to_string()];

    let report = run_crawl(config).await.expect("Crawl failed");

    assert_eq!(report.dispatched, 3);
    assert_eq!(report.fetched, 3);
    assert_eq!(report.failed, 0);
    // /about and the foreign host
    assert_eq!(report.links_rejected, 2);
}

#[tokio::test]
async fn test_full_crawl_budget_and_failures() {
    let mock_server = MockServer::start().await;

    Mock::given(method("HEAD"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    Mock::given(method("HEAD"))
        .respond_with(html(""))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(
            r#"<a href="/broken">Broken</a><a href="/a">A</a><a href="/b">B</a><a href="/c">C</a>"#,
        ))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .respond_with(html("<p>leaf</p>"))
        .mount(&mock_server)
        .await;

    let config = job(
        &[&format!("{}/", mock_server.uri())],
        &[&host_of(&mock_server)],
        3,
        5,
    );

    let report = run_crawl(config).await.expect("Crawl failed");

    // Seed round, then a round capped at the two remaining pages
    assert_eq!(report.dispatched, 3);
    assert_eq!(report.rounds, 2);
    assert_eq!(report.failed, 1);
    assert_eq!(report.fetched, 2);
}

#[tokio::test]
async fn test_middleware_headers_reach_server() {
    let mock_server = MockServer::start().await;

    Mock::given(method("HEAD"))
        .and(header("user-agent", "skein-test/1.0"))
        .respond_with(html(""))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(header("user-agent", "skein-test/1.0"))
        .respond_with(html("<p>ok</p>"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = job(&[&format!("{}/", mock_server.uri())], &[], 0, 1);
    let mut coordinator = Coordinator::builder(config)
        .frontier(Arc::new(InMemoryFrontier::new()))
        .fetcher(HttpFetcher::new(reqwest::Client::new()))
        .middleware(StaticHeader::user_agent("skein-test/1.0").unwrap())
        .build()
        .unwrap();
    let report = coordinator.run().await;

    assert_eq!(report.fetched, 1);
}
