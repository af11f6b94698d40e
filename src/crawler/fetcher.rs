//! Fetch boundary and the bundled HTTP fetcher
//!
//! The scheduler only sees the [`Fetcher`] trait: a request goes in, a page
//! or an error comes out. [`HttpFetcher`] is the default implementation:
//! - HEAD request first, carrying the same headers as the real request
//! - Rejects responses that are not 2xx/3xx
//! - Rejects responses whose Content-Type does not mention html
//! - GET request to read the body

use crate::config::HttpConfig;
use crate::{FetchError, FetchResult};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method, Request, Response, StatusCode};
use std::time::Duration;
use url::Url;

/// A successfully fetched page
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Final URL after redirects
    pub url: Url,

    /// HTTP status code
    pub status: u16,

    /// Content-Type header value, if any
    pub content_type: Option<String>,

    /// Page body
    pub body: String,
}

impl FetchedPage {
    /// Creates a 200 text/html page, mostly useful for test doubles
    pub fn html(url: Url, body: impl Into<String>) -> Self {
        Self {
            url,
            status: StatusCode::OK.as_u16(),
            content_type: Some("text/html".to_string()),
            body: body.into(),
        }
    }
}

/// The fetch boundary
///
/// Any error means "this URL yielded nothing"; the scheduler never retries.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, request: Request) -> FetchResult<FetchedPage>;
}

/// Builds an HTTP client with the configured timeout
///
/// Redirects are followed with reqwest's default policy.
pub fn build_http_client(config: &HttpConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches pages over HTTP with reqwest
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Creates a fetcher with a client built from the HTTP configuration
    pub fn from_config(config: &HttpConfig) -> Result<Self, reqwest::Error> {
        Ok(Self::new(build_http_client(config)?))
    }

    async fn execute(&self, url: &str, request: Request) -> FetchResult<Response> {
        self.client
            .execute(request)
            .await
            .map_err(|source| FetchError::Transport {
                url: url.to_string(),
                source,
            })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, request: Request) -> FetchResult<FetchedPage> {
        let url = request.url().to_string();

        // Bodiless requests always clone; anything else skips the HEAD probe
        if let Some(mut head) = request.try_clone() {
            *head.method_mut() = Method::HEAD;
            let response = self.execute(&url, head).await?;
            check_status(&url, response.status())?;
            check_content_type(&url, header_content_type(&response).as_deref())?;
        }

        let response = self.execute(&url, request).await?;
        let status = response.status();
        check_status(&url, status)?;

        let content_type = header_content_type(&response);
        let final_url = response.url().clone();
        let body = response
            .text()
            .await
            .map_err(|source| FetchError::Transport {
                url: url.clone(),
                source,
            })?;

        tracing::trace!("Fetched {} ({} bytes)", final_url, body.len());

        Ok(FetchedPage {
            url: final_url,
            status: status.as_u16(),
            content_type,
            body,
        })
    }
}

fn header_content_type(response: &Response) -> Option<String> {
    response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// Accepts 2xx and 3xx responses
fn check_status(url: &str, status: StatusCode) -> FetchResult<()> {
    if status.is_success() || status.is_redirection() {
        Ok(())
    } else {
        Err(FetchError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        })
    }
}

/// Accepts any Content-Type that mentions html (text/html, application/xhtml+xml)
fn check_content_type(url: &str, content_type: Option<&str>) -> FetchResult<()> {
    match content_type {
        Some(ct) if ct.to_ascii_lowercase().contains("html") => Ok(()),
        other => Err(FetchError::NotHtml {
            url: url.to_string(),
            content_type: other.unwrap_or_default().to_string(),
        }),
    }
}
