//! Parse boundary and the bundled HTML link extractor
//!
//! A [`LinkParser`] turns a fetched page into candidate URLs. Candidates may
//! be relative or malformed; admission control filters them afterwards.

use crate::crawler::fetcher::FetchedPage;
use scraper::{Html, Selector};
use url::Url;

/// The parse boundary
///
/// Implemented for any `Fn(&FetchedPage) -> Vec<String>` closure.
pub trait LinkParser: Send + Sync {
    fn parse(&self, page: &FetchedPage) -> Vec<String>;
}

impl<F> LinkParser for F
where
    F: Fn(&FetchedPage) -> Vec<String> + Send + Sync,
{
    fn parse(&self, page: &FetchedPage) -> Vec<String> {
        self(page)
    }
}

/// Extracts every `<a href>` target from an HTML page
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlLinkParser;

impl HtmlLinkParser {
    pub fn new() -> Self {
        Self
    }
}

impl LinkParser for HtmlLinkParser {
    fn parse(&self, page: &FetchedPage) -> Vec<String> {
        extract_links(&page.body, &page.url)
    }
}

/// Extracts links from an HTML document
///
/// # Link Extraction Rules
///
/// - Every `<a href="...">` in the document, in document order
/// - Empty hrefs and fragment-only hrefs (`#section`) are skipped
/// - Relative hrefs are resolved against `base_url`
/// - Hrefs that cannot be resolved are returned as written
///
/// # Example
///
/// ```
/// use skein::crawler::extract_links;
/// use url::Url;
///
/// let html = r#"<html><body><a href="/page">Link</a></body></html>"#;
/// let base_url = Url::parse("https://example.com/").unwrap();
/// assert_eq!(extract_links(html, &base_url), vec!["https://example.com/page"]);
/// ```
pub fn extract_links(html: &str, base_url: &Url) -> Vec<String> {
    let document = Html::parse_document(html);
    let mut links = Vec::new();

    if let Ok(a_selector) = Selector::parse("a[href]") {
        for element in document.select(&a_selector) {
            if let Some(href) = element.value().attr("href") {
                if let Some(link) = resolve_link(href, base_url) {
                    links.push(link);
                }
            }
        }
    }

    links
}

/// Resolves an href against the page URL
///
/// Returns None for hrefs that never point at another page (empty or
/// fragment-only).
fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    match base_url.join(href) {
        Ok(absolute_url) => Some(absolute_url.into()),
        Err(_) => Some(href.to_string()),
    }
}
