use url::Url;

/// Extracts the host of a URL in the form used for allow-list matching
///
/// The host is lowercased and keeps a non-default port, so
/// `http://localhost:8080/` yields `localhost:8080` while
/// `http://example.com:80/` yields `example.com`.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use skein::url::extract_host;
///
/// let url = Url::parse("https://EXAMPLE.COM/path").unwrap();
/// assert_eq!(extract_host(&url), Some("example.com".to_string()));
///
/// let url = Url::parse("http://127.0.0.1:8080/").unwrap();
/// assert_eq!(extract_host(&url), Some("127.0.0.1:8080".to_string()));
///
/// let url = Url::parse("mailto:someone@example.com").unwrap();
/// assert_eq!(extract_host(&url), None);
/// ```
pub fn extract_host(url: &Url) -> Option<String> {
    let host = url.host_str()?.to_lowercase();
    match url.port() {
        Some(port) => Some(format!("{}:{}", host, port)),
        None => Some(host),
    }
}
