use url::Url;

/// Normalizes a URL into the form stored in the frontier
///
/// URLs that parse are re-serialized by the `url` crate (lowercased scheme
/// and host, default port dropped, empty path becomes `/`) and lose their
/// fragment. Anything that does not parse is returned unchanged so the
/// admission check can reject it later.
///
/// # Examples
///
/// ```
/// use skein::url::normalize_url;
///
/// assert_eq!(normalize_url("HTTP://Example.COM"), "http://example.com/");
/// assert_eq!(normalize_url("http://x/a#top"), "http://x/a");
/// assert_eq!(normalize_url("/relative"), "/relative");
/// ```
pub fn normalize_url(raw: &str) -> String {
    match Url::parse(raw) {
        Ok(mut url) => {
            url.set_fragment(None);
            url.into()
        }
        Err(_) => raw.to_string(),
    }
}
