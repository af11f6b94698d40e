//! Admission control
//!
//! Decides whether a URL may be fetched and whether a discovered link may be
//! queued. Both checks are pure functions of the job configuration.

use crate::config::CrawlConfig;
use crate::url::domain::extract_host;
use crate::{UrlError, UrlResult};
use std::collections::HashSet;
use url::{ParseError, Url};

/// The admission gate built from a job's allowed domains and disallowed patterns
#[derive(Debug, Clone, Default)]
pub struct Admission {
    allowed_domains: HashSet<String>,
    disallowed_patterns: Vec<String>,
}

impl Admission {
    /// Creates an admission gate
    ///
    /// An empty domain list allows every host. Domains are compared exactly
    /// (after lowercasing); `example.com` does not admit `www.example.com`.
    pub fn new<D, P>(allowed_domains: D, disallowed_patterns: P) -> Self
    where
        D: IntoIterator,
        D::Item: AsRef<str>,
        P: IntoIterator,
        P::Item: Into<String>,
    {
        Self {
            allowed_domains: allowed_domains
                .into_iter()
                .map(|d| d.as_ref().trim().to_lowercase())
                .collect(),
            disallowed_patterns: disallowed_patterns.into_iter().map(Into::into).collect(),
        }
    }

    /// Builds the admission gate for a crawl job
    pub fn from_config(config: &CrawlConfig) -> Self {
        Self::new(
            &config.allowed_domains,
            config.disallowed_patterns.iter().cloned(),
        )
    }

    /// Returns true if every host is allowed
    pub fn allows_all_domains(&self) -> bool {
        self.allowed_domains.is_empty()
    }

    /// Checks that a URL parses, is absolute and is on an allowed host
    ///
    /// # Returns
    ///
    /// * `Ok(Url)` - The parsed URL
    /// * `Err(UrlError)` - Why the URL cannot be fetched
    ///
    /// # Examples
    ///
    /// ```
    /// use skein::url::Admission;
    ///
    /// let admission = Admission::new(["www.xkcd.com"], Vec::<String>::new());
    /// assert!(admission.is_fetchable("http://www.xkcd.com/1/").is_ok());
    /// assert!(admission.is_fetchable("http://xkcd.com/1/").is_err());
    /// assert!(admission.is_fetchable("/1/").is_err());
    /// ```
    pub fn is_fetchable(&self, raw: &str) -> UrlResult<Url> {
        let url = Url::parse(raw).map_err(|e| match e {
            ParseError::RelativeUrlWithoutBase => UrlError::NotAbsolute(raw.to_string()),
            other => UrlError::Parse {
                url: raw.to_string(),
                reason: other.to_string(),
            },
        })?;

        let host = extract_host(&url).ok_or_else(|| UrlError::NotAbsolute(raw.to_string()))?;

        if !self.allowed_domains.is_empty() && !self.allowed_domains.contains(&host) {
            return Err(UrlError::DomainNotAllowed {
                url: raw.to_string(),
                host,
            });
        }

        Ok(url)
    }

    /// Returns true if any disallowed pattern occurs anywhere in the URL string
    ///
    /// The match is a plain, case-sensitive substring test, so `/about` rejects
    /// `http://x/team/about-us` as well as `http://x/about` but not `http://x/About`.
    pub fn is_disallowed(&self, raw: &str) -> bool {
        self.matching_pattern(raw).is_some()
    }

    /// Runs both checks, as applied to a freshly discovered link
    pub fn admit(&self, raw: &str) -> UrlResult<Url> {
        let url = self.is_fetchable(raw)?;
        if let Some(pattern) = self.matching_pattern(raw) {
            return Err(UrlError::Disallowed {
                url: raw.to_string(),
                pattern: pattern.to_string(),
            });
        }
        Ok(url)
    }

    fn matching_pattern(&self, raw: &str) -> Option<&str> {
        self.disallowed_patterns
            .iter()
            .find(|pattern| raw.contains(pattern.as_str()))
            .map(String::as_str)
    }
}
