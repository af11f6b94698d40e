use crate::middleware::RequestMiddleware;
use crate::{ConfigError, ConfigResult};
use rand::seq::SliceRandom;
use reqwest::header::{HeaderName, HeaderValue, USER_AGENT};
use reqwest::Request;

/// Browser user agent strings used by [`RandomUserAgent`]
pub const BROWSER_USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/122.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:125.0) Gecko/20100101 Firefox/125.0",
    "Mozilla/5.0 (X11; Linux x86_64; rv:124.0) Gecko/20100101 Firefox/124.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 14.4; rv:125.0) Gecko/20100101 Firefox/125.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 14_4_1) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4.1 Safari/605.1.15",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36 Edg/124.0.0.0",
];

/// Sets the User-Agent header to a randomly chosen browser string
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomUserAgent;

impl RandomUserAgent {
    pub fn new() -> Self {
        Self
    }
}

impl RequestMiddleware for RandomUserAgent {
    fn apply(&self, request: &mut Request) {
        if let Some(agent) = BROWSER_USER_AGENTS.choose(&mut rand::thread_rng()) {
            request
                .headers_mut()
                .insert(USER_AGENT, HeaderValue::from_static(*agent));
        }
    }
}

/// Injects a fixed header into every request, replacing any existing value
#[derive(Debug, Clone)]
pub struct StaticHeader {
    name: HeaderName,
    value: HeaderValue,
}

impl StaticHeader {
    /// Creates a header hook, validating the name and value
    pub fn new(name: &str, value: &str) -> ConfigResult<Self> {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| ConfigError::Validation(format!("Invalid header name '{}': {}", name, e)))?;
        let value = HeaderValue::from_str(value).map_err(|e| {
            ConfigError::Validation(format!("Invalid value for header '{}': {}", name, e))
        })?;
        Ok(Self { name, value })
    }

    /// Creates a hook that sets a fixed User-Agent
    pub fn user_agent(value: &str) -> ConfigResult<Self> {
        Self::new(USER_AGENT.as_str(), value)
    }
}

impl RequestMiddleware for StaticHeader {
    fn apply(&self, request: &mut Request) {
        request
            .headers_mut()
            .insert(self.name.clone(), self.value.clone());
    }
}
