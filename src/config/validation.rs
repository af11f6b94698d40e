use crate::config::types::{CrawlConfig, HttpConfig};
use crate::ConfigError;

/// Validates the entire configuration
///
/// Out-of-range `max-pages` and `max-concurrent-requests` values are not
/// errors; they are coerced when read.
pub fn validate(config: &CrawlConfig) -> Result<(), ConfigError> {
    validate_job(config)?;
    validate_allowed_domains(&config.allowed_domains)?;
    validate_disallowed_patterns(&config.disallowed_patterns)?;
    validate_http_config(&config.http)?;
    Ok(())
}

/// Validates the required job identity fields
fn validate_job(config: &CrawlConfig) -> Result<(), ConfigError> {
    if config.name.trim().is_empty() {
        return Err(ConfigError::MissingName);
    }

    if config.starting_urls.is_empty() {
        return Err(ConfigError::MissingStartingUrls);
    }

    if config.verbose && config.quiet {
        return Err(ConfigError::Validation(
            "verbose and quiet cannot both be set".to_string(),
        ));
    }

    Ok(())
}

/// Validates allowed domain entries
fn validate_allowed_domains(domains: &[String]) -> Result<(), ConfigError> {
    for domain in domains {
        if domain.trim().is_empty() {
            return Err(ConfigError::Validation(
                "allowed-domains cannot contain an empty entry".to_string(),
            ));
        }

        if domain.contains('/') {
            return Err(ConfigError::Validation(format!(
                "allowed domain '{}' must be a bare host, not a URL",
                domain
            )));
        }
    }
    Ok(())
}

/// Validates disallowed pattern entries
fn validate_disallowed_patterns(patterns: &[String]) -> Result<(), ConfigError> {
    // An empty pattern is a substring of every URL and would block the whole crawl
    if patterns.iter().any(|p| p.is_empty()) {
        return Err(ConfigError::Validation(
            "disallowed-patterns cannot contain an empty pattern".to_string(),
        ));
    }
    Ok(())
}

/// Validates HTTP fetcher configuration
fn validate_http_config(config: &HttpConfig) -> Result<(), ConfigError> {
    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "timeout-secs must be >= 1, got {}",
            config.timeout_secs
        )));
    }

    if let Some(user_agent) = &config.user_agent {
        if user_agent.trim().is_empty() {
            return Err(ConfigError::Validation(
                "user-agent cannot be empty".to_string(),
            ));
        }

        if config.randomise_user_agent {
            return Err(ConfigError::Validation(
                "user-agent and randomise-user-agent are mutually exclusive".to_string(),
            ));
        }
    }

    Ok(())
}
