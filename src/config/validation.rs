use crate::config::types::{Config, FetcherConfig, Settings};
use crate::ConfigError;

/// Validates the entire configuration
///
/// Seed URLs are deliberately not checked here: an invalid seed is recorded
/// as a failure of the run rather than rejected up front.
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_settings(&config.scraper)?;
    validate_fetcher_config(&config.fetcher)?;
    Ok(())
}

/// Validates crawl settings
pub fn validate_settings(settings: &Settings) -> Result<(), ConfigError> {
    // max_depth >= 0 is always true for u32, so no check needed

    if settings.parallels < 1 {
        return Err(ConfigError::Validation(format!(
            "parallels must be >= 1, got {}",
            settings.parallels
        )));
    }

    validate_blacklist(&settings.blacklist)?;

    Ok(())
}

/// Validates blacklist patterns
fn validate_blacklist(patterns: &[String]) -> Result<(), ConfigError> {
    for pattern in patterns {
        // An empty pattern is a substring of every path
        if pattern.trim().is_empty() {
            return Err(ConfigError::Validation(
                "blacklist patterns cannot be empty".to_string(),
            ));
        }
    }
    Ok(())
}

/// Validates fetcher configuration
pub fn validate_fetcher_config(config: &FetcherConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    if config.request_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "request_timeout_secs must be >= 1".to_string(),
        ));
    }

    if config.connect_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "connect_timeout_secs must be >= 1".to_string(),
        ));
    }

    if config.max_content_bytes == 0 {
        return Err(ConfigError::Validation(
            "max_content_bytes must be >= 1".to_string(),
        ));
    }

    Ok(())
}
