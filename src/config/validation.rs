use crate::config::types::Config;
use crate::ConfigError;

/// Validates cross-field constraints on a loaded configuration
///
/// Runs once at INIT. Anything rejected here is fatal; nothing past
/// this point aborts the run for configuration reasons.
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.queries.is_empty() {
        return Err(ConfigError::Validation(
            "at least one search query is required".to_string(),
        ));
    }

    if config.pages_per_query == 0 {
        return Err(ConfigError::Validation(
            "pages per query must be at least 1".to_string(),
        ));
    }

    if config.max_requests_per_run == 0 {
        return Err(ConfigError::Validation(
            "max requests per run must be at least 1".to_string(),
        ));
    }

    if config.delay_min_ms > config.delay_max_ms {
        return Err(ConfigError::Validation(format!(
            "delay range is inverted: min {}ms > max {}ms",
            config.delay_min_ms, config.delay_max_ms
        )));
    }

    if config.search_host.is_empty() || config.mobile_host.is_empty() {
        return Err(ConfigError::Validation(
            "search and mobile hosts must be non-empty".to_string(),
        ));
    }

    if let Some(rate) = config.min_completion_rate {
        if !(0.0..=1.0).contains(&rate) {
            return Err(ConfigError::Validation(format!(
                "completion rate threshold must be within [0.0, 1.0], got {}",
                rate
            )));
        }
    }

    Ok(())
}
