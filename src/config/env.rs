use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use std::path::PathBuf;
use std::str::FromStr;

/// Environment variable names, in one place so `--dry-run` output and
/// error messages stay consistent with what the loader actually reads.
pub const ENV_SINK_URL: &str = "SINK_URL";
pub const ENV_PROXY_URL: &str = "PROXY_URL";
pub const ENV_PAGES_PER_QUERY: &str = "ZP_PAGES_PER_QUERY";
pub const ENV_DELAY_MS_MIN: &str = "ZP_DELAY_MS_MIN";
pub const ENV_DELAY_MS_MAX: &str = "ZP_DELAY_MS_MAX";
pub const ENV_MAX_REQUESTS_PER_RUN: &str = "ZP_MAX_REQUESTS_PER_RUN";
pub const ENV_BUFFER_PATH: &str = "ZP_BUFFER_PATH";
pub const ENV_SEARCH_HOST: &str = "ZP_SEARCH_HOST";
pub const ENV_MOBILE_HOST: &str = "ZP_MOBILE_HOST";
pub const ENV_MIN_COMPLETION_RATE: &str = "ZP_MIN_COMPLETION_RATE";

/// Loads and validates configuration from the process environment
///
/// `queries` comes from the command line (region tokens or full search
/// URLs). Unset variables take their documented defaults; a variable
/// that is set but unparseable is a fatal configuration error rather
/// than a silent fallback.
pub fn load_from_env(queries: Vec<String>) -> Result<Config, ConfigError> {
    let config = Config {
        sink_url: read_optional(ENV_SINK_URL),
        proxy_spec: read_optional(ENV_PROXY_URL),
        pages_per_query: read_parsed(ENV_PAGES_PER_QUERY, 3)?,
        delay_min_ms: read_parsed(ENV_DELAY_MS_MIN, 800)?,
        delay_max_ms: read_parsed(ENV_DELAY_MS_MAX, 2200)?,
        max_requests_per_run: read_parsed(ENV_MAX_REQUESTS_PER_RUN, 120)?,
        buffer_path: PathBuf::from(
            read_optional(ENV_BUFFER_PATH).unwrap_or_else(|| "./listings-buffer.ndjson".to_string()),
        ),
        search_host: read_optional(ENV_SEARCH_HOST).unwrap_or_else(|| "www.zoopla.co.uk".to_string()),
        mobile_host: read_optional(ENV_MOBILE_HOST).unwrap_or_else(|| "m.zoopla.co.uk".to_string()),
        min_completion_rate: read_optional_parsed(ENV_MIN_COMPLETION_RATE)?,
        queries,
    };

    validate(&config)?;

    Ok(config)
}

/// Reads a variable, treating unset and empty identically
fn read_optional(key: &'static str) -> Option<String> {
    match std::env::var(key) {
        Ok(value) if !value.trim().is_empty() => Some(value.trim().to_string()),
        _ => None,
    }
}

fn read_parsed<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match read_optional(key) {
        None => Ok(default),
        Some(value) => value.parse().map_err(|e: T::Err| ConfigError::Parse {
            key,
            value,
            reason: e.to_string(),
        }),
    }
}

fn read_optional_parsed<T: FromStr>(key: &'static str) -> Result<Option<T>, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match read_optional(key) {
        None => Ok(None),
        Some(value) => value
            .parse()
            .map(Some)
            .map_err(|e: T::Err| ConfigError::Parse {
                key,
                value,
                reason: e.to_string(),
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Environment variables are process-global; tests serialize access
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_defaults_when_unset() {
        let _guard = ENV_LOCK.lock().unwrap();
        std::env::remove_var(ENV_PAGES_PER_QUERY);
        std::env::remove_var(ENV_DELAY_MS_MIN);
        std::env::remove_var(ENV_DELAY_MS_MAX);
        std::env::remove_var(ENV_MAX_REQUESTS_PER_RUN);
        std::env::remove_var(ENV_SINK_URL);
        std::env::remove_var(ENV_PROXY_URL);
        std::env::remove_var(ENV_MIN_COMPLETION_RATE);

        let config = load_from_env(vec!["L4".to_string()]).unwrap();
        assert_eq!(config.pages_per_query, 3);
        assert_eq!(config.delay_min_ms, 800);
        assert_eq!(config.delay_max_ms, 2200);
        assert_eq!(config.max_requests_per_run, 120);
        assert!(config.sink_url.is_none());
        assert!(config.proxy_spec.is_none());
        assert!(config.min_completion_rate.is_none());
        assert_eq!(config.search_host, "www.zoopla.co.uk");
        assert_eq!(config.mobile_host, "m.zoopla.co.uk");
    }

    #[test]
    fn test_unparseable_numeric_is_fatal() {
        let _guard = ENV_LOCK.lock().unwrap();
        std::env::set_var(ENV_MAX_REQUESTS_PER_RUN, "lots");
        let result = load_from_env(vec!["L4".to_string()]);
        std::env::remove_var(ENV_MAX_REQUESTS_PER_RUN);

        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_empty_value_treated_as_unset() {
        let _guard = ENV_LOCK.lock().unwrap();
        std::env::set_var(ENV_SINK_URL, "   ");
        let config = load_from_env(vec!["L4".to_string()]).unwrap();
        std::env::remove_var(ENV_SINK_URL);

        assert!(config.sink_url.is_none());
    }
}
