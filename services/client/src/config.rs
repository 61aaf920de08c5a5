//! services/client/src/config.rs
//!
//! Client settings: API location, preference file, logging and request policy.
//!
//! Read from the environment once at startup; a `.env` file in the working
//! directory is honoured outside of tests.

use std::path::PathBuf;
use std::time::Duration;
use tracing::Level;

pub const DEFAULT_API_URL: &str = "https://studysmarterapp.onrender.com/api";

/// Raised when an environment variable is set but cannot be parsed.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Settings shared by the adapters and the views.
#[derive(Clone, Debug)]
pub struct Config {
    pub api_url: String,
    pub store_path: PathBuf,
    pub log_level: Level,
    pub request_timeout: Duration,
    /// Extra attempts for idempotent requests that failed before a response.
    pub request_retries: u32,
    pub banner_dismiss: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            store_path: PathBuf::from("./.studysmarter/store.json"),
            log_level: Level::INFO,
            request_timeout: Duration::from_secs(15),
            request_retries: 1,
            banner_dismiss: Duration::from_millis(3000),
        }
    }
}

impl Config {
    /// Builds the configuration from the environment, falling back to `Default`
    /// for unset variables. `.env` is not read under `cfg(test)`.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        let defaults = Self::default();

        let api_url = std::env::var("STUDYSMARTER_API_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or(defaults.api_url);

        let store_path = std::env::var("STUDYSMARTER_STORE_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.store_path);

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let request_timeout = match std::env::var("REQUEST_TIMEOUT_SECS") {
            Ok(raw) => Duration::from_secs(parse_var("REQUEST_TIMEOUT_SECS", &raw)?),
            Err(_) => defaults.request_timeout,
        };

        let request_retries = match std::env::var("REQUEST_RETRIES") {
            Ok(raw) => parse_var("REQUEST_RETRIES", &raw)?,
            Err(_) => defaults.request_retries,
        };

        let banner_dismiss = match std::env::var("BANNER_DISMISS_MS") {
            Ok(raw) => Duration::from_millis(parse_var("BANNER_DISMISS_MS", &raw)?),
            Err(_) => defaults.banner_dismiss,
        };

        Ok(Self {
            api_url,
            store_path,
            log_level,
            request_timeout,
            request_retries,
            banner_dismiss,
        })
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, raw: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidValue(name.to_string(), e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_var_reports_the_variable() {
        let err = parse_var::<u64>("REQUEST_RETRIES", "many").unwrap_err();
        assert!(err.to_string().contains("REQUEST_RETRIES"));
        assert_eq!(parse_var::<u64>("X", " 5 ").unwrap(), 5);
    }
}
