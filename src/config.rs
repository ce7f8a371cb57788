//! Configuration management for tasktalk.
//!
//! Configuration can be set via environment variables:
//! - `HOST` - Optional. Server host. Defaults to `127.0.0.1`.
//! - `PORT` - Optional. Server port. Defaults to `5001`.
//! - `TASK_STORE` - Optional. `memory` or `sqlite`. Defaults to `sqlite`.
//! - `DATABASE_PATH` - Optional. SQLite file. Defaults to `todos.db`.
//! - `OPENROUTER_API_KEY` - Optional. Enables the remote fallback for commands
//!   the rule cascade cannot interpret.
//! - `FALLBACK_MODEL` - Optional. Defaults to `anthropic/claude-3-haiku`.
//! - `FALLBACK_TIMEOUT_SECS` - Optional. Upper bound on one interpretation. Defaults to `30`.
//! - `FALLBACK_MAX_RETRIES` - Optional. Retries for transient model errors. Defaults to `0`.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::api::task_store::TaskStoreType;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Remote fallback configuration.
#[derive(Debug, Clone)]
pub struct FallbackConfig {
    /// OpenRouter API key; `None` disables the remote call entirely
    pub api_key: Option<String>,

    /// Hosted model identifier (OpenRouter format)
    pub model: String,

    /// Caller-side bound on a whole interpretation, remote call included
    pub timeout: Duration,

    /// Retries for rate limits, 5xx and network errors
    pub max_retries: u32,

    pub max_tokens: u64,

    pub temperature: f64,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "anthropic/claude-3-haiku".to_string(),
            timeout: Duration::from_secs(30),
            max_retries: 0,
            max_tokens: 300,
            temperature: 0.1,
        }
    }
}

impl FallbackConfig {
    pub fn is_enabled(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }
}

/// Service configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host
    pub host: String,

    /// Server port
    pub port: u16,

    /// Task store backend
    pub store: TaskStoreType,

    /// SQLite database file (ignored by the memory store)
    pub database_path: PathBuf,

    pub fallback: FallbackConfig,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if a numeric variable does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        let port = parse_env("PORT", 5001u16)?;

        let store = std::env::var("TASK_STORE")
            .map(|s| TaskStoreType::from_str(&s))
            .unwrap_or_default();

        let database_path = std::env::var("DATABASE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("todos.db"));

        let defaults = FallbackConfig::default();
        let fallback = FallbackConfig {
            api_key: std::env::var("OPENROUTER_API_KEY").ok(),
            model: std::env::var("FALLBACK_MODEL").unwrap_or(defaults.model),
            timeout: Duration::from_secs(parse_env("FALLBACK_TIMEOUT_SECS", 30u64)?),
            max_retries: parse_env("FALLBACK_MAX_RETRIES", 0u32)?,
            ..defaults
        };

        Ok(Self {
            host,
            port,
            store,
            database_path,
            fallback,
        })
    }

    /// Create an in-memory config without a remote fallback (useful for testing).
    pub fn new() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5001,
            store: TaskStoreType::Memory,
            database_path: PathBuf::from("todos.db"),
            fallback: FallbackConfig::default(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_env<T>(name: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e: T::Err| ConfigError::InvalidValue(name.to_string(), e.to_string())),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_disabled_without_key() {
        let config = Config::new();
        assert!(!config.fallback.is_enabled());

        let blank = FallbackConfig {
            api_key: Some("  ".to_string()),
            ..FallbackConfig::default()
        };
        assert!(!blank.is_enabled());
    }

    #[test]
    fn test_parse_env_reports_invalid_value() {
        std::env::set_var("TASKTALK_TEST_BAD_PORT", "not-a-port");
        let err = parse_env("TASKTALK_TEST_BAD_PORT", 0u16).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(ref name, _) if name == "TASKTALK_TEST_BAD_PORT"));
        std::env::remove_var("TASKTALK_TEST_BAD_PORT");
    }

    #[test]
    fn test_parse_env_default_when_unset() {
        assert_eq!(parse_env("TASKTALK_TEST_UNSET_VAR", 42u64).unwrap(), 42);
    }
}
