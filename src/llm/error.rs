//! LLM error types with retry classification.
//!
//! Transient errors (rate limits, 5xx, network) may be retried; everything
//! else fails the request immediately.

use std::time::Duration;
use thiserror::Error;

/// Error from a hosted model call.
#[derive(Debug, Error)]
#[error("{kind}{}: {message}", http_suffix(.status_code))]
pub struct LlmError {
    pub kind: LlmErrorKind,
    pub status_code: Option<u16>,
    pub message: String,
    /// Delay requested by the provider via `Retry-After`
    pub retry_after: Option<Duration>,
}

impl LlmError {
    fn new(kind: LlmErrorKind, status_code: Option<u16>, message: String) -> Self {
        Self {
            kind,
            status_code,
            message,
            retry_after: None,
        }
    }

    /// Build the error for a non-2xx HTTP response.
    pub fn from_status(status_code: u16, message: String, retry_after: Option<Duration>) -> Self {
        let mut err = Self::new(classify_http_status(status_code), Some(status_code), message);
        if err.kind == LlmErrorKind::RateLimited {
            err.retry_after = retry_after;
        }
        err
    }

    pub fn network_error(message: String) -> Self {
        Self::new(LlmErrorKind::NetworkError, None, message)
    }

    pub fn parse_error(message: String) -> Self {
        Self::new(LlmErrorKind::ParseError, None, message)
    }

    pub fn is_transient(&self) -> bool {
        self.kind.is_transient()
    }

    /// Delay before the next attempt: `Retry-After` if given, otherwise
    /// exponential backoff from a per-kind base, capped at 60 seconds.
    pub fn suggested_delay(&self, attempt: u32) -> Duration {
        if let Some(retry_after) = self.retry_after {
            return retry_after;
        }

        let base_secs: u64 = match self.kind {
            LlmErrorKind::RateLimited => 5,
            LlmErrorKind::ServerError => 2,
            _ => 1,
        };

        let delay_secs = base_secs.saturating_mul(2u64.saturating_pow(attempt));
        Duration::from_secs(delay_secs.min(60))
    }
}

fn http_suffix(status_code: &Option<u16>) -> String {
    status_code
        .map(|code| format!(" (HTTP {})", code))
        .unwrap_or_default()
}

/// Classification of LLM errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmErrorKind {
    /// 429
    RateLimited,
    /// 5xx
    ServerError,
    /// Other 4xx (bad request, auth)
    ClientError,
    /// Connection failed or timed out
    NetworkError,
    /// Response body could not be decoded
    ParseError,
}

impl LlmErrorKind {
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            LlmErrorKind::RateLimited | LlmErrorKind::ServerError | LlmErrorKind::NetworkError
        )
    }
}

impl std::fmt::Display for LlmErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            LlmErrorKind::RateLimited => "Rate limited",
            LlmErrorKind::ServerError => "Server error",
            LlmErrorKind::ClientError => "Client error",
            LlmErrorKind::NetworkError => "Network error",
            LlmErrorKind::ParseError => "Parse error",
        };
        f.write_str(label)
    }
}

/// Configuration for retry behavior.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retry attempts (0 = single attempt)
    pub max_retries: u32,
    /// Maximum total time to spend retrying
    pub max_retry_duration: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 0,
            max_retry_duration: Duration::from_secs(30),
        }
    }
}

impl RetryConfig {
    pub fn with_max_retries(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Self::default()
        }
    }

    /// Whether `error` on attempt number `attempt` (0-based) should be retried.
    pub fn should_retry(&self, error: &LlmError, attempt: u32) -> bool {
        error.is_transient() && attempt < self.max_retries
    }
}

/// Parse HTTP status code into error kind.
pub fn classify_http_status(status: u16) -> LlmErrorKind {
    match status {
        429 => LlmErrorKind::RateLimited,
        400..=499 => LlmErrorKind::ClientError,
        _ => LlmErrorKind::ServerError,
    }
}
