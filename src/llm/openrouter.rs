//! OpenRouter API client implementation with optional retry for transient errors.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use super::error::{LlmError, RetryConfig};
use super::{ChatMessage, ChatOptions, ChatResponse, LlmClient, TokenUsage};

const OPENROUTER_API_URL: &str = "https://openrouter.ai/api/v1/chat/completions";

/// OpenRouter API client.
pub struct OpenRouterClient {
    client: Client,
    api_key: String,
    api_url: String,
    retry_config: RetryConfig,
}

impl OpenRouterClient {
    /// Create a new OpenRouter client that makes a single attempt per request.
    pub fn new(api_key: String) -> Self {
        Self::with_retry_config(api_key, RetryConfig::default())
    }

    /// Create a new OpenRouter client with custom retry configuration.
    pub fn with_retry_config(api_key: String, retry_config: RetryConfig) -> Self {
        Self {
            client: Client::new(),
            api_key,
            api_url: OPENROUTER_API_URL.to_string(),
            retry_config,
        }
    }

    /// Point the client at another OpenAI-compatible endpoint.
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    fn parse_retry_after(headers: &reqwest::header::HeaderMap) -> Option<Duration> {
        headers
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.trim().parse::<u64>().ok())
            .map(Duration::from_secs)
    }

    /// Execute a single request without retry.
    async fn execute_request(&self, request: &OpenRouterRequest) -> Result<ChatResponse, LlmError> {
        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .header("X-Title", "tasktalk")
            .json(request)
            .send()
            .await
            .map_err(|e| {
                let what = if e.is_timeout() {
                    "Request timeout"
                } else if e.is_connect() {
                    "Connection failed"
                } else {
                    "Request failed"
                };
                LlmError::network_error(format!("{}: {}", what, e))
            })?;

        let status = response.status();
        let retry_after = Self::parse_retry_after(response.headers());
        let body = response.text().await.unwrap_or_default();

        if !status.is_success() {
            return Err(LlmError::from_status(status.as_u16(), body, retry_after));
        }

        let parsed: OpenRouterResponse = serde_json::from_str(&body).map_err(|e| {
            LlmError::parse_error(format!("Failed to parse response: {}, body: {}", e, body))
        })?;

        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::parse_error("No choices in response".to_string()))?;

        Ok(ChatResponse {
            content: choice.message.content,
            finish_reason: choice.finish_reason,
            usage: parsed
                .usage
                .map(|u| TokenUsage::new(u.prompt_tokens, u.completion_tokens)),
            model: parsed.model.or_else(|| Some(request.model.clone())),
        })
    }

    /// Execute a request, retrying transient errors as allowed by the retry config.
    async fn execute_with_retry(
        &self,
        request: &OpenRouterRequest,
    ) -> anyhow::Result<ChatResponse> {
        let start = Instant::now();
        let mut attempt = 0;

        loop {
            let error = match self.execute_request(request).await {
                Ok(response) => {
                    if attempt > 0 {
                        tracing::info!(
                            "Request succeeded after {} retries (total time: {:?})",
                            attempt,
                            start.elapsed()
                        );
                    }
                    return Ok(response);
                }
                Err(error) => error,
            };

            if !self.retry_config.should_retry(&error, attempt) {
                tracing::warn!("Model request failed after {} retries: {}", attempt, error);
                return Err(error.into());
            }

            let remaining = self
                .retry_config
                .max_retry_duration
                .saturating_sub(start.elapsed());
            let delay = error.suggested_delay(attempt).min(remaining);
            if delay.is_zero() {
                tracing::warn!("Retry budget exhausted: {}", error);
                return Err(error.into());
            }

            tracing::warn!(
                "Retry attempt {} failed with {}, retrying in {:?}",
                attempt + 1,
                error.kind,
                delay
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}

#[async_trait]
impl LlmClient for OpenRouterClient {
    async fn chat_completion(
        &self,
        model: &str,
        messages: &[ChatMessage],
    ) -> anyhow::Result<ChatResponse> {
        self.chat_completion_with_options(model, messages, ChatOptions::default())
            .await
    }

    async fn chat_completion_with_options(
        &self,
        model: &str,
        messages: &[ChatMessage],
        options: ChatOptions,
    ) -> anyhow::Result<ChatResponse> {
        let request = OpenRouterRequest {
            model: model.to_string(),
            messages: messages.to_vec(),
            temperature: options.temperature,
            max_tokens: options.max_tokens,
        };

        tracing::debug!("Sending request to OpenRouter: model={}", model);

        self.execute_with_retry(&request).await
    }
}

/// OpenRouter API request format.
#[derive(Debug, Serialize)]
struct OpenRouterRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u64>,
}

/// OpenRouter API response format.
#[derive(Debug, Deserialize)]
struct OpenRouterResponse {
    choices: Vec<OpenRouterChoice>,
    #[serde(default)]
    usage: Option<OpenRouterUsage>,
    #[serde(default)]
    model: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenRouterChoice {
    message: OpenRouterMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenRouterMessage {
    content: Option<String>,
}

/// Usage data (OpenAI-compatible).
#[derive(Debug, Deserialize)]
struct OpenRouterUsage {
    prompt_tokens: u64,
    completion_tokens: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_omits_unset_options() {
        let request = OpenRouterRequest {
            model: "anthropic/claude-3-haiku".to_string(),
            messages: vec![ChatMessage::user("hi")],
            temperature: Some(0.1),
            max_tokens: None,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["temperature"], 0.1);
        assert!(json.get("max_tokens").is_none());
    }

    #[test]
    fn test_response_parses_minimal_body() {
        let body = r#"{"choices":[{"message":{"content":"{}"},"finish_reason":"stop"}]}"#;
        let parsed: OpenRouterResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.choices[0].message.content.as_deref(), Some("{}"));
        assert!(parsed.usage.is_none());
    }

    #[test]
    fn test_response_usage_and_model() {
        let body = r#"{"model":"m","choices":[{"message":{"content":"{}"},"finish_reason":"stop"}],"usage":{"prompt_tokens":120,"completion_tokens":18}}"#;
        let parsed: OpenRouterResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.model.as_deref(), Some("m"));
        let usage = parsed.usage.map(|u| TokenUsage::new(u.prompt_tokens, u.completion_tokens));
        assert_eq!(usage.map(|u| u.total_tokens), Some(138));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_network_error() {
        let client = OpenRouterClient::new("key".to_string())
            .with_api_url("http://127.0.0.1:9/v1/chat/completions");
        let err = client
            .chat_completion("m", &[ChatMessage::user("hi")])
            .await
            .unwrap_err();
        let llm_err = err.downcast_ref::<LlmError>().unwrap();
        assert_eq!(llm_err.kind, super::super::LlmErrorKind::NetworkError);
    }
}
