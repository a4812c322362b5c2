//! Anthropic messages-API client.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::ProviderConfig;
use crate::errors::ProviderError;

use super::{AiProvider, Message};

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const API_VERSION: &str = "2023-06-01";
const API_KEY_ENV: &str = "ANTHROPIC_API_KEY";

/// Client for the Anthropic messages API.
pub struct AnthropicProvider {
    config: ProviderConfig,
    api_key: Option<String>,
    client: Client,
}

impl AnthropicProvider {
    /// Create a client from a provider record. A missing API key is not an
    /// error until the first request.
    pub fn new(config: ProviderConfig) -> Self {
        let api_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var(API_KEY_ENV).ok());
        Self {
            config,
            api_key,
            client: Client::new(),
        }
    }

    fn endpoint(&self) -> String {
        let base = self
            .config
            .base_url
            .as_deref()
            .unwrap_or(DEFAULT_BASE_URL)
            .trim_end_matches('/');
        format!("{base}/v1/messages")
    }
}

/// Request body for the messages API.
#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: &'a [Message],
}

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: String,
}

#[derive(Deserialize)]
struct ApiError {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
}

#[async_trait]
impl AiProvider for AnthropicProvider {
    fn name(&self) -> &str {
        "anthropic"
    }

    async fn generate(&self, messages: &[Message]) -> Result<String, ProviderError> {
        let api_key =
            self.api_key
                .as_deref()
                .ok_or_else(|| ProviderError::MissingCredentials {
                    provider: "anthropic".to_string(),
                    env_var: API_KEY_ENV.to_string(),
                })?;

        let body = MessagesRequest {
            model: &self.config.model,
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            messages,
        };

        let response = self
            .client
            .post(self.endpoint())
            .header("x-api-key", api_key)
            .header("anthropic-version", API_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| transport(format!("request failed: {e}")))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| transport(format!("failed to read response: {e}")))?;

        if !status.is_success() {
            let message = serde_json::from_str::<ApiError>(&text)
                .map(|e| e.error.message)
                .unwrap_or(text);
            return Err(transport(format!("HTTP {}: {message}", status.as_u16())));
        }

        let parsed: MessagesResponse = serde_json::from_str(&text)
            .map_err(|e| transport(format!("unexpected response shape: {e}")))?;

        Ok(parsed.content.into_iter().map(|b| b.text).collect())
    }
}

fn transport(message: String) -> ProviderError {
    ProviderError::Transport {
        provider: "anthropic".to_string(),
        message,
    }
}
