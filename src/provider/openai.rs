//! OpenAI chat-completions client.
//!
//! `base_url` in the provider record points this client at any
//! OpenAI-compatible endpoint (the path `/chat/completions` is appended).

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::ProviderConfig;
use crate::errors::ProviderError;

use super::{AiProvider, Message};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Client for the OpenAI chat-completions API.
pub struct OpenAiProvider {
    config: ProviderConfig,
    api_key: Option<String>,
    client: Client,
}

impl OpenAiProvider {
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
        format!("{base}/chat/completions")
    }
}

/// Request body for the chat-completions API.
#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
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
impl AiProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    async fn generate(&self, messages: &[Message]) -> Result<String, ProviderError> {
        let api_key =
            self.api_key
                .as_deref()
                .ok_or_else(|| ProviderError::MissingCredentials {
                    provider: "openai".to_string(),
                    env_var: API_KEY_ENV.to_string(),
                })?;

        let body = ChatRequest {
            model: &self.config.model,
            messages,
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(api_key)
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

        let parsed: ChatResponse = serde_json::from_str(&text)
            .map_err(|e| transport(format!("unexpected response shape: {e}")))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| transport("response contained no choices".to_string()))
    }
}

fn transport(message: String) -> ProviderError {
    ProviderError::Transport {
        provider: "openai".to_string(),
        message,
    }
}
