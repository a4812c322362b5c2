//! Abstraction over generation backends.
//!
//! The pipeline talks to exactly one provider per run, selected from
//! configuration at construction time. Each phase issues one isolated
//! single-turn request; no conversation state is carried between calls.

mod anthropic;
mod openai;

pub use anthropic::AnthropicProvider;
pub use openai::OpenAiProvider;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::ProviderConfig;
use crate::errors::{ConfigError, ProviderError};

/// Role of a chat message author.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One role-tagged message in a generation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// A generation backend: takes an ordered message sequence, returns the
/// generated text.
///
/// Real implementations: [`AnthropicProvider`], [`OpenAiProvider`]. Tests
/// use scripted doubles.
#[async_trait]
pub trait AiProvider: Send + Sync {
    /// Provider family name, for diagnostics.
    fn name(&self) -> &str;

    /// Generate a completion for the given messages.
    async fn generate(&self, messages: &[Message]) -> Result<String, ProviderError>;
}

/// Build the provider selected by the given configuration record.
pub fn from_config(config: &ProviderConfig) -> Result<Arc<dyn AiProvider>, ConfigError> {
    match config.provider.as_str() {
        "anthropic" => Ok(Arc::new(AnthropicProvider::new(config.clone()))),
        "openai" => Ok(Arc::new(OpenAiProvider::new(config.clone()))),
        other => Err(ConfigError::UnsupportedProvider(other.to_string())),
    }
}
