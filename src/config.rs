//! Configuration for the crucible pipeline.
//!
//! Read from a JSON file (`crucible.json` by default):
//!
//! ```json
//! {
//!   "project_root": "/path/to/project",
//!   "default_provider": "anthropic",
//!   "workspace_dir": "./workspace",
//!   "artifacts_dir": "./artifacts",
//!   "ai_providers": [
//!     {
//!       "provider": "anthropic",
//!       "model": "claude-sonnet-4-5-20250929",
//!       "temperature": 0.7,
//!       "max_tokens": 4096
//!     }
//!   ],
//!   "tool_servers": [
//!     { "name": "filesystem", "command": "npx", "args": ["-y", "@modelcontextprotocol/server-filesystem", "."] }
//!   ]
//! }
//! ```
//!
//! API keys may be omitted from the file; each provider falls back to its
//! environment variable (`ANTHROPIC_API_KEY`, `OPENAI_API_KEY`).

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

/// Declaration of an auxiliary tool server.
///
/// These are declared for the surrounding tooling; the pipeline itself
/// never launches them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolServerConfig {
    pub name: String,
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub env: BTreeMap<String, String>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

/// Connection settings for one AI provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Provider family: "anthropic" or "openai".
    pub provider: String,
    pub model: String,
    /// API key; falls back to the provider's environment variable when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Endpoint override (e.g. an OpenAI-compatible gateway).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    4096
}

/// Top-level configuration record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub project_root: PathBuf,
    #[serde(default)]
    pub tool_servers: Vec<ToolServerConfig>,
    pub ai_providers: Vec<ProviderConfig>,
    #[serde(default = "default_provider_name")]
    pub default_provider: String,
    #[serde(default = "default_workspace_dir")]
    pub workspace_dir: PathBuf,
    #[serde(default = "default_artifacts_dir")]
    pub artifacts_dir: PathBuf,
}

fn default_provider_name() -> String {
    "anthropic".to_string()
}

fn default_workspace_dir() -> PathBuf {
    PathBuf::from("./workspace")
}

fn default_artifacts_dir() -> PathBuf {
    PathBuf::from("./artifacts")
}

impl Config {
    /// Load configuration from a JSON file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Save configuration as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Create the default configuration for a project root: an Anthropic
    /// provider (credentials from the environment) and the stock tool
    /// server declarations.
    pub fn create_default(project_root: &Path) -> Self {
        let root = project_root.to_string_lossy().to_string();
        Self {
            project_root: project_root.to_path_buf(),
            tool_servers: vec![
                ToolServerConfig {
                    name: "filesystem".to_string(),
                    command: "npx".to_string(),
                    args: vec![
                        "-y".to_string(),
                        "@modelcontextprotocol/server-filesystem".to_string(),
                        root,
                    ],
                    env: BTreeMap::new(),
                    enabled: true,
                },
                ToolServerConfig {
                    name: "git".to_string(),
                    command: "npx".to_string(),
                    args: vec!["-y".to_string(), "@modelcontextprotocol/server-git".to_string()],
                    env: BTreeMap::new(),
                    enabled: true,
                },
                ToolServerConfig {
                    name: "shell".to_string(),
                    command: "npx".to_string(),
                    args: vec![
                        "-y".to_string(),
                        "@modelcontextprotocol/server-shell".to_string(),
                    ],
                    env: BTreeMap::new(),
                    enabled: true,
                },
                ToolServerConfig {
                    name: "memory".to_string(),
                    command: "npx".to_string(),
                    args: vec![
                        "-y".to_string(),
                        "@modelcontextprotocol/server-memory".to_string(),
                    ],
                    env: BTreeMap::new(),
                    enabled: true,
                },
            ],
            ai_providers: vec![ProviderConfig {
                provider: "anthropic".to_string(),
                model: "claude-sonnet-4-5-20250929".to_string(),
                api_key: None,
                base_url: None,
                temperature: default_temperature(),
                max_tokens: default_max_tokens(),
            }],
            default_provider: default_provider_name(),
            workspace_dir: project_root.join("workspace"),
            artifacts_dir: project_root.join("artifacts"),
        }
    }

    /// Look up a provider record by its provider family name.
    pub fn provider(&self, name: &str) -> Option<&ProviderConfig> {
        self.ai_providers.iter().find(|p| p.provider == name)
    }

    /// The provider record selected by `default_provider`.
    pub fn default_provider_config(&self) -> Result<&ProviderConfig, ConfigError> {
        self.provider(&self.default_provider)
            .ok_or_else(|| ConfigError::UnknownProvider(self.default_provider.clone()))
    }
}
