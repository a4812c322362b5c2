//! Typed error hierarchy for the crucible pipeline.
//!
//! Three layers cover the three subsystems:
//! - `ProviderError` — generation backend failures
//! - `PhaseError` — response extraction and validation failures
//! - `WorkflowError` — run-level orchestration failures
//!
//! `ConfigError` sits beside them for configuration loading and provider
//! selection. Nothing is retried; every error propagates to the run's
//! caller.

use std::path::PathBuf;

use thiserror::Error;

/// Which JSON shape a phase expects the backend to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonShape {
    Object,
    Array,
}

impl std::fmt::Display for JsonShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JsonShape::Object => write!(f, "object"),
            JsonShape::Array => write!(f, "array"),
        }
    }
}

/// Errors from the generation backend.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("no API key for provider '{provider}': config has none and {env_var} is not set")]
    MissingCredentials { provider: String, env_var: String },

    #[error("{provider} request failed: {message}")]
    Transport { provider: String, message: String },
}

/// The backend output contained no parseable JSON value of the expected
/// shape. Carries the raw response text for diagnosis.
#[derive(Debug, Error)]
#[error("no JSON {expected} found in backend response")]
pub struct MalformedResponse {
    pub expected: JsonShape,
    pub raw: String,
}

/// Errors from a single phase execution.
#[derive(Debug, Error)]
pub enum PhaseError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Malformed(#[from] MalformedResponse),

    #[error("backend response is missing required field '{field}'")]
    MissingField { field: &'static str },

    #[error("task at index {index} is missing required field '{field}'")]
    MissingTaskField { index: usize, field: &'static str },

    #[error("field '{field}' has an unexpected shape: {reason}")]
    InvalidField { field: String, reason: String },

    #[error("failed to serialize prompt context: {0}")]
    Context(#[from] serde_json::Error),
}

/// Identifies which pipeline phase an error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseKind {
    Specify,
    Plan,
    Tasks,
    Implement,
}

impl std::fmt::Display for PhaseKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PhaseKind::Specify => write!(f, "specify"),
            PhaseKind::Plan => write!(f, "plan"),
            PhaseKind::Tasks => write!(f, "tasks"),
            PhaseKind::Implement => write!(f, "implement"),
        }
    }
}

/// Errors from a full workflow run.
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("{phase} phase failed: {source}")]
    Phase {
        phase: PhaseKind,
        #[source]
        source: PhaseError,
    },

    #[error("workflow cancelled before completion")]
    Cancelled,

    #[error("failed to persist artifact '{name}': {source}")]
    Artifact {
        name: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("failed to create directory {path}: {source}")]
    Workspace {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Configuration loading and provider-selection errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to write config file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize configuration: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("default provider '{0}' has no entry in ai_providers")]
    UnknownProvider(String),

    #[error("provider '{0}' is not supported (expected 'anthropic' or 'openai')")]
    UnsupportedProvider(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_error_transport_carries_provider_name() {
        let err = ProviderError::Transport {
            provider: "anthropic".to_string(),
            message: "connection refused".to_string(),
        };
        assert!(err.to_string().contains("anthropic"));
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn malformed_response_names_expected_shape() {
        let err = MalformedResponse {
            expected: JsonShape::Array,
            raw: "not json".to_string(),
        };
        assert!(err.to_string().contains("array"));
        assert_eq!(err.raw, "not json");
    }

    #[test]
    fn phase_error_missing_field_is_matchable() {
        let err = PhaseError::MissingField {
            field: "problem_statement",
        };
        match &err {
            PhaseError::MissingField { field } => assert_eq!(*field, "problem_statement"),
            _ => panic!("Expected MissingField variant"),
        }
        assert!(err.to_string().contains("problem_statement"));
    }

    #[test]
    fn phase_error_missing_task_field_names_index() {
        let err = PhaseError::MissingTaskField {
            index: 0,
            field: "test_plan",
        };
        assert!(err.to_string().contains("index 0"));
        assert!(err.to_string().contains("test_plan"));
    }

    #[test]
    fn phase_error_converts_from_provider_error() {
        let inner = ProviderError::Transport {
            provider: "openai".to_string(),
            message: "timeout".to_string(),
        };
        let phase_err: PhaseError = inner.into();
        assert!(matches!(phase_err, PhaseError::Provider(_)));
    }

    #[test]
    fn workflow_error_phase_names_the_failing_phase() {
        let err = WorkflowError::Phase {
            phase: PhaseKind::Tasks,
            source: PhaseError::MissingField { field: "id" },
        };
        assert!(err.to_string().starts_with("tasks phase failed"));
    }

    #[test]
    fn config_error_unknown_provider_carries_name() {
        let err = ConfigError::UnknownProvider("mistral".to_string());
        assert!(err.to_string().contains("mistral"));
    }

    #[test]
    fn all_error_types_implement_std_error_trait() {
        fn assert_std_error<E: std::error::Error>(_: &E) {}
        assert_std_error(&ProviderError::Transport {
            provider: "x".into(),
            message: "y".into(),
        });
        assert_std_error(&PhaseError::MissingField { field: "f" });
        assert_std_error(&WorkflowError::Cancelled);
        assert_std_error(&ConfigError::UnknownProvider("p".into()));
    }
}
