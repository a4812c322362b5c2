//! Specification generation from a free-text project description.

use std::sync::Arc;

use crate::errors::PhaseError;
use crate::extract::extract_object;
use crate::model::Specification;
use crate::provider::{AiProvider, Message};

use super::{optional_field, require_field};

const INITIAL_VERSION: u32 = 1;

const SPECIFY_ROLE: &str =
    "You are a product specification expert. Generate a detailed specification.";

const SPECIFY_OUTPUT_FORMAT: &str = "Output JSON with keys: problem_statement, target_users (array), user_journeys (array of objects with journey and steps), success_criteria (array), constraints (array)";

/// Turns a project description into a [`Specification`].
pub struct SpecifyPhase {
    provider: Arc<dyn AiProvider>,
}

impl SpecifyPhase {
    pub fn new(provider: Arc<dyn AiProvider>) -> Self {
        Self { provider }
    }

    /// Generate a specification from a description.
    ///
    /// `raw_description` is always the verbatim input; `constraints` may be
    /// omitted by the backend and defaults to empty. The other four keys
    /// are required.
    pub async fn generate_spec(&self, description: &str) -> Result<Specification, PhaseError> {
        let prompt =
            format!("{SPECIFY_ROLE}\n\nDescription: {description}\n\n{SPECIFY_OUTPUT_FORMAT}");

        let response = self.provider.generate(&[Message::user(prompt)]).await?;
        let value = extract_object(&response)?;

        Ok(Specification {
            problem_statement: require_field(&value, "problem_statement")?,
            target_users: require_field(&value, "target_users")?,
            user_journeys: require_field(&value, "user_journeys")?,
            success_criteria: require_field(&value, "success_criteria")?,
            constraints: optional_field(&value, "constraints")?,
            raw_description: description.to_string(),
            version: INITIAL_VERSION,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use crate::errors::ProviderError;

    struct CannedProvider {
        response: String,
    }

    #[async_trait]
    impl AiProvider for CannedProvider {
        fn name(&self) -> &str {
            "canned"
        }

        async fn generate(&self, _messages: &[Message]) -> Result<String, ProviderError> {
            Ok(self.response.clone())
        }
    }

    fn phase(response: &str) -> SpecifyPhase {
        SpecifyPhase::new(Arc::new(CannedProvider {
            response: response.to_string(),
        }))
    }

    const TODO_RESPONSE: &str = r#"{"problem_statement":"Manage todos","target_users":["individuals"],"user_journeys":[],"success_criteria":["user can add a todo"],"constraints":[]}"#;

    #[tokio::test]
    async fn test_generate_spec_maps_fields() {
        let spec = phase(TODO_RESPONSE)
            .generate_spec("Build a todo app")
            .await
            .unwrap();

        assert_eq!(spec.problem_statement, "Manage todos");
        assert_eq!(spec.target_users, vec!["individuals"]);
        assert_eq!(spec.success_criteria, vec!["user can add a todo"]);
        assert_eq!(spec.raw_description, "Build a todo app");
        assert_eq!(spec.version, 1);
    }

    #[tokio::test]
    async fn test_generate_spec_defaults_missing_constraints() {
        let response = r#"{"problem_statement":"p","target_users":[],"user_journeys":[],"success_criteria":[]}"#;
        let spec = phase(response).generate_spec("desc").await.unwrap();
        assert!(spec.constraints.is_empty());
    }

    #[tokio::test]
    async fn test_generate_spec_missing_required_fields() {
        for missing in [
            "problem_statement",
            "target_users",
            "user_journeys",
            "success_criteria",
        ] {
            let mut value: serde_json::Value = serde_json::from_str(TODO_RESPONSE).unwrap();
            value.as_object_mut().unwrap().remove(missing);

            let err = phase(&value.to_string())
                .generate_spec("desc")
                .await
                .unwrap_err();
            match err {
                PhaseError::MissingField { field } => assert_eq!(field, missing),
                other => panic!("Expected MissingField for {missing}, got {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn test_generate_spec_accepts_prose_wrapped_json() {
        let response = format!("Here is your specification:\n\n{TODO_RESPONSE}\n\nEnjoy!");
        let spec = phase(&response).generate_spec("Build a todo app").await.unwrap();
        assert_eq!(spec.problem_statement, "Manage todos");
    }

    #[tokio::test]
    async fn test_generate_spec_malformed_response() {
        let err = phase("I could not produce JSON, sorry.")
            .generate_spec("desc")
            .await
            .unwrap_err();
        assert!(matches!(err, PhaseError::Malformed(_)));
    }
}
