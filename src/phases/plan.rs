//! Technical plan generation from a specification.

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::errors::PhaseError;
use crate::extract::extract_object;
use crate::model::{Specification, TechnicalPlan};
use crate::provider::{AiProvider, Message};

use super::require_field;

const PLAN_ROLE: &str = "You are a software architect. Create a technical plan.";

const PLAN_OUTPUT_FORMAT: &str = "Output JSON with keys: architecture, tech_stack (dict), components (array), data_models (array), api_design (dict), infrastructure (dict), dependencies (array), alternatives (array)";

/// Turns a [`Specification`] into a [`TechnicalPlan`].
pub struct PlanPhase {
    provider: Arc<dyn AiProvider>,
}

impl PlanPhase {
    pub fn new(provider: Arc<dyn AiProvider>) -> Self {
        Self { provider }
    }

    /// Generate a technical plan for a specification, optionally steered by
    /// caller-supplied tech preferences.
    ///
    /// All eight plan fields are required; any absent key fails with
    /// `MissingField` naming it.
    pub async fn generate_plan(
        &self,
        spec: &Specification,
        tech_preferences: Option<&Map<String, Value>>,
    ) -> Result<TechnicalPlan, PhaseError> {
        let spec_json = serde_json::to_string_pretty(spec)?;
        let prefs_json = match tech_preferences {
            Some(prefs) => serde_json::to_string_pretty(prefs)?,
            None => "{}".to_string(),
        };

        let prompt = format!(
            "{PLAN_ROLE}\n\nSpecification: {spec_json}\nTech Preferences: {prefs_json}\n\n{PLAN_OUTPUT_FORMAT}"
        );

        let response = self.provider.generate(&[Message::user(prompt)]).await?;
        let value = extract_object(&response)?;

        Ok(TechnicalPlan {
            architecture: require_field(&value, "architecture")?,
            tech_stack: require_field(&value, "tech_stack")?,
            components: require_field(&value, "components")?,
            data_models: require_field(&value, "data_models")?,
            api_design: require_field(&value, "api_design")?,
            infrastructure: require_field(&value, "infrastructure")?,
            dependencies: require_field(&value, "dependencies")?,
            alternatives: require_field(&value, "alternatives")?,
        })
    }
}
