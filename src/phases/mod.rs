//! The four pipeline phases.
//!
//! Each phase owns one prompt template and one response-to-record mapping,
//! and depends only on the provider abstraction and the extractor. Field
//! presence is validated explicitly so a missing key fails with an error
//! naming it, not at some later access point.

mod implement;
mod plan;
mod specify;
mod tasks;

pub use implement::ImplementPhase;
pub use plan::PlanPhase;
pub use specify::SpecifyPhase;
pub use tasks::TasksPhase;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::errors::PhaseError;

/// Pull a required field out of a response object.
fn require_field<T: DeserializeOwned>(value: &Value, field: &'static str) -> Result<T, PhaseError> {
    let raw = value
        .get(field)
        .ok_or(PhaseError::MissingField { field })?;
    from_field(raw, field)
}

/// Pull an optional field out of a response object, defaulting when absent.
fn optional_field<T: DeserializeOwned + Default>(
    value: &Value,
    field: &'static str,
) -> Result<T, PhaseError> {
    match value.get(field) {
        Some(raw) => from_field(raw, field),
        None => Ok(T::default()),
    }
}

/// Pull a required field out of one element of a response array.
fn require_task_field<T: DeserializeOwned>(
    value: &Value,
    index: usize,
    field: &'static str,
) -> Result<T, PhaseError> {
    let raw = value
        .get(field)
        .ok_or(PhaseError::MissingTaskField { index, field })?;
    from_field(raw, field)
}

fn from_field<T: DeserializeOwned>(raw: &Value, field: &'static str) -> Result<T, PhaseError> {
    serde_json::from_value(raw.clone()).map_err(|e| PhaseError::InvalidField {
        field: field.to_string(),
        reason: e.to_string(),
    })
}
