//! Domain records produced by the pipeline phases.
//!
//! All records are immutable after construction except [`Task::status`],
//! which the orchestrator updates in place as tasks are implemented. Field
//! order in the structs is the field order of the persisted artifacts.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// User-centric specification generated from a project description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Specification {
    pub problem_statement: String,
    pub target_users: Vec<String>,
    /// Free-form journey records (journey name plus ordered steps).
    pub user_journeys: Vec<Value>,
    pub success_criteria: Vec<String>,
    #[serde(default)]
    pub constraints: Vec<String>,
    /// The verbatim description this specification was generated from.
    pub raw_description: String,
    pub version: u32,
}

/// Technical architecture plan derived from a specification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechnicalPlan {
    pub architecture: String,
    pub tech_stack: BTreeMap<String, String>,
    pub components: Vec<Value>,
    pub data_models: Vec<Value>,
    pub api_design: Value,
    pub infrastructure: Value,
    pub dependencies: Vec<String>,
    pub alternatives: Vec<Value>,
}

/// Lifecycle state of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    #[default]
    Pending,
    Completed,
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskStatus::Pending => write!(f, "pending"),
            TaskStatus::Completed => write!(f, "completed"),
        }
    }
}

/// Atomic unit of implementation work.
///
/// Dependencies may reference ids that appear later in the list or not at
/// all; no cycle check is performed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub description: String,
    pub acceptance_criteria: Vec<String>,
    pub dependencies: Vec<String>,
    pub estimated_complexity: String,
    pub files_to_modify: Vec<String>,
    pub test_plan: String,
    #[serde(default)]
    pub status: TaskStatus,
}

/// Result of implementing a single task.
///
/// The implementation payload is narrative guidance from the backend; it
/// is never parsed, applied, or executed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskOutcome {
    pub task_id: String,
    pub status: TaskStatus,
    pub implementation: String,
}

/// Aggregate result of one complete workflow run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkflowOutcome {
    pub specification: Specification,
    pub plan: TechnicalPlan,
    pub tasks: Vec<Task>,
}
