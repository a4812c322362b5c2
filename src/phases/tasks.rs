//! Task breakdown from a specification and technical plan.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::warn;

use crate::errors::PhaseError;
use crate::extract::extract_array;
use crate::model::{Specification, Task, TechnicalPlan};
use crate::provider::{AiProvider, Message};

use super::require_task_field;

const TASKS_ROLE: &str = "You are a project manager. Break work into atomic tasks.";

const TASKS_OUTPUT_FORMAT: &str = "Output JSON array of tasks with keys: id, title, description, acceptance_criteria (array), dependencies (array), estimated_complexity, files_to_modify (array), test_plan, status";

/// Turns a specification and plan into an ordered list of [`Task`]s.
pub struct TasksPhase {
    provider: Arc<dyn AiProvider>,
}

impl TasksPhase {
    pub fn new(provider: Arc<dyn AiProvider>) -> Self {
        Self { provider }
    }

    /// Generate the task list.
    ///
    /// Backend order is preserved. Every element must carry all nine task
    /// fields; a missing field fails the whole operation, naming the
    /// element index. Duplicate ids and dependency cycles are not rejected.
    pub async fn generate_tasks(
        &self,
        spec: &Specification,
        plan: &TechnicalPlan,
    ) -> Result<Vec<Task>, PhaseError> {
        let spec_json = serde_json::to_string_pretty(spec)?;
        let plan_json = serde_json::to_string_pretty(plan)?;

        let prompt = format!(
            "{TASKS_ROLE}\n\nSpecification: {spec_json}\nPlan: {plan_json}\n\n{TASKS_OUTPUT_FORMAT}"
        );

        let response = self.provider.generate(&[Message::user(prompt)]).await?;
        let items = extract_array(&response)?;

        let mut tasks = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            tasks.push(Task {
                id: require_task_field(item, index, "id")?,
                title: require_task_field(item, index, "title")?,
                description: require_task_field(item, index, "description")?,
                acceptance_criteria: require_task_field(item, index, "acceptance_criteria")?,
                dependencies: require_task_field(item, index, "dependencies")?,
                estimated_complexity: require_task_field(item, index, "estimated_complexity")?,
                files_to_modify: require_task_field(item, index, "files_to_modify")?,
                test_plan: require_task_field(item, index, "test_plan")?,
                status: require_task_field(item, index, "status")?,
            });
        }

        let mut seen = HashSet::new();
        for task in &tasks {
            if !seen.insert(task.id.as_str()) {
                warn!(task_id = %task.id, "duplicate task id in backend response");
            }
        }

        Ok(tasks)
    }
}
