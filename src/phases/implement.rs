//! Per-task implementation guidance.

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::errors::PhaseError;
use crate::model::{Task, TaskOutcome, TaskStatus};
use crate::provider::{AiProvider, Message};

const IMPLEMENT_ROLE: &str = "You are a software engineer. Implement this task.";

const IMPLEMENT_INSTRUCTION: &str =
    "Provide implementation as text explaining what code to write.";

const PREVIEW_CHARS: usize = 200;

/// Produces implementation guidance for one task at a time.
pub struct ImplementPhase {
    provider: Arc<dyn AiProvider>,
}

impl ImplementPhase {
    pub fn new(provider: Arc<dyn AiProvider>) -> Self {
        Self { provider }
    }

    /// Generate implementation guidance for a task.
    ///
    /// The response text is recorded verbatim as the implementation
    /// payload; nothing is parsed, applied, or executed. The outcome status
    /// is always `Completed` when the generation call succeeds; the call
    /// failing is the only failure path.
    pub async fn implement_task(
        &self,
        task: &Task,
        context: &Value,
    ) -> Result<TaskOutcome, PhaseError> {
        let context_json = serde_json::to_string_pretty(context)?;

        let prompt = format!(
            "{IMPLEMENT_ROLE}\n\nTask: {}\nDescription: {}\nAcceptance Criteria: {}\nFiles: {}\n\nContext: {}\n\n{IMPLEMENT_INSTRUCTION}",
            task.title,
            task.description,
            task.acceptance_criteria.join(", "),
            task.files_to_modify.join(", "),
            context_json,
        );

        let response = self.provider.generate(&[Message::user(prompt)]).await?;

        debug!(
            task_id = %task.id,
            preview = %truncate(&response, PREVIEW_CHARS),
            "implementation generated"
        );

        Ok(TaskOutcome {
            task_id: task.id.clone(),
            status: TaskStatus::Completed,
            implementation: response,
        })
    }
}

fn truncate(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((i, _)) => &text[..i],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    use crate::errors::ProviderError;

    struct RecordingProvider {
        response: Result<String, String>,
        prompts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl AiProvider for RecordingProvider {
        fn name(&self) -> &str {
            "recording"
        }

        async fn generate(&self, messages: &[Message]) -> Result<String, ProviderError> {
            self.prompts
                .lock()
                .unwrap()
                .push(messages[0].content.clone());
            self.response
                .clone()
                .map_err(|message| ProviderError::Transport {
                    provider: "recording".to_string(),
                    message,
                })
        }
    }

    fn test_task() -> Task {
        Task {
            id: "t-1".to_string(),
            title: "Add todo endpoint".to_string(),
            description: "POST /todos creates a todo".to_string(),
            acceptance_criteria: vec!["returns 201".to_string(), "persists todo".to_string()],
            dependencies: vec![],
            estimated_complexity: "medium".to_string(),
            files_to_modify: vec!["src/api.rs".to_string(), "src/store.rs".to_string()],
            test_plan: "integration test".to_string(),
            status: TaskStatus::Pending,
        }
    }

    #[tokio::test]
    async fn test_implement_task_reports_completed() {
        let provider = Arc::new(RecordingProvider {
            response: Ok("Write a handler that ...".to_string()),
            prompts: Mutex::new(Vec::new()),
        });
        let outcome = ImplementPhase::new(Arc::clone(&provider) as Arc<dyn AiProvider>)
            .implement_task(&test_task(), &json!({"spec": {}, "plan": {}}))
            .await
            .unwrap();

        assert_eq!(outcome.task_id, "t-1");
        assert_eq!(outcome.status, TaskStatus::Completed);
        assert_eq!(outcome.implementation, "Write a handler that ...");
    }

    #[tokio::test]
    async fn test_implement_task_prompt_summarizes_task_and_context() {
        let provider = Arc::new(RecordingProvider {
            response: Ok("ok".to_string()),
            prompts: Mutex::new(Vec::new()),
        });
        ImplementPhase::new(Arc::clone(&provider) as Arc<dyn AiProvider>)
            .implement_task(&test_task(), &json!({"spec": {"problem_statement": "Manage todos"}}))
            .await
            .unwrap();

        let prompts = provider.prompts.lock().unwrap();
        assert!(prompts[0].contains("Add todo endpoint"));
        assert!(prompts[0].contains("returns 201, persists todo"));
        assert!(prompts[0].contains("src/api.rs, src/store.rs"));
        assert!(prompts[0].contains("Manage todos"));
    }

    #[tokio::test]
    async fn test_implement_task_generation_failure_propagates() {
        let provider = Arc::new(RecordingProvider {
            response: Err("backend unreachable".to_string()),
            prompts: Mutex::new(Vec::new()),
        });
        let err = ImplementPhase::new(provider)
            .implement_task(&test_task(), &json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, PhaseError::Provider(_)));
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate("héllo wörld", 5), "héllo");
        assert_eq!(truncate("short", 200), "short");
    }
}
