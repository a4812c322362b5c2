//! Sequencing and state threading for the four-phase pipeline.
//!
//! One `run` moves strictly forward: Specify → Plan → Tasks → Implement.
//! Each phase's output is persisted as a JSON artifact before the next
//! phase starts, so a failed run leaves the completed phases' artifacts on
//! disk. There is no transition back and no branching; the first phase
//! failure aborts the run, naming the phase.

mod artifacts;

pub use artifacts::ArtifactStore;

use std::fs;
use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value, json};
use tokio::sync::watch;
use tracing::info;
use uuid::Uuid;

use crate::config::Config;
use crate::errors::{ConfigError, PhaseError, PhaseKind, WorkflowError};
use crate::model::{TaskStatus, WorkflowOutcome};
use crate::phases::{ImplementPhase, PlanPhase, SpecifyPhase, TasksPhase};
use crate::provider::{self, AiProvider};

/// Metadata about one completed run, persisted beside the phase artifacts.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub description: String,
    pub provider: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub task_count: usize,
    pub completed_count: usize,
}

/// Drives the pipeline and owns the in-memory records for the duration of
/// one run.
pub struct Orchestrator {
    config: Config,
    provider_name: String,
    specify: SpecifyPhase,
    plan: PlanPhase,
    tasks: TasksPhase,
    implement: ImplementPhase,
    artifacts: ArtifactStore,
}

impl Orchestrator {
    /// Build an orchestrator from configuration.
    ///
    /// Fails before any phase runs if `default_provider` names no
    /// configured provider record, or names a provider family there is no
    /// client for.
    pub fn new(config: Config) -> Result<Self, ConfigError> {
        let provider_config = config.default_provider_config()?;
        let provider = provider::from_config(provider_config)?;
        Ok(Self::with_provider(config, provider))
    }

    /// Build an orchestrator around an explicit provider instance.
    pub fn with_provider(config: Config, provider: Arc<dyn AiProvider>) -> Self {
        let artifacts = ArtifactStore::new(config.artifacts_dir.clone());
        Self {
            provider_name: provider.name().to_string(),
            specify: SpecifyPhase::new(Arc::clone(&provider)),
            plan: PlanPhase::new(Arc::clone(&provider)),
            tasks: TasksPhase::new(Arc::clone(&provider)),
            implement: ImplementPhase::new(provider),
            artifacts,
            config,
        }
    }

    pub fn artifacts(&self) -> &ArtifactStore {
        &self.artifacts
    }

    /// Create the workspace and artifacts directories.
    pub fn start(&self) -> Result<(), WorkflowError> {
        fs::create_dir_all(&self.config.workspace_dir).map_err(|source| {
            WorkflowError::Workspace {
                path: self.config.workspace_dir.clone(),
                source,
            }
        })?;
        self.artifacts.ensure_dir()?;
        info!(
            workspace = %self.config.workspace_dir.display(),
            artifacts = %self.artifacts.dir().display(),
            "workspace ready"
        );
        Ok(())
    }

    /// Run the complete workflow for a description.
    pub async fn run(
        &self,
        description: &str,
        tech_preferences: Option<Map<String, Value>>,
    ) -> Result<WorkflowOutcome, WorkflowError> {
        let (_tx, rx) = watch::channel(false);
        self.run_cancellable(description, tech_preferences, rx).await
    }

    /// Run the complete workflow, honoring a cancellation signal.
    ///
    /// Flipping the watch value to `true` aborts the run at the next phase
    /// boundary or mid-call: the in-flight backend request is dropped and
    /// the run fails with [`WorkflowError::Cancelled`]. Artifacts already
    /// written stay on disk.
    pub async fn run_cancellable(
        &self,
        description: &str,
        tech_preferences: Option<Map<String, Value>>,
        cancel: watch::Receiver<bool>,
    ) -> Result<WorkflowOutcome, WorkflowError> {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        info!(%run_id, provider = %self.provider_name, "workflow starting");

        info!("phase 1/4: generating specification");
        let spec = self
            .phase(
                PhaseKind::Specify,
                cancel.clone(),
                self.specify.generate_spec(description),
            )
            .await?;
        self.artifacts.save("specification", &spec)?;
        info!(problem = %spec.problem_statement, "specification complete");

        info!("phase 2/4: creating technical plan");
        let plan = self
            .phase(
                PhaseKind::Plan,
                cancel.clone(),
                self.plan.generate_plan(&spec, tech_preferences.as_ref()),
            )
            .await?;
        self.artifacts.save("plan", &plan)?;
        info!(architecture = %plan.architecture, "plan complete");

        info!("phase 3/4: breaking down into tasks");
        let mut tasks = self
            .phase(
                PhaseKind::Tasks,
                cancel.clone(),
                self.tasks.generate_tasks(&spec, &plan),
            )
            .await?;
        self.artifacts.save("tasks", &tasks)?;
        info!(count = tasks.len(), "task breakdown complete");

        info!("phase 4/4: implementing tasks");
        let context = json!({ "spec": &spec, "plan": &plan });
        let total = tasks.len();
        let mut outcomes = Vec::with_capacity(total);
        for (i, task) in tasks.iter_mut().enumerate() {
            info!(task_id = %task.id, "[{}/{}] {}", i + 1, total, task.title);
            let outcome = self
                .phase(
                    PhaseKind::Implement,
                    cancel.clone(),
                    self.implement.implement_task(task, &context),
                )
                .await?;
            task.status = outcome.status;
            outcomes.push(outcome);
        }
        self.artifacts.save("outcomes", &outcomes)?;

        let summary = RunSummary {
            run_id,
            description: description.to_string(),
            provider: self.provider_name.clone(),
            started_at,
            finished_at: Utc::now(),
            task_count: total,
            completed_count: tasks
                .iter()
                .filter(|t| t.status == TaskStatus::Completed)
                .count(),
        };
        self.artifacts.save("run", &summary)?;
        info!(%run_id, "workflow complete");

        Ok(WorkflowOutcome {
            specification: spec,
            plan,
            tasks,
        })
    }

    /// Run one phase future, racing it against the cancellation signal.
    /// Dropping the future aborts any in-flight backend call.
    async fn phase<T>(
        &self,
        kind: PhaseKind,
        cancel: watch::Receiver<bool>,
        fut: impl Future<Output = Result<T, PhaseError>>,
    ) -> Result<T, WorkflowError> {
        tokio::select! {
            biased;
            _ = cancelled(cancel) => Err(WorkflowError::Cancelled),
            result = fut => result.map_err(|source| WorkflowError::Phase { phase: kind, source }),
        }
    }
}

/// Resolves once the watch value turns `true`; pends forever if the sender
/// is dropped without cancelling.
async fn cancelled(mut cancel: watch::Receiver<bool>) {
    loop {
        if *cancel.borrow() {
            return;
        }
        if cancel.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}
