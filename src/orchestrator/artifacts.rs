//! Persistence of per-phase JSON artifacts.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Serialize;
use tracing::debug;

use crate::errors::WorkflowError;

/// Writes named JSON artifacts into the configured artifacts directory.
///
/// Artifacts are a one-way export for durability and inspection; the
/// pipeline never reads them back.
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create the artifacts directory if it does not exist.
    pub fn ensure_dir(&self) -> Result<(), WorkflowError> {
        fs::create_dir_all(&self.dir).map_err(|source| WorkflowError::Workspace {
            path: self.dir.clone(),
            source,
        })
    }

    /// Serialize `value` as pretty JSON to `<dir>/<name>.json`.
    pub fn save<T: Serialize + ?Sized>(
        &self,
        name: &str,
        value: &T,
    ) -> Result<PathBuf, WorkflowError> {
        let path = self.dir.join(format!("{name}.json"));
        let write = || -> anyhow::Result<()> {
            let content = serde_json::to_string_pretty(value)
                .with_context(|| format!("Failed to serialize artifact '{name}'"))?;
            fs::write(&path, content)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            Ok(())
        };

        write().map_err(|source| WorkflowError::Artifact {
            name: name.to_string(),
            source,
        })?;

        debug!(artifact = name, path = %path.display(), "artifact written");
        Ok(path)
    }
}
