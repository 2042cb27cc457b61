#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Workspace path configuration for an assignment checkout.

use std::path::{Path, PathBuf};

use bon::builder;
use serde::{Deserialize, Serialize};

use crate::constants::{
    ARTIFACT_NAME, ASSIGNMENT_FILE_NAME, RESULTS_DIR, TASK_FILE_NAME, TASK_RESULTS_DIR,
};

/// Represents standard workspace paths for an assignment checkout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspacePaths {
    /// Root directory of the assignment workspace.
    root_dir:    PathBuf,
    /// `results/` directory published as the artifact.
    results_dir: PathBuf,
    /// Per-task subdirectory where metrics leave result files.
    task_results: PathBuf,
}

impl WorkspacePaths {
    /// Creates a new set of workspace paths rooted at `root_dir`.
    pub fn new(root_dir: PathBuf) -> Self {
        Self::build_with_defaults(root_dir, None, None)
    }

    /// Construct paths from optional overrides.
    pub fn from_parts(
        root_dir: PathBuf,
        results_dir: Option<PathBuf>,
        task_results: Option<PathBuf>,
    ) -> Self {
        Self::build_with_defaults(root_dir, results_dir, task_results)
    }

    /// Root directory of the workspace.
    pub fn root_dir(&self) -> &Path {
        self.root_dir.as_path()
    }

    /// Results directory published as the artifact.
    pub fn results_dir(&self) -> &Path {
        self.results_dir.as_path()
    }

    /// Path of the assignment configuration file.
    pub fn assignment_file(&self) -> PathBuf {
        self.root_dir.join(ASSIGNMENT_FILE_NAME)
    }

    /// Directory of the named task.
    pub fn task_dir(&self, task: &str) -> PathBuf {
        self.root_dir.join(task)
    }

    /// Path of the named task's configuration file.
    pub fn task_file(&self, task: &str) -> PathBuf {
        self.task_dir(task).join(TASK_FILE_NAME)
    }

    /// Directory where the named task's metrics leave result files.
    pub fn task_results_dir(&self, task: &str) -> PathBuf {
        self.task_dir(task).join(&self.task_results)
    }

    /// Path of the results archive inside the results directory.
    pub fn artifact_path(&self) -> PathBuf {
        self.results_dir.join(format!("{ARTIFACT_NAME}.zip"))
    }

    /// Centralized constructor that applies standard defaults when overrides
    /// are absent.
    fn build_with_defaults(
        root_dir: PathBuf,
        results_dir: Option<PathBuf>,
        task_results: Option<PathBuf>,
    ) -> Self {
        let results_dir = results_dir.unwrap_or_else(|| root_dir.join(RESULTS_DIR));
        let task_results = task_results.unwrap_or_else(|| PathBuf::from(TASK_RESULTS_DIR));

        Self {
            root_dir,
            results_dir,
            task_results,
        }
    }
}

impl Default for WorkspacePaths {
    fn default() -> Self {
        Self::new(PathBuf::from("."))
    }
}

/// Builder-friendly constructor for `WorkspacePaths` with optional overrides.
#[builder(finish_fn = build)]
pub fn workspace_paths(
    #[builder(into)] root_dir: PathBuf,
    results_dir: Option<PathBuf>,
    task_results: Option<PathBuf>,
) -> WorkspacePaths {
    WorkspacePaths::build_with_defaults(root_dir, results_dir, task_results)
}
