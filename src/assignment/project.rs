#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Assignment workspace discovery and inspection.

use std::path::Path;

use anyhow::{Context, Result};
use itertools::Itertools;
use serde_json::json;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Rows},
};

use super::{
    config::{AssignmentConfig, ConfigError, TaskConfig},
    paths::WorkspacePaths,
};
use crate::{constants::TASK_FILE_NAME, util::find_files};

/// A discovered assignment workspace: resolved paths plus the parsed
/// assignment configuration.
#[derive(Debug, Clone)]
pub struct Assignment {
    /// Resolved workspace paths.
    paths:  WorkspacePaths,
    /// Parsed `assignment.yml`.
    config: AssignmentConfig,
}

/// One row of the `check` summary table.
#[derive(Tabled)]
struct TaskRow {
    /// Task directory name.
    #[tabled(rename = "Task")]
    task:    String,
    /// Space-joined metric names.
    #[tabled(rename = "Metrics")]
    metrics: String,
    /// Total points allocated across metrics.
    #[tabled(rename = "Points")]
    points:  String,
    /// Validation remarks.
    #[tabled(rename = "Note")]
    note:    String,
}

impl Assignment {
    /// Discovers the assignment rooted at `root` by parsing its
    /// `assignment.yml`.
    pub fn discover(root: &Path) -> Result<Self> {
        let root = root
            .canonicalize()
            .with_context(|| format!("no workspace at {}", root.display()))?;
        Self::from_paths(WorkspacePaths::new(root))
    }

    /// Builds an assignment from pre-resolved workspace paths.
    pub fn from_paths(paths: WorkspacePaths) -> Result<Self> {
        let config = AssignmentConfig::load(&paths.assignment_file())?;
        Ok(Self { paths, config })
    }

    /// Returns the resolved workspace paths.
    pub fn paths(&self) -> &WorkspacePaths {
        &self.paths
    }

    /// Returns the parsed assignment configuration.
    pub fn config(&self) -> &AssignmentConfig {
        &self.config
    }

    /// Returns the configured display name, falling back to the workspace
    /// directory name.
    pub fn display_name(&self) -> String {
        if let Some(name) = self.config.name() {
            return name.to_string();
        }
        self.paths
            .root_dir()
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "assignment".to_string())
    }

    /// Loads the configuration of the named task.
    ///
    /// Tasks are loaded on demand so the repository override stage can
    /// restore `task.yml` before it is read.
    pub fn load_task(&self, name: &str) -> Result<TaskConfig, ConfigError> {
        TaskConfig::load(&self.paths.task_dir(name), name)
    }

    /// Loads every configured task in grading order.
    pub fn load_tasks(&self) -> Result<Vec<TaskConfig>> {
        self.config
            .tasks()
            .iter()
            .map(|name| {
                self.load_task(name)
                    .with_context(|| format!("task `{name}` failed to load"))
            })
            .collect()
    }

    /// Returns `task.yml` files on disk that are not in the configured task
    /// list.
    pub fn unlisted_task_files(&self) -> Result<Vec<std::path::PathBuf>> {
        let listed: Vec<_> = self
            .config
            .tasks()
            .iter()
            .map(|name| self.paths.task_file(name))
            .collect();

        Ok(find_files(TASK_FILE_NAME, 1, self.paths.root_dir())?
            .into_iter()
            .filter(|path| !listed.contains(path))
            .collect())
    }

    /// Prints a JSON description of the assignment as parsed.
    pub fn info(&self) -> Result<()> {
        let tasks: Vec<_> = self
            .config
            .tasks()
            .iter()
            .map(|name| match self.load_task(name) {
                Ok(task) => json!({
                    "name": name,
                    "metrics": task.metrics(),
                    "points": task
                        .metrics()
                        .iter()
                        .filter_map(|m| task.points_for(m).map(|p| (m.clone(), p)))
                        .collect::<std::collections::BTreeMap<_, _>>(),
                }),
                Err(error) => json!({ "name": name, "error": error.to_string() }),
            })
            .collect();

        let description = json!({
            "name": self.display_name(),
            "due_date": self.config.due_date_raw(),
            "template_repository": self.config.template_repository(),
            "root": self.paths.root_dir(),
            "tasks": tasks,
        });
        println!("{}", serde_json::to_string(&description)?);
        Ok(())
    }

    /// Renders the `check` summary table for every configured task.
    pub fn check_table(&self) -> String {
        let rows: Vec<TaskRow> = self
            .config
            .tasks()
            .iter()
            .map(|name| match self.load_task(name) {
                Ok(task) => {
                    let total: f64 = task
                        .metrics()
                        .iter()
                        .filter_map(|m| task.points_for(m))
                        .sum();
                    TaskRow {
                        task:    name.clone(),
                        metrics: task.metrics().iter().join(" "),
                        points:  format!("{total:.2}"),
                        note:    String::new(),
                    }
                }
                Err(error) => TaskRow {
                    task:    name.clone(),
                    metrics: String::new(),
                    points:  "-".to_string(),
                    note:    error.to_string(),
                },
            })
            .collect();

        Table::new(rows)
            .with(Style::modern())
            .with(Modify::new(Rows::new(1..)).with(Alignment::left()))
            .to_string()
    }
}
