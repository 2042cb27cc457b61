#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! The deploy-to-grading stage sequence.
//!
//! Stages run in the strict order [`plan`] returns, with no branching, no
//! parallelism, and no retries: the first failing stage aborts the run and
//! later stages never execute.

/// Results collection and archive writing.
pub mod artifact;
/// Due-date checkout and revert.
pub mod checkout;
/// Metric result evaluation.
pub mod evaluate;
/// Metric resolution and execution.
pub mod metrics;
/// Template repository override.
pub mod overlay;
/// Score and summary types.
pub mod results;

use std::fmt::Display;

use anyhow::{Context, Result};

pub use metrics::{MetricCommand, MetricError};
pub use results::{MetricScore, RunSummary, Score, TaskResult};

use crate::{assignment::Assignment, runtime};

/// One stage of a full run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stage {
    /// Verify the Java runtime and git are provisioned.
    Provision,
    /// Pin the submission to the last commit before the due date.
    Checkout,
    /// Restore grading-critical files from the template repository.
    Override,
    /// Run and evaluate the metrics of one task.
    Task(String),
    /// Collect results, write the artifact, show the score table.
    Present,
    /// Restore the ref that was checked out before pinning.
    Revert,
}

impl Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Provision => write!(f, "verifying toolchain"),
            Stage::Checkout => write!(f, "checking out due date"),
            Stage::Override => write!(f, "overriding repository"),
            Stage::Task(name) => write!(f, "evaluating task {name}"),
            Stage::Present => write!(f, "presenting results"),
            Stage::Revert => write!(f, "reverting checkout"),
        }
    }
}

/// Returns the invariant stage order for the given assignment.
///
/// Provisioning always comes first, tasks keep their configured order, and
/// presentation follows every task.
pub fn plan(config: &crate::assignment::AssignmentConfig) -> Vec<Stage> {
    let mut stages = vec![Stage::Provision, Stage::Checkout, Stage::Override];
    stages.extend(config.tasks().iter().cloned().map(Stage::Task));
    stages.push(Stage::Present);
    stages.push(Stage::Revert);
    stages
}

/// Executes the full deploy-to-grading sequence for one assignment.
pub struct Pipeline {
    /// The discovered assignment workspace.
    assignment: Assignment,
}

impl Pipeline {
    /// Builds a pipeline over a discovered assignment.
    pub fn new(assignment: Assignment) -> Self {
        Self { assignment }
    }

    /// Returns the assignment the pipeline runs over.
    pub fn assignment(&self) -> &Assignment {
        &self.assignment
    }

    /// Runs every stage of [`plan`] in order, failing fast.
    pub async fn run(&self) -> Result<RunSummary> {
        let mut pinned: Option<checkout::Checkout> = None;
        let mut results: Vec<TaskResult> = Vec::new();
        let mut summary: Option<RunSummary> = None;

        for stage in plan(self.assignment.config()) {
            tracing::info!("{stage}");
            match stage {
                Stage::Provision => {
                    runtime::provision().await?;
                }
                Stage::Checkout => {
                    let checkout = checkout::pin_to_due_date(
                        self.assignment.paths().root_dir(),
                        self.assignment.config().due_date(),
                    )
                    .await?;
                    pinned = Some(checkout);
                }
                Stage::Override => {
                    overlay::apply(&self.assignment).await?;
                }
                Stage::Task(name) => {
                    let task = self
                        .assignment
                        .load_task(&name)
                        .with_context(|| format!("task `{name}` failed to load"))?;
                    metrics::run_all(&self.assignment, &task).await?;
                    results.push(evaluate::evaluate_task(&self.assignment, &task)?);
                }
                Stage::Present => {
                    let commit = pinned
                        .as_ref()
                        .map(|checkout| checkout.pinned_commit().to_string());
                    summary = Some(artifact::present(&self.assignment, &results, commit)?);
                }
                Stage::Revert => {
                    if let Some(checkout) = pinned.take() {
                        checkout.revert().await?;
                    }
                }
            }
        }

        summary.context("the run produced no summary")
    }
}
