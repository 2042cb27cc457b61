#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Metric name resolution and execution.

use std::{
    ffi::OsString,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use thiserror::Error;

use crate::{
    assignment::{Assignment, TaskConfig},
    config,
    constants::{D2G_PATH_VAR, GRADLE_WRAPPER, METRIC_SCRIPTS_DIR},
    process,
    util::truncate_with_notice,
};

/// Maximum stderr length carried inside a [`MetricError::Failed`].
const FAILURE_PREVIEW: usize = 2_000;

/// Errors produced while resolving or running a metric.
#[derive(Debug, Error)]
pub enum MetricError {
    /// Neither a pipeline script nor a Gradle wrapper exists for the metric.
    #[error(
        "metric `{metric}` of task `{task}` resolves to neither a pipeline script nor a Gradle \
         wrapper"
    )]
    Unresolvable {
        /// Metric that failed to resolve.
        metric: String,
        /// Task the metric belongs to.
        task:   String,
    },
    /// The metric command exited non-zero.
    #[error("metric `{metric}` of task `{task}` failed ({status})\n{stderr}")]
    Failed {
        /// Metric that failed.
        metric: String,
        /// Task the metric belongs to.
        task:   String,
        /// Exit code, or `signal` when terminated.
        status: String,
        /// Truncated stderr of the metric command.
        stderr: String,
    },
}

/// Command a metric name resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetricCommand {
    /// A script shipped in the install dir's `scripts/metrics` directory.
    Script(PathBuf),
    /// The task's Gradle wrapper invoked with the metric name.
    Gradle {
        /// Path of the wrapper script.
        wrapper: PathBuf,
        /// Gradle task to invoke.
        task:    String,
    },
}

impl MetricCommand {
    /// Splits the command into the program and its arguments.
    pub fn program_and_args(&self) -> (OsString, Vec<OsString>) {
        match self {
            MetricCommand::Script(path) => (path.clone().into_os_string(), Vec::new()),
            MetricCommand::Gradle { wrapper, task } => (
                wrapper.clone().into_os_string(),
                vec![OsString::from(task)],
            ),
        }
    }
}

/// Resolves a metric name to a runnable command.
///
/// Pipeline scripts win over the Gradle fallback: `<install
/// dir>/scripts/metrics/<metric>.sh` first, then `<metric>.py`, then the
/// task's Gradle wrapper.
pub fn resolve(
    install_dir: &Path,
    task_dir: &Path,
    task: &str,
    metric: &str,
) -> Result<MetricCommand, MetricError> {
    let base = install_dir.join(METRIC_SCRIPTS_DIR);

    let shell = base.join(format!("{metric}.sh"));
    if shell.is_file() {
        return Ok(MetricCommand::Script(shell));
    }
    let python = base.join(format!("{metric}.py"));
    if python.is_file() {
        return Ok(MetricCommand::Script(python));
    }

    let wrapper = task_dir.join(GRADLE_WRAPPER);
    if wrapper.is_file() {
        return Ok(MetricCommand::Gradle {
            wrapper,
            task: metric.to_string(),
        });
    }

    Err(MetricError::Unresolvable {
        metric: metric.to_string(),
        task:   task.to_string(),
    })
}

/// Builds the environment every metric subprocess receives: the absolute
/// install dir under `D2G_PATH`, plus the rendered assignment and task
/// configuration pairs.
pub fn metric_env(
    install_dir: &Path,
    assignment: &Assignment,
    task: &TaskConfig,
) -> Vec<(OsString, OsString)> {
    let mut env = vec![(
        OsString::from(D2G_PATH_VAR),
        install_dir.as_os_str().to_os_string(),
    )];
    env.extend(assignment.config().env_pairs());
    env.extend(task.env_pairs());
    env
}

/// Runs every metric of `task` in configured order, failing fast.
pub async fn run_all(assignment: &Assignment, task: &TaskConfig) -> Result<()> {
    let install_dir = config::install_dir();
    let task_dir = assignment.paths().task_dir(task.name());
    let env = metric_env(&install_dir, assignment, task);

    for metric in task.metrics() {
        tracing::info!("running metric {metric} for task {}", task.name());
        let command = resolve(&install_dir, &task_dir, task.name(), metric)?;
        let (program, args) = command.program_and_args();

        let output = process::run_collect(
            &program,
            &args,
            Some(&task_dir),
            &env,
            Some(config::metric_timeout()),
        )
        .await
        .with_context(|| format!("metric `{metric}` of task `{}` did not run", task.name()))?;

        if !output.success() {
            let status = output
                .status
                .code()
                .map(|code| code.to_string())
                .unwrap_or_else(|| "signal".to_string());
            return Err(MetricError::Failed {
                metric: metric.clone(),
                task: task.name().to_string(),
                status,
                stderr: truncate_with_notice(
                    output.stderr_utf8().trim_end(),
                    FAILURE_PREVIEW,
                ),
            }
            .into());
        }

        tracing::debug!("metric {metric} stdout:\n{}", output.stdout_utf8());
    }

    Ok(())
}
