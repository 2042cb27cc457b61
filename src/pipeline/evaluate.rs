#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Turns metric result files into scaled task scores.

use std::path::Path;

use anyhow::{Context, Result, ensure};
use serde::Deserialize;

use super::results::{MetricScore, Score, TaskResult};
use crate::assignment::{Assignment, TaskConfig};

/// Result file a metric leaves under `build/results/<metric>.yml`.
#[derive(Debug, Deserialize)]
struct MetricReport {
    /// Points the metric awarded.
    points:     f64,
    /// Maximum points the metric could have awarded.
    max_points: f64,
    /// Free-form detail lines for the student.
    #[serde(default)]
    details:    Vec<String>,
}

/// Evaluates every metric result of `task` into a [`TaskResult`].
///
/// Each report's `points / max_points` ratio is scaled into the task.yml
/// allocation for the metric. A missing or malformed result file fails the
/// run.
pub fn evaluate_task(assignment: &Assignment, task: &TaskConfig) -> Result<TaskResult> {
    let results_dir = assignment.paths().task_results_dir(task.name());
    let mut scores = Vec::new();

    for metric in task.metrics() {
        let path = results_dir.join(format!("{metric}.yml"));
        let report = read_report(&path)
            .with_context(|| format!("metric `{metric}` of task `{}`", task.name()))?;

        let out_of = task
            .points_for(metric)
            .with_context(|| format!("metric `{metric}` has no points allocation"))?;
        let earned = scale(report.points, report.max_points, out_of).with_context(|| {
            format!("metric `{metric}` of task `{}` reported an invalid result", task.name())
        })?;

        scores.push(MetricScore::new(
            metric.clone(),
            Score::new(earned, out_of),
            report.details,
        ));
    }

    Ok(TaskResult::new(task.name(), scores))
}

/// Reads and parses a single metric result file.
fn read_report(path: &Path) -> Result<MetricReport> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("left no result file at {}", path.display()))?;
    serde_yaml::from_str(&text)
        .with_context(|| format!("left an unreadable result file at {}", path.display()))
}

/// Scales `points / max_points` into an `out_of` allocation, rounded to two
/// decimals. Reported points clamp into `[0, max_points]`.
fn scale(points: f64, max_points: f64, out_of: f64) -> Result<f64> {
    ensure!(max_points > 0.0, "max_points must be positive, got {max_points}");
    let ratio = points.clamp(0.0, max_points) / max_points;
    Ok((ratio * out_of * 100.0).round() / 100.0)
}
