#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::fmt::Display;

use anyhow::{Context, Result};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Panel, Style, object::Rows},
};
use typed_builder::TypedBuilder;

/// A struct representing an earned score
#[derive(Clone, Default, Serialize, Deserialize, Debug, PartialEq)]
pub struct Score {
    /// The points actually earned
    pub earned: f64,
    /// The maximum points possible
    pub out_of: f64,
}

impl Score {
    /// Creates a new score -
    /// * `earned` - The points actually earned
    /// * `out_of` - The maximum points possible
    pub fn new(earned: f64, out_of: f64) -> Self {
        Self { earned, out_of }
    }

    /// Creates a new score from a string -
    /// * `score_string` - A string in the format `earned/out_of`, eg. `8/10`
    pub fn from_string(score_string: &str) -> Result<Score> {
        let (earned, out_of) = score_string.split_once('/').unwrap_or(("0", "0"));
        Ok(Score::new(
            earned
                .trim()
                .parse::<f64>()
                .context("Failed to parse earned points")?,
            out_of
                .trim()
                .parse::<f64>()
                .context("Failed to parse out of points")?,
        ))
    }

    /// Returns the earned fraction, or zero for an empty allocation.
    pub fn percent(&self) -> f64 {
        if self.out_of == 0.0 {
            return 0.0;
        }
        self.earned / self.out_of * 100.0
    }

    /// Adds another score into this one.
    pub fn add(&mut self, other: &Score) {
        self.earned += other.earned;
        self.out_of += other.out_of;
    }
}

impl Display for Score {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}/{:.2}", self.earned, self.out_of)
    }
}

/// A struct to store the score of one metric and display it
#[derive(Tabled, Clone, Default, Serialize, Deserialize, Debug)]
pub struct MetricScore {
    /// * `metric`: name of the metric the score belongs to
    #[tabled(rename = "Metric")]
    pub(crate) metric:  String,
    /// * `score`: scaled score received for the metric
    #[tabled(rename = "Score")]
    pub(crate) score:   Score,
    /// * `note`: first detail line the metric reported, if any
    #[tabled(rename = "Note")]
    pub(crate) note:    String,
    /// * `details`: every detail line the metric reported
    #[tabled(skip)]
    pub(crate) details: Vec<String>,
}

impl MetricScore {
    /// Creates a metric score from the metric's detail lines.
    pub fn new(metric: impl Into<String>, score: Score, details: Vec<String>) -> Self {
        let note = details.first().cloned().unwrap_or_default();
        Self {
            metric: metric.into(),
            score,
            note,
            details,
        }
    }

    /// Returns the metric name.
    pub fn metric(&self) -> &str {
        &self.metric
    }

    /// Returns the scaled score.
    pub fn score(&self) -> &Score {
        &self.score
    }

    /// Returns every detail line the metric reported.
    pub fn details(&self) -> &[String] {
        &self.details
    }
}

/// All metric scores of a single task.
#[derive(Clone, Default, Serialize, Deserialize, Debug)]
pub struct TaskResult {
    /// Directory name of the task.
    task:   String,
    /// Per-metric scores in execution order.
    scores: Vec<MetricScore>,
    /// Sum over all metric scores.
    total:  Score,
}

impl TaskResult {
    /// Builds a task result, summing the metric scores.
    pub fn new(task: impl Into<String>, scores: Vec<MetricScore>) -> Self {
        let mut total = Score::default();
        for score in &scores {
            total.add(&score.score);
        }
        Self {
            task: task.into(),
            scores,
            total,
        }
    }

    /// Returns the task name.
    pub fn task(&self) -> &str {
        &self.task
    }

    /// Returns the per-metric scores.
    pub fn scores(&self) -> &[MetricScore] {
        &self.scores
    }

    /// Returns the summed score.
    pub fn total(&self) -> &Score {
        &self.total
    }
}

/// Represents the overall outcome of one pipeline run.
#[derive(Serialize, Deserialize, Debug, TypedBuilder)]
#[builder(field_defaults(default, setter(into)))]
#[builder(doc)]
pub struct RunSummary {
    /// Display name of the assignment.
    pub assignment: String,

    /// Unique identifier of this run.
    pub run_id: String,

    /// Commit the submission was pinned to, when the checkout stage ran.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pinned_commit: Option<String>,

    /// Results of every task in grading order.
    pub tasks: Vec<TaskResult>,

    /// Sum over all task totals.
    pub total: Score,

    /// Path of the written results archive, once it exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archive: Option<std::path::PathBuf>,
}

impl RunSummary {
    /// Sums the totals of `tasks`.
    pub fn total_of(tasks: &[TaskResult]) -> Score {
        let mut total = Score::default();
        for task in tasks {
            total.add(task.total());
        }
        total
    }
}

/// Renders the student-facing score table for every task.
pub fn render_table(results: &[TaskResult]) -> String {
    let mut sections = Vec::new();

    for result in results {
        let header = format!("{} ({})", result.task(), result.total());
        let table = Table::new(result.scores())
            .with(Panel::header(header))
            .with(Style::modern())
            .with(Modify::new(Rows::new(1..)).with(Alignment::left()))
            .to_string();
        sections.push(table);
    }

    let total = RunSummary::total_of(results);
    let line = format!("Total: {total}");
    let line = if total.earned >= total.out_of && total.out_of > 0.0 {
        line.green().bold().to_string()
    } else if total.earned == 0.0 {
        line.red().bold().to_string()
    } else {
        line.bold().to_string()
    };
    sections.push(line);

    sections.join("\n")
}
