#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Typed views of `assignment.yml` and `task.yml`, plus the environment
//! rendering the metric scripts consume.

use std::{
    collections::BTreeMap,
    ffi::OsString,
    path::{Path, PathBuf},
};

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use thiserror::Error;

use crate::constants::{ASSIGNMENT_ENV_PREFIX, TASK_FILE_NAME};

/// Errors produced while loading configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("could not read {}", .path.display())]
    Read {
        /// File that failed to read.
        path:   PathBuf,
        /// Underlying io error.
        #[source]
        source: std::io::Error,
    },
    /// The configuration file is not valid YAML or misses required keys.
    #[error("could not parse {}", .path.display())]
    Parse {
        /// File that failed to parse.
        path:   PathBuf,
        /// Underlying YAML error.
        #[source]
        source: serde_yaml::Error,
    },
    /// The configuration parsed but carries an invalid value.
    #[error("{}: {message}", .path.display())]
    Invalid {
        /// File the invalid value came from.
        path:    PathBuf,
        /// What is wrong with it.
        message: String,
    },
}

/// A field that accepts either a YAML sequence of names or a single
/// space-separated string, as the original pipeline configuration used.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum NameList {
    /// Proper YAML sequence form.
    Many(Vec<String>),
    /// Space-separated scalar form.
    Joined(String),
}

impl NameList {
    /// Returns the individual names, splitting the scalar form on
    /// whitespace.
    fn names(&self) -> Vec<String> {
        match self {
            NameList::Many(names) => names
                .iter()
                .flat_map(|name| name.split_whitespace())
                .map(str::to_string)
                .collect(),
            NameList::Joined(joined) => {
                joined.split_whitespace().map(str::to_string).collect()
            }
        }
    }
}

/// Required keys of `assignment.yml`.
#[derive(Debug, Deserialize)]
struct RawAssignment {
    /// Optional display name.
    #[serde(default)]
    name:                Option<String>,
    /// Submission deadline.
    due_date:            String,
    /// Clone URL of the assignment template repository.
    template_repository: String,
    /// Task directories, in grading order.
    tasks:               NameList,
}

/// Parsed view of `assignment.yml`.
#[derive(Debug, Clone)]
pub struct AssignmentConfig {
    /// Optional display name.
    name:                Option<String>,
    /// Parsed submission deadline.
    due_date:            NaiveDateTime,
    /// Deadline exactly as configured.
    due_date_raw:        String,
    /// Clone URL of the assignment template repository.
    template_repository: String,
    /// Task directories, in grading order.
    tasks:               Vec<String>,
    /// Full document, kept for environment rendering.
    raw:                 Value,
}

impl AssignmentConfig {
    /// Loads and validates the assignment configuration at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text, path)
    }

    /// Parses an assignment configuration from `text`; `origin` names the
    /// source in errors.
    pub fn parse(text: &str, origin: &Path) -> Result<Self, ConfigError> {
        let raw: Value = serde_yaml::from_str(text).map_err(|source| ConfigError::Parse {
            path: origin.to_path_buf(),
            source,
        })?;
        let typed: RawAssignment =
            serde_yaml::from_value(raw.clone()).map_err(|source| ConfigError::Parse {
                path: origin.to_path_buf(),
                source,
            })?;

        let tasks = typed.tasks.names();
        if tasks.is_empty() {
            return Err(invalid(origin, "assignment lists no tasks"));
        }
        if typed.template_repository.trim().is_empty() {
            return Err(invalid(origin, "template_repository is empty"));
        }
        let due_date = parse_due_date(&typed.due_date).ok_or_else(|| {
            invalid(origin, format!("unrecognized due_date `{}`", typed.due_date))
        })?;

        Ok(Self {
            name: typed.name,
            due_date,
            due_date_raw: typed.due_date,
            template_repository: typed.template_repository,
            tasks,
            raw,
        })
    }

    /// Returns the configured display name, if any.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns the parsed submission deadline.
    pub fn due_date(&self) -> NaiveDateTime {
        self.due_date
    }

    /// Returns the deadline exactly as configured.
    pub fn due_date_raw(&self) -> &str {
        &self.due_date_raw
    }

    /// Returns the template repository clone URL.
    pub fn template_repository(&self) -> &str {
        &self.template_repository
    }

    /// Returns the task directories in grading order.
    pub fn tasks(&self) -> &[String] {
        &self.tasks
    }

    /// Renders the whole document to `ASSIGNMENT_*` environment pairs.
    pub fn env_pairs(&self) -> Vec<(OsString, OsString)> {
        render_env(ASSIGNMENT_ENV_PREFIX, &self.raw)
    }
}

/// Parsed view of a task's `task.yml`.
#[derive(Debug, Clone)]
pub struct TaskConfig {
    /// Directory name of the task.
    name:    String,
    /// Metric names, in execution order.
    metrics: Vec<String>,
    /// Point allocation per metric.
    points:  BTreeMap<String, f64>,
    /// Full document, kept for environment rendering.
    raw:     Value,
}

/// Required keys of `task.yml`.
#[derive(Debug, Deserialize)]
struct RawTask {
    /// Metric names, in execution order.
    metrics: NameList,
}

impl TaskConfig {
    /// Loads and validates the `task.yml` inside `task_dir`.
    pub fn load(task_dir: &Path, name: &str) -> Result<Self, ConfigError> {
        let path = task_dir.join(TASK_FILE_NAME);
        let text = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        Self::parse(name, &text, &path)
    }

    /// Parses a task configuration from `text`; `origin` names the source in
    /// errors.
    pub fn parse(name: &str, text: &str, origin: &Path) -> Result<Self, ConfigError> {
        let raw: Value = serde_yaml::from_str(text).map_err(|source| ConfigError::Parse {
            path: origin.to_path_buf(),
            source,
        })?;
        let typed: RawTask =
            serde_yaml::from_value(raw.clone()).map_err(|source| ConfigError::Parse {
                path: origin.to_path_buf(),
                source,
            })?;

        let metrics = typed.metrics.names();
        if metrics.is_empty() {
            return Err(invalid(origin, format!("task `{name}` lists no metrics")));
        }

        let mut points = BTreeMap::new();
        for metric in &metrics {
            let allocation = raw
                .get(metric.as_str())
                .and_then(|section| section.get("points"))
                .and_then(Value::as_f64)
                .ok_or_else(|| {
                    invalid(origin, format!("metric `{metric}` has no points allocation"))
                })?;
            if allocation < 0.0 {
                return Err(invalid(
                    origin,
                    format!("metric `{metric}` has a negative points allocation"),
                ));
            }
            points.insert(metric.clone(), allocation);
        }

        Ok(Self {
            name: name.to_string(),
            metrics,
            points,
            raw,
        })
    }

    /// Returns the task's directory name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the metric names in execution order.
    pub fn metrics(&self) -> &[String] {
        &self.metrics
    }

    /// Returns the point allocation for `metric`, if it is configured.
    pub fn points_for(&self, metric: &str) -> Option<f64> {
        self.points.get(metric).copied()
    }

    /// Returns the environment prefix derived from the task name, e.g.
    /// `task-01` becomes `TASK_01`.
    pub fn env_prefix(&self) -> String {
        sanitize_env_key(&self.name)
    }

    /// Renders the whole document to `<TASK>_*` environment pairs.
    pub fn env_pairs(&self) -> Vec<(OsString, OsString)> {
        render_env(&self.env_prefix(), &self.raw)
    }
}

/// Builds an [`ConfigError::Invalid`] for `origin`.
fn invalid(origin: &Path, message: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        path:    origin.to_path_buf(),
        message: message.into(),
    }
}

/// Parses the supported due date notations.
///
/// Accepts RFC 3339, `Y-m-d H:M[:S]`, and a bare date (taken as end of
/// day).
pub fn parse_due_date(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();

    if let Ok(stamped) = DateTime::parse_from_rfc3339(raw) {
        return Some(stamped.naive_local());
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(parsed);
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(23, 59, 59))
}

/// Uppercases `name` and replaces every non-alphanumeric run with `_`.
fn sanitize_env_key(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect()
}

/// Renders a YAML document to prefixed uppercase environment pairs.
///
/// Mappings flatten with `_`-joined keys, sequences of scalars join with
/// spaces, and non-scalar sequence elements are dropped.
pub fn render_env(prefix: &str, value: &Value) -> Vec<(OsString, OsString)> {
    let mut pairs = Vec::new();
    collect_env(prefix, value, &mut pairs);
    pairs
        .into_iter()
        .map(|(key, value)| (OsString::from(key), OsString::from(value)))
        .collect()
}

/// Recursive worker behind [`render_env`].
fn collect_env(key: &str, value: &Value, out: &mut Vec<(String, String)>) {
    match value {
        Value::Mapping(map) => {
            for (name, nested) in map {
                if let Some(name) = name.as_str() {
                    let child = format!("{key}_{}", sanitize_env_key(name));
                    collect_env(&child, nested, out);
                }
            }
        }
        Value::Sequence(seq) => {
            let joined = seq.iter().filter_map(scalar_to_string).join(" ");
            out.push((key.to_string(), joined));
        }
        other => {
            if let Some(scalar) = scalar_to_string(other) {
                out.push((key.to_string(), scalar));
            }
        }
    }
}

/// Returns the string form of a scalar YAML value.
fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}
