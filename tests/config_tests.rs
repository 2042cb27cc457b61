use std::{
    ffi::OsString,
    path::{Path, PathBuf},
};

use d2g::assignment::{
    AssignmentConfig, ConfigError, TaskConfig,
    config::{parse_due_date, render_env},
};

const ORIGIN: &str = "memory/assignment.yml";

fn origin() -> PathBuf {
    PathBuf::from(ORIGIN)
}

fn lookup(pairs: &[(OsString, OsString)], key: &str) -> Option<String> {
    pairs
        .iter()
        .find(|(name, _)| name == &OsString::from(key))
        .map(|(_, value)| value.to_string_lossy().into_owned())
}

#[test]
fn task_list_and_joined_forms_are_equivalent() {
    let listed = AssignmentConfig::parse(
        "due_date: 2024-06-01\ntemplate_repository: https://example.test/t.git\ntasks:\n  - \
         task01\n  - task02\n",
        &origin(),
    )
    .expect("parse listed form");

    let joined = AssignmentConfig::parse(
        "due_date: 2024-06-01\ntemplate_repository: https://example.test/t.git\ntasks: task01 \
         task02\n",
        &origin(),
    )
    .expect("parse joined form");

    assert_eq!(listed.tasks(), joined.tasks());
    assert_eq!(listed.tasks(), ["task01", "task02"]);
}

#[test]
fn due_date_accepts_the_supported_notations() {
    let full = parse_due_date("2024-06-01 18:30:15").expect("full notation");
    assert_eq!(full.format("%Y-%m-%d %H:%M:%S").to_string(), "2024-06-01 18:30:15");

    let minutes = parse_due_date("2024-06-01 18:30").expect("minute notation");
    assert_eq!(minutes.format("%H:%M:%S").to_string(), "18:30:00");

    let rfc = parse_due_date("2024-06-01T18:30:15+02:00").expect("rfc 3339");
    assert_eq!(rfc.format("%Y-%m-%d").to_string(), "2024-06-01");

    let date_only = parse_due_date("2024-06-01").expect("date only");
    assert_eq!(date_only.format("%H:%M:%S").to_string(), "23:59:59");

    assert!(parse_due_date("first of June").is_none());
}

#[test]
fn assignments_without_tasks_or_with_bad_dates_are_invalid() {
    let empty_tasks = AssignmentConfig::parse(
        "due_date: 2024-06-01\ntemplate_repository: https://example.test/t.git\ntasks: \"\"\n",
        &origin(),
    );
    assert!(matches!(empty_tasks, Err(ConfigError::Invalid { .. })));

    let bad_date = AssignmentConfig::parse(
        "due_date: whenever\ntemplate_repository: https://example.test/t.git\ntasks: task01\n",
        &origin(),
    );
    assert!(matches!(bad_date, Err(ConfigError::Invalid { .. })));

    let no_template = AssignmentConfig::parse(
        "due_date: 2024-06-01\ntemplate_repository: \"  \"\ntasks: task01\n",
        &origin(),
    );
    assert!(matches!(no_template, Err(ConfigError::Invalid { .. })));
}

#[test]
fn malformed_yaml_is_a_parse_error() {
    let result = AssignmentConfig::parse("due_date: [unterminated\n", &origin());
    assert!(matches!(result, Err(ConfigError::Parse { .. })));

    let message = result.unwrap_err().to_string();
    assert!(message.contains(ORIGIN), "error should name the origin: {message}");
}

#[test]
fn assignment_env_pairs_carry_the_original_contract() {
    let config = AssignmentConfig::parse(
        "name: sorting\ndue_date: 2024-06-01 18:00\ntemplate_repository: \
         https://example.test/t.git\ntasks:\n  - task01\n  - task02\n",
        &origin(),
    )
    .expect("parse assignment");

    let pairs = config.env_pairs();
    assert_eq!(lookup(&pairs, "ASSIGNMENT_NAME").as_deref(), Some("sorting"));
    assert_eq!(
        lookup(&pairs, "ASSIGNMENT_DUE_DATE").as_deref(),
        Some("2024-06-01 18:00")
    );
    assert_eq!(
        lookup(&pairs, "ASSIGNMENT_TEMPLATE_REPOSITORY").as_deref(),
        Some("https://example.test/t.git")
    );
    assert_eq!(lookup(&pairs, "ASSIGNMENT_TASKS").as_deref(), Some("task01 task02"));
}

#[test]
fn env_rendering_flattens_nested_mappings() {
    let value: serde_yaml::Value = serde_yaml::from_str(
        "metrics: checkstyle\ncheckstyle:\n  points: 10\n  max-warnings: 3\nflags:\n  - quick\n  \
         - strict\nenabled: true\n",
    )
    .expect("parse yaml");

    let pairs = render_env("TASK01", &value);
    assert_eq!(lookup(&pairs, "TASK01_METRICS").as_deref(), Some("checkstyle"));
    assert_eq!(lookup(&pairs, "TASK01_CHECKSTYLE_POINTS").as_deref(), Some("10"));
    assert_eq!(lookup(&pairs, "TASK01_CHECKSTYLE_MAX_WARNINGS").as_deref(), Some("3"));
    assert_eq!(lookup(&pairs, "TASK01_FLAGS").as_deref(), Some("quick strict"));
    assert_eq!(lookup(&pairs, "TASK01_ENABLED").as_deref(), Some("true"));
}

#[test]
fn task_config_reads_metrics_and_points() {
    let task = TaskConfig::parse(
        "task01",
        "metrics: checkstyle junit\ncheckstyle:\n  points: 10\njunit:\n  points: 20\n",
        Path::new("task01/task.yml"),
    )
    .expect("parse task");

    assert_eq!(task.metrics(), ["checkstyle", "junit"]);
    assert_eq!(task.points_for("checkstyle"), Some(10.0));
    assert_eq!(task.points_for("junit"), Some(20.0));
    assert_eq!(task.points_for("coverage"), None);
}

#[test]
fn task_metrics_without_points_are_invalid() {
    let missing = TaskConfig::parse(
        "task01",
        "metrics: checkstyle junit\ncheckstyle:\n  points: 10\n",
        Path::new("task01/task.yml"),
    );
    assert!(matches!(missing, Err(ConfigError::Invalid { .. })));

    let negative = TaskConfig::parse(
        "task01",
        "metrics: checkstyle\ncheckstyle:\n  points: -1\n",
        Path::new("task01/task.yml"),
    );
    assert!(matches!(negative, Err(ConfigError::Invalid { .. })));

    let none = TaskConfig::parse("task01", "metrics: \"\"\n", Path::new("task01/task.yml"));
    assert!(matches!(none, Err(ConfigError::Invalid { .. })));
}

#[test]
fn task_env_prefix_is_sanitized() {
    let task = TaskConfig::parse(
        "task-01",
        "metrics: junit\njunit:\n  points: 5\n",
        Path::new("task-01/task.yml"),
    )
    .expect("parse task");

    assert_eq!(task.env_prefix(), "TASK_01");
    let pairs = task.env_pairs();
    assert_eq!(lookup(&pairs, "TASK_01_METRICS").as_deref(), Some("junit"));
    assert_eq!(lookup(&pairs, "TASK_01_JUNIT_POINTS").as_deref(), Some("5"));
}
