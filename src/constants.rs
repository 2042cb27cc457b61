#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

/// Name of the assignment configuration file at the workspace root.
pub const ASSIGNMENT_FILE_NAME: &str = "assignment.yml";

/// Name of the per-task configuration file.
pub const TASK_FILE_NAME: &str = "task.yml";

/// Directory, relative to a task, where metrics leave their result files.
pub const TASK_RESULTS_DIR: &str = "build/results";

/// Directory, relative to the workspace root, that is published as the
/// results artifact.
pub const RESULTS_DIR: &str = "results";

/// Name of the published results artifact.
pub const ARTIFACT_NAME: &str = "D2G_results";

/// Name of the run summary file written into the results directory.
pub const SUMMARY_FILE_NAME: &str = "summary.yml";

/// Environment variable pointing at the pipeline installation directory.
pub const D2G_PATH_VAR: &str = "D2G_PATH";

/// Subdirectory of the installation directory that holds metric scripts.
pub const METRIC_SCRIPTS_DIR: &str = "scripts/metrics";

/// Environment prefix used when rendering `assignment.yml` for subprocesses.
pub const ASSIGNMENT_ENV_PREFIX: &str = "ASSIGNMENT";

/// Name of the Gradle wrapper script a task may ship.
#[cfg(not(windows))]
pub const GRADLE_WRAPPER: &str = "gradlew";

/// Name of the Gradle wrapper script a task may ship.
#[cfg(windows)]
pub const GRADLE_WRAPPER: &str = "gradlew.bat";
