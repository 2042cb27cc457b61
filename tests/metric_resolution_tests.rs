use std::{ffi::OsString, fs, path::Path};

use d2g::{
    assignment::Assignment,
    pipeline::{MetricCommand, MetricError, metrics},
};
use tempfile::tempdir;

fn touch(path: &Path) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent");
    }
    fs::write(path, "").expect("touch file");
}

fn workspace(root: &Path) -> Assignment {
    fs::write(
        root.join("assignment.yml"),
        "name: sorting\ndue_date: 2024-06-01\ntemplate_repository: \
         https://example.test/t.git\ntasks: task01\n",
    )
    .expect("write assignment.yml");
    fs::create_dir_all(root.join("task01")).expect("create task dir");
    fs::write(
        root.join("task01/task.yml"),
        "metrics: junit\njunit:\n  points: 20\n",
    )
    .expect("write task.yml");

    Assignment::discover(root).expect("discover workspace")
}

#[test]
fn scripts_win_over_the_gradle_fallback() {
    let install = tempdir().expect("install dir");
    let task = tempdir().expect("task dir");

    let shell = install.path().join("scripts/metrics/junit.sh");
    let python = install.path().join("scripts/metrics/junit.py");
    touch(&shell);
    touch(&python);
    touch(&task.path().join("gradlew"));

    let resolved = metrics::resolve(install.path(), task.path(), "task01", "junit")
        .expect("resolve metric");
    assert_eq!(resolved, MetricCommand::Script(shell));
}

#[test]
fn python_scripts_are_used_when_no_shell_script_exists() {
    let install = tempdir().expect("install dir");
    let task = tempdir().expect("task dir");

    let python = install.path().join("scripts/metrics/junit.py");
    touch(&python);
    touch(&task.path().join("gradlew"));

    let resolved = metrics::resolve(install.path(), task.path(), "task01", "junit")
        .expect("resolve metric");
    assert_eq!(resolved, MetricCommand::Script(python));
}

#[test]
fn gradle_wrapper_is_the_last_resort() {
    let install = tempdir().expect("install dir");
    let task = tempdir().expect("task dir");
    touch(&task.path().join("gradlew"));

    let resolved = metrics::resolve(install.path(), task.path(), "task01", "junit")
        .expect("resolve metric");
    match resolved {
        MetricCommand::Gradle { wrapper, task } => {
            assert!(wrapper.ends_with("gradlew") || wrapper.ends_with("gradlew.bat"));
            assert_eq!(task, "junit");
        }
        other => panic!("expected the gradle fallback, got {other:?}"),
    }
}

#[test]
fn unresolvable_metrics_are_a_typed_error() {
    let install = tempdir().expect("install dir");
    let task = tempdir().expect("task dir");

    let result = metrics::resolve(install.path(), task.path(), "task01", "junit");
    assert!(matches!(result, Err(MetricError::Unresolvable { .. })));
}

#[test]
fn metric_env_pins_the_install_dir_regardless_of_cwd() {
    let install = tempdir().expect("install dir");
    let install_dir = install.path().canonicalize().expect("canonicalize");
    let work = tempdir().expect("workspace");
    let elsewhere = tempdir().expect("other cwd");

    let assignment = workspace(work.path());
    let task = assignment.load_task("task01").expect("load task");

    let collect = |pairs: Vec<(OsString, OsString)>, key: &str| -> Option<OsString> {
        pairs
            .into_iter()
            .find(|(name, _)| name == &OsString::from(key))
            .map(|(_, value)| value)
    };

    let before = collect(
        metrics::metric_env(&install_dir, &assignment, &task),
        "D2G_PATH",
    )
    .expect("D2G_PATH is always set");

    std::env::set_current_dir(elsewhere.path()).expect("change cwd");
    let after = collect(
        metrics::metric_env(&install_dir, &assignment, &task),
        "D2G_PATH",
    )
    .expect("D2G_PATH is always set");

    assert_eq!(before, after);
    assert_eq!(before, install_dir.as_os_str());
    assert!(Path::new(&before).is_absolute());

    // The rendered configuration rides along in the same environment.
    let pairs = metrics::metric_env(&install_dir, &assignment, &task);
    let tasks = collect(pairs, "ASSIGNMENT_TASKS").expect("assignment pairs present");
    assert_eq!(tasks, OsString::from("task01"));
}
