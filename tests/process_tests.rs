#![cfg(unix)]

use std::time::Duration;

use d2g::process::{os_args, run_collect};

#[tokio::test]
async fn output_and_exit_status_are_collected() {
    let args = os_args(["-c", "echo out; echo err >&2; exit 3"]);
    let output = run_collect("sh", &args, None, &[], None)
        .await
        .expect("run sh");

    assert_eq!(output.status.code(), Some(3));
    assert!(!output.success());
    assert_eq!(output.stdout_utf8(), "out\n");
    assert_eq!(output.stderr_utf8(), "err\n");
}

#[tokio::test]
async fn expect_success_carries_stderr_into_the_error() {
    let args = os_args(["-c", "echo broken >&2; exit 1"]);
    let output = run_collect("sh", &args, None, &[], None)
        .await
        .expect("run sh");

    let error = output.expect_success("sh").expect_err("non-zero exit");
    let message = error.to_string();
    assert!(message.contains("exited with 1"), "unexpected error: {message}");
    assert!(message.contains("broken"), "unexpected error: {message}");
}

#[tokio::test]
async fn environment_and_cwd_reach_the_child() {
    let dir = tempfile::tempdir().expect("temp dir");
    let args = os_args(["-c", "printf '%s' \"$D2G_PROBE\"; pwd >&2"]);
    let env = [("D2G_PROBE".into(), "42".into())];

    let output = run_collect("sh", &args, Some(dir.path()), &env, None)
        .await
        .expect("run sh")
        .expect_success("sh")
        .expect("exit zero");

    assert_eq!(output.stdout_utf8(), "42");
    let cwd = output.stderr_utf8();
    let canonical = dir.path().canonicalize().expect("canonicalize");
    assert_eq!(cwd.trim(), canonical.to_string_lossy());
}

#[tokio::test]
async fn deadlines_kill_slow_children() {
    let args = os_args(["-c", "sleep 5"]);
    let error = run_collect("sh", &args, None, &[], Some(Duration::from_millis(100)))
        .await
        .expect_err("deadline elapses first");

    assert!(
        error.to_string().contains("timed out"),
        "unexpected error: {error}"
    );
}

#[tokio::test]
async fn missing_programs_fail_to_spawn() {
    let args = os_args(Vec::<String>::new());
    let result = run_collect("d2g-definitely-not-a-binary", &args, None, &[], None).await;
    assert!(result.is_err());
}
