#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Restores grading-critical files from the assignment template repository
//! so submissions cannot tamper with them.

use std::{ffi::OsString, fs, path::Path};

use anyhow::{Context, Result, bail};
use walkdir::WalkDir;

use crate::{
    assignment::Assignment,
    config,
    constants::{ASSIGNMENT_FILE_NAME, TASK_FILE_NAME},
    process, util,
};

/// Directory inside a task whose template version always wins.
const PROTECTED_TEST_DIR: &str = "test";

/// Clones the template repository and copies the protected files over the
/// workspace: `assignment.yml`, every task's `task.yml`, and every task's
/// `test/` tree the template ships.
pub async fn apply(assignment: &Assignment) -> Result<()> {
    let template_url = assignment.config().template_repository();
    let scratch = tempfile::tempdir().context("could not create a scratch directory")?;
    let clone_dir = scratch.path().join("template");

    clone_template(template_url, &clone_dir).await?;
    if !clone_dir.join(ASSIGNMENT_FILE_NAME).is_file() {
        bail!("template repository {template_url} has no {ASSIGNMENT_FILE_NAME}");
    }

    let root = assignment.paths().root_dir();
    copy_file(
        &clone_dir.join(ASSIGNMENT_FILE_NAME),
        &root.join(ASSIGNMENT_FILE_NAME),
    )?;

    for task in assignment.config().tasks() {
        let template_task = clone_dir.join(task);
        if !template_task.is_dir() {
            bail!("template repository {template_url} has no task directory `{task}`");
        }

        copy_file(
            &template_task.join(TASK_FILE_NAME),
            &assignment.paths().task_file(task),
        )
        .with_context(|| format!("task `{task}` is missing from the template"))?;

        let template_tests = template_task.join(PROTECTED_TEST_DIR);
        if template_tests.is_dir() {
            copy_tree(
                &template_tests,
                &assignment.paths().task_dir(task).join(PROTECTED_TEST_DIR),
            )
            .with_context(|| format!("could not restore test sources for task `{task}`"))?;
        }
    }

    Ok(())
}

/// Shallow-clones `url` into `target`.
async fn clone_template(url: &str, target: &Path) -> Result<()> {
    tracing::info!("cloning template repository {url}");
    let git = util::git_path()?;
    let target = target
        .to_str()
        .context("scratch directory path is not valid UTF-8")?;
    let args: Vec<OsString> =
        process::os_args(["clone", "--quiet", "--depth", "1", url, target]);

    process::run_collect(&git, &args, None, &[], Some(config::git_timeout()))
        .await
        .with_context(|| format!("failed to clone {url}"))?
        .expect_success("git clone")?;
    Ok(())
}

/// Copies a single file, creating the destination's parent directories.
fn copy_file(from: &Path, to: &Path) -> Result<()> {
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("could not create {}", parent.display()))?;
    }
    fs::copy(from, to)
        .with_context(|| format!("could not copy {} to {}", from.display(), to.display()))?;
    Ok(())
}

/// Recursively copies `from` over `to`, overwriting existing files.
pub(crate) fn copy_tree(from: &Path, to: &Path) -> Result<()> {
    for entry in WalkDir::new(from) {
        let entry = entry.context("could not walk the source tree")?;
        let relative = entry
            .path()
            .strip_prefix(from)
            .context("walked entry escaped the source tree")?;
        let target = to.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)
                .with_context(|| format!("could not create {}", target.display()))?;
        } else if entry.file_type().is_file() {
            copy_file(entry.path(), &target)?;
        }
    }
    Ok(())
}
