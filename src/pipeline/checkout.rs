#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Pins the submission to the last commit before the due date.

use std::{
    ffi::OsString,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail};
use chrono::NaiveDateTime;

use crate::{config, process, util};

/// A performed due-date checkout, remembering how to get back.
#[derive(Debug)]
pub struct Checkout {
    /// Workspace the checkout happened in.
    root:         PathBuf,
    /// Ref (or commit) that was checked out before pinning.
    original_ref: String,
    /// Commit the workspace is pinned to.
    pinned:       String,
}

impl Checkout {
    /// Returns the commit the workspace is pinned to.
    pub fn pinned_commit(&self) -> &str {
        &self.pinned
    }

    /// Returns the ref the workspace will be restored to.
    pub fn original_ref(&self) -> &str {
        &self.original_ref
    }

    /// Restores the ref that was checked out before pinning.
    pub async fn revert(self) -> Result<()> {
        tracing::info!("reverting checkout to {}", self.original_ref);
        git(&self.root, &["checkout", "--quiet", &self.original_ref])
            .await
            .context("failed to revert the due-date checkout")?;
        Ok(())
    }
}

/// Checks out the last commit authored before `due_date`.
///
/// The current symbolic ref (or commit, when already detached) is captured
/// first so [`Checkout::revert`] can restore it.
pub async fn pin_to_due_date(root: &Path, due_date: NaiveDateTime) -> Result<Checkout> {
    let original_ref = current_ref(root).await?;

    let before = due_date.format("%Y-%m-%d %H:%M:%S").to_string();
    let before_arg = format!("--before={before}");
    let listed = git(root, &["rev-list", "-1", before_arg.as_str(), "HEAD"])
        .await
        .context("failed to list commits before the due date")?;
    let pinned = listed.stdout_utf8().trim().to_string();
    if pinned.is_empty() {
        bail!("no commit exists before the due date ({before})");
    }

    tracing::info!("checking out {pinned} (last commit before {before})");
    git(root, &["checkout", "--quiet", &pinned])
        .await
        .with_context(|| format!("failed to check out {pinned}"))?;

    Ok(Checkout {
        root: root.to_path_buf(),
        original_ref,
        pinned,
    })
}

/// Returns the current branch name, or the current commit when detached.
async fn current_ref(root: &Path) -> Result<String> {
    let head = git_unchecked(root, &["symbolic-ref", "--short", "-q", "HEAD"]).await?;
    if head.success() {
        let name = head.stdout_utf8().trim().to_string();
        if !name.is_empty() {
            return Ok(name);
        }
    }

    let detached = git(root, &["rev-parse", "HEAD"])
        .await
        .context("workspace is not a git repository")?;
    Ok(detached.stdout_utf8().trim().to_string())
}

/// Runs git in `root` and fails on a non-zero exit.
async fn git(root: &Path, args: &[&str]) -> Result<process::CommandOutput> {
    git_unchecked(root, args)
        .await?
        .expect_success(&format!("git {}", args.join(" ")))
}

/// Runs git in `root`, returning the raw output.
async fn git_unchecked(root: &Path, args: &[&str]) -> Result<process::CommandOutput> {
    let git = util::git_path()?;
    let args: Vec<OsString> = process::os_args(args.iter().copied());
    process::run_collect(&git, &args, Some(root), &[], Some(config::git_timeout())).await
}
