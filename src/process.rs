#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::{
    ffi::{OsStr, OsString},
    path::Path,
    process::Stdio,
    time::Duration,
};

use anyhow::{Context, Result, bail};
use tokio::{process::Command, time::timeout};

use crate::util::truncate_with_notice;

/// Maximum stderr length echoed back in failure messages.
const STDERR_PREVIEW: usize = 2_000;

/// Captured result of a finished subprocess.
#[derive(Debug)]
pub struct CommandOutput {
    /// Exit status returned by the process.
    pub status: std::process::ExitStatus,
    /// Contents written to stdout.
    pub stdout: Vec<u8>,
    /// Contents written to stderr.
    pub stderr: Vec<u8>,
}

impl CommandOutput {
    /// Returns whether the process exited successfully.
    pub fn success(&self) -> bool {
        self.status.success()
    }

    /// Returns stdout decoded as UTF-8, replacing invalid sequences.
    pub fn stdout_utf8(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    /// Returns stderr decoded as UTF-8, replacing invalid sequences.
    pub fn stderr_utf8(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }

    /// Fails with the captured stderr when the process exited non-zero.
    ///
    /// `what` names the command for the error message.
    pub fn expect_success(self, what: &str) -> Result<Self> {
        if self.status.success() {
            return Ok(self);
        }

        let code = self
            .status
            .code()
            .map(|c| c.to_string())
            .unwrap_or_else(|| "signal".to_string());
        let stderr = truncate_with_notice(self.stderr_utf8().trim_end(), STDERR_PREVIEW);
        bail!("{what} exited with {code}\n{stderr}")
    }
}

/// Converts a slice of string-like arguments into the owned form
/// [`run_collect`] expects.
pub fn os_args<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator,
    I::Item: Into<OsString>,
{
    args.into_iter().map(Into::into).collect()
}

/// Spawns a command with stdin closed and collects stdout/stderr.
///
/// The child is killed when the optional `deadline` elapses or when the
/// returned future is dropped before completion.
pub async fn run_collect(
    program: impl AsRef<OsStr>,
    args: &[OsString],
    cwd: Option<&Path>,
    env: &[(OsString, OsString)],
    deadline: Option<Duration>,
) -> Result<CommandOutput> {
    let mut cmd = Command::new(program);
    cmd.args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    if let Some(dir) = cwd {
        cmd.current_dir(dir);
    }
    for (key, value) in env {
        cmd.env(key, value);
    }

    let collect = cmd.output();
    let output = match deadline {
        Some(limit) => timeout(limit, collect)
            .await
            .context("subprocess timed out")?
            .context("failed to spawn process")?,
        None => collect.await.context("failed to spawn process")?,
    };

    Ok(CommandOutput {
        status: output.status,
        stdout: output.stdout,
        stderr: output.stderr,
    })
}
