#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::{
    ffi::OsString,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use glob::glob;
use which::which;

use crate::constants::D2G_PATH_VAR;

/// Finds and returns the path to the java binary.
///
/// A `JAVA_HOME` pointing at a JDK wins over whatever is on `PATH`, which
/// matches how CI runners expose a provisioned runtime.
pub fn java_path() -> Result<OsString> {
    if let Ok(home) = std::env::var("JAVA_HOME") {
        let home = home.trim();
        if !home.is_empty() {
            let candidate = Path::new(home).join("bin").join(java_binary_name());
            if candidate.is_file() {
                return Ok(candidate.into_os_string());
            }
        }
    }

    which("java")
        .map(PathBuf::into_os_string)
        .context("Cannot find a Java runtime on path (java)")
}

/// Returns the platform specific java executable name.
fn java_binary_name() -> &'static str {
    if cfg!(windows) { "java.exe" } else { "java" }
}

/// Finds and returns the path to the git binary.
pub fn git_path() -> Result<OsString> {
    which("git")
        .map(PathBuf::into_os_string)
        .context("Cannot find git on path (git)")
}

/// Resolves the pipeline installation directory.
///
/// The `D2G_PATH` environment variable wins when set; otherwise the
/// directory containing the running executable is used. The result is
/// canonicalized so it stays valid regardless of the caller's working
/// directory.
pub fn install_dir_from_env() -> Result<PathBuf> {
    if let Ok(raw) = std::env::var(D2G_PATH_VAR) {
        let raw = raw.trim();
        if !raw.is_empty() {
            return Path::new(raw).canonicalize().with_context(|| {
                format!("{D2G_PATH_VAR} points at `{raw}`, which does not resolve")
            });
        }
    }

    let exe = std::env::current_exe().context("Could not locate the running executable")?;
    let dir = exe
        .parent()
        .context("Executable has no parent directory")?;
    dir.canonicalize()
        .with_context(|| format!("Could not canonicalize {}", dir.display()))
}

/// A glob utility function to find files with a certain name
///
/// * `file_name`: the exact file name to find paths for
/// * `search_depth`: how many folders deep to search for
/// * `root_dir`: the root directory where search starts
pub fn find_files(file_name: &str, search_depth: i8, root_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut pattern = root_dir.to_path_buf();

    for _ in 0..search_depth {
        pattern.push("**");
    }

    pattern.push(file_name);
    let pattern = pattern
        .to_str()
        .context("Could not convert root_dir to string")?
        .to_string();

    Ok(glob(&pattern)
        .context("Could not create glob")?
        .filter_map(Result::ok)
        .collect())
}

/// Truncates `content` to the provided `limit`, appending a notice to
/// indicate omitted output.
pub fn truncate_with_notice(content: &str, limit: usize) -> String {
    if content.len() <= limit {
        return content.to_string();
    }

    let mut end = limit;
    while end > 0 && !content.is_char_boundary(end) {
        end -= 1;
    }

    let mut truncated = content[..end].to_string();
    if let Some(index) = truncated.rfind('\n') {
        truncated.truncate(index);
    }

    truncated.push_str("\n...[TRUNCATED]");
    truncated
}
