#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Toolchain provisioning checks.
//!
//! The runner cannot install a JDK; provisioning means locating the runtime
//! the host provides, verifying its major version, and failing the run when
//! the requirement is not met.

use std::ffi::OsString;

use anyhow::{Context, Result, bail};
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Rows},
};

use crate::{config, process, util};

/// A located and version-checked Java runtime.
#[derive(Debug, Clone)]
pub struct JavaRuntime {
    /// Path of the java binary used for the probe.
    binary: OsString,
    /// First line of the `java -version` banner.
    banner: String,
    /// Parsed major version.
    major:  u32,
}

impl JavaRuntime {
    /// Locates java and probes its version banner.
    pub async fn detect() -> Result<Self> {
        let binary = util::java_path()?;
        let args = process::os_args(["-version"]);
        let probe =
            process::run_collect(&binary, &args, None, &[], Some(config::git_timeout()))
                .await
                .context("java -version probe failed")?
                .expect_success("java -version")?;

        // The version banner goes to stderr.
        let banner = probe
            .stderr_utf8()
            .lines()
            .next()
            .unwrap_or_default()
            .to_string();
        let major = parse_major_version(&banner)
            .with_context(|| format!("could not parse a Java version out of `{banner}`"))?;

        Ok(Self {
            binary,
            banner,
            major,
        })
    }

    /// Returns the path of the probed java binary.
    pub fn binary(&self) -> &OsString {
        &self.binary
    }

    /// Returns the first line of the version banner.
    pub fn banner(&self) -> &str {
        &self.banner
    }

    /// Returns the parsed major version.
    pub fn major(&self) -> u32 {
        self.major
    }

    /// Fails unless the runtime is at least the required major version.
    pub fn require(&self, major: u32) -> Result<()> {
        if self.major < major {
            bail!(
                "Java {major} or newer is required, found {} ({})",
                self.major,
                self.banner
            );
        }
        Ok(())
    }

    /// Returns whether the banner mentions the given distribution.
    pub fn distribution_matches(&self, distribution: &str) -> bool {
        self.banner
            .to_ascii_lowercase()
            .contains(&distribution.to_ascii_lowercase())
    }
}

/// Parses the major version out of a `java -version` banner line.
///
/// Handles both the modern scheme (`openjdk version "17.0.9"`) and the
/// legacy one (`java version "1.8.0_392"`).
pub fn parse_major_version(banner: &str) -> Option<u32> {
    let start = banner.find('"')? + 1;
    let end = banner[start..].find('"')? + start;
    let quoted = &banner[start..end];

    let mut parts = quoted.split(['.', '_', '-', '+']);
    let first = parts.next()?.parse::<u32>().ok()?;
    if first == 1 {
        return parts.next()?.parse::<u32>().ok();
    }
    Some(first)
}

/// Verifies the toolchain the pipeline depends on.
///
/// Java must meet the configured major version; a distribution mismatch
/// only warns. Git must be present for the checkout and override stages.
pub async fn provision() -> Result<JavaRuntime> {
    let runtime = JavaRuntime::detect().await?;
    runtime.require(config::required_java())?;

    let preferred = config::preferred_dist();
    if !runtime.distribution_matches(&preferred) {
        tracing::warn!(
            "Java runtime does not look like {preferred}: {}",
            runtime.banner()
        );
    }
    tracing::info!("using {}", runtime.banner());

    util::git_path().context("the checkout and override stages need git")?;

    Ok(runtime)
}

/// One row of the `health` report.
#[derive(Tabled)]
pub struct CheckRow {
    /// Name of the check.
    #[tabled(rename = "Check")]
    check:  String,
    /// Pass/fail marker.
    #[tabled(rename = "Status")]
    status: String,
    /// Version banner or failure detail.
    #[tabled(rename = "Detail")]
    detail: String,
}

impl CheckRow {
    /// Returns whether this check passed.
    pub fn passed(&self) -> bool {
        self.status == "ok"
    }

    /// Builds a passing row.
    fn pass(check: &str, detail: String) -> Self {
        Self {
            check:  check.to_string(),
            status: "ok".to_string(),
            detail,
        }
    }

    /// Builds a failing row.
    fn fail(check: &str, detail: String) -> Self {
        Self {
            check:  check.to_string(),
            status: "failed".to_string(),
            detail,
        }
    }
}

/// Runs every provisioning check and reports each outcome.
pub async fn health() -> Vec<CheckRow> {
    let mut rows = Vec::new();

    match JavaRuntime::detect().await {
        Ok(runtime) => {
            let required = config::required_java();
            match runtime.require(required) {
                Ok(()) => rows.push(CheckRow::pass("java", runtime.banner().to_string())),
                Err(error) => rows.push(CheckRow::fail("java", error.to_string())),
            }
            let preferred = config::preferred_dist();
            if runtime.distribution_matches(&preferred) {
                rows.push(CheckRow::pass("distribution", preferred));
            } else {
                rows.push(CheckRow::fail(
                    "distribution",
                    format!("expected {preferred}, found: {}", runtime.banner()),
                ));
            }
        }
        Err(error) => rows.push(CheckRow::fail("java", error.to_string())),
    }

    match git_version().await {
        Ok(version) => rows.push(CheckRow::pass("git", version)),
        Err(error) => rows.push(CheckRow::fail("git", error.to_string())),
    }

    match util::install_dir_from_env() {
        Ok(dir) => rows.push(CheckRow::pass("install dir", dir.display().to_string())),
        Err(error) => rows.push(CheckRow::fail("install dir", error.to_string())),
    }

    rows
}

/// Renders the health report as a table.
pub fn render_health(rows: &[CheckRow]) -> String {
    Table::new(rows)
        .with(Style::modern())
        .with(Modify::new(Rows::new(1..)).with(Alignment::left()))
        .to_string()
}

/// Probes `git --version`.
async fn git_version() -> Result<String> {
    let git = util::git_path()?;
    let args = process::os_args(["--version"]);
    let probe = process::run_collect(&git, &args, None, &[], Some(config::git_timeout()))
        .await?
        .expect_success("git --version")?;
    Ok(probe.stdout_utf8().trim().to_string())
}
