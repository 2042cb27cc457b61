#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Collects per-task results into `results/` and archives them as the
//! published artifact.

use std::{fs, io::Write, path::PathBuf};

use anyhow::{Context, Result, bail};
use uuid::Uuid;
use walkdir::WalkDir;
use zip::{CompressionMethod, ZipWriter, write::SimpleFileOptions};

use super::{
    overlay::copy_tree,
    results::{RunSummary, TaskResult, render_table},
};
use crate::{
    assignment::{Assignment, WorkspacePaths},
    constants::{ARTIFACT_NAME, SUMMARY_FILE_NAME},
};

/// Collects results, writes the archive, and prints the student table.
pub fn present(
    assignment: &Assignment,
    results: &[TaskResult],
    pinned_commit: Option<String>,
) -> Result<RunSummary> {
    let mut summary = collect(assignment, results, pinned_commit)?;
    let archive_path = archive(assignment.paths())?;
    summary.archive = Some(archive_path);

    println!("{}", render_table(results));
    Ok(summary)
}

/// Copies every task's result directory into `results/` and writes the
/// per-task and summary files.
pub fn collect(
    assignment: &Assignment,
    results: &[TaskResult],
    pinned_commit: Option<String>,
) -> Result<RunSummary> {
    let results_dir = assignment.paths().results_dir();
    fs::create_dir_all(results_dir)
        .with_context(|| format!("could not create {}", results_dir.display()))?;

    for result in results {
        let task_results = assignment.paths().task_results_dir(result.task());
        if !task_results.is_dir() {
            bail!("task `{}` left no {} directory", result.task(), task_results.display());
        }
        copy_tree(&task_results, &results_dir.join(result.task())).with_context(|| {
            format!("could not collect results of task `{}`", result.task())
        })?;

        let rendered = serde_yaml::to_string(result)
            .with_context(|| format!("could not serialize results of `{}`", result.task()))?;
        fs::write(results_dir.join(format!("{}.yml", result.task())), rendered)
            .context("could not write the per-task result file")?;
    }

    let summary = RunSummary::builder()
        .assignment(assignment.display_name())
        .run_id(Uuid::new_v4().to_string())
        .pinned_commit(pinned_commit)
        .tasks(results.to_vec())
        .total(RunSummary::total_of(results))
        .build();

    let rendered = serde_yaml::to_string(&summary).context("could not serialize the summary")?;
    fs::write(results_dir.join(SUMMARY_FILE_NAME), rendered)
        .context("could not write the summary file")?;

    Ok(summary)
}

/// Zips the contents of `results/` into the named artifact archive.
///
/// A missing `results/` directory is an error: there is nothing to publish
/// and no retry semantics exist.
pub fn archive(paths: &WorkspacePaths) -> Result<PathBuf> {
    let results_dir = paths.results_dir();
    if !results_dir.is_dir() {
        bail!("no {} directory to publish", results_dir.display());
    }

    let archive_path = paths.artifact_path();
    let file = fs::File::create(&archive_path)
        .with_context(|| format!("could not create {}", archive_path.display()))?;
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for entry in WalkDir::new(results_dir) {
        let entry = entry.context("could not walk the results directory")?;
        if !entry.file_type().is_file() || entry.path() == archive_path {
            continue;
        }

        let relative = entry
            .path()
            .strip_prefix(results_dir)
            .context("walked entry escaped the results directory")?;
        let name = relative.to_string_lossy().replace('\\', "/");

        zip.start_file(name, options)
            .context("could not start an archive entry")?;
        let bytes = fs::read(entry.path())
            .with_context(|| format!("could not read {}", entry.path().display()))?;
        zip.write_all(&bytes)
            .context("could not write an archive entry")?;
    }

    zip.finish().context("could not finish the archive")?;
    tracing::info!("wrote {ARTIFACT_NAME} archive to {}", archive_path.display());
    Ok(archive_path)
}
