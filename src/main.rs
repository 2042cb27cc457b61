#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! # d2g
//! ## Introduction
//!
//! A deploy-to-grading pipeline runner for student Java assignments.
//!
//! Run `d2g run` inside an assignment checkout to execute the full
//! sequence: toolchain verification, due-date checkout, template override,
//! per-task metric execution and evaluation, and artifact publication.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use bpaf::*;
use dotenvy::dotenv;
use self_update::cargo_crate_version;
use tracing::{Level, metadata::LevelFilter};
use tracing_subscriber::{fmt, prelude::*, util::SubscriberInitExt};

use d2g::{
    assignment::Assignment,
    pipeline::{Pipeline, artifact},
    runtime,
};

/// Updates binary based on github releases
fn update() -> Result<()> {
    self_update::backends::github::Update::configure()
        .repo_owner("programmiermethoden")
        .repo_name("deploy-to-grading")
        .bin_name("d2g")
        .no_confirm(true)
        .show_download_progress(true)
        .show_output(false)
        .current_version(cargo_crate_version!())
        .build()?
        .update()?;

    eprintln!("Update done!");
    Ok(())
}

/// Top-level CLI commands.
#[derive(Debug, Clone)]
enum Cmd {
    /// Run the full deploy-to-grading sequence
    Run(PathBuf),
    /// Validate the assignment and task configuration
    Check(PathBuf),
    /// Print a JSON description of the parsed assignment
    Info(PathBuf),
    /// Rebuild the results archive from an existing results directory
    Collect(PathBuf),
    /// Report toolchain provisioning checks
    Health,
    /// Update the command
    Update,
}

/// Parse the command line arguments and return a `Cmd` enum
fn options() -> Cmd {
    /// parses the workspace directory
    fn w() -> impl Parser<PathBuf> {
        positional::<PathBuf>("DIR")
            .help("Assignment workspace (defaults to the current directory)")
            .fallback(PathBuf::from("."))
    }

    let run = construct!(Cmd::Run(w()))
        .to_options()
        .command("run")
        .help("Run the full deploy-to-grading sequence");

    let check = construct!(Cmd::Check(w()))
        .to_options()
        .command("check")
        .help("Validate assignment.yml and every task.yml");

    let info = construct!(Cmd::Info(w()))
        .to_options()
        .command("info")
        .help("Print a JSON description of the assignment as parsed");

    let collect = construct!(Cmd::Collect(w()))
        .to_options()
        .command("collect")
        .help("Rebuild the results archive from an existing results directory");

    let health = pure(Cmd::Health)
        .to_options()
        .command("health")
        .help("Report toolchain provisioning checks");

    let update = pure(Cmd::Update)
        .to_options()
        .command("update")
        .help("Update the d2g command");

    let cmd = construct!([run, check, info, collect, health, update]);

    cmd.to_options()
        .descr("Deploy-to-grading pipeline runner")
        .run()
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    let fmt = fmt::layer()
        .without_time()
        .with_file(false)
        .with_line_number(false);
    let filter_layer = LevelFilter::from_level(Level::INFO);
    tracing_subscriber::registry()
        .with(fmt)
        .with(filter_layer)
        .init();

    let cmd = options();

    match cmd {
        Cmd::Run(dir) => {
            let assignment = Assignment::discover(&dir)?;
            let summary = Pipeline::new(assignment).run().await?;
            if let Some(archive) = &summary.archive {
                tracing::info!("results archived at {}", archive.display());
            }
        }
        Cmd::Check(dir) => {
            let assignment = Assignment::discover(&dir)?;
            assignment
                .load_tasks()
                .context("configuration is not valid")?;
            println!("{}", assignment.check_table());

            for stray in assignment.unlisted_task_files()? {
                tracing::warn!(
                    "{} exists but its task is not listed in assignment.yml",
                    stray.display()
                );
            }
        }
        Cmd::Info(dir) => {
            Assignment::discover(&dir)?.info()?;
        }
        Cmd::Collect(dir) => {
            let assignment = Assignment::discover(&dir)?;
            let archive = artifact::archive(assignment.paths())?;
            println!("{}", archive.display());
        }
        Cmd::Health => {
            let rows = runtime::health().await;
            println!("{}", runtime::render_health(&rows));
            if rows.iter().any(|row| !row.passed()) {
                bail!("one or more provisioning checks failed");
            }
        }
        Cmd::Update => {
            match update() {
                Ok(_) => {}
                Err(e) => eprintln!("{e}"),
            };
        }
    };

    Ok(())
}
