// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `jettyctl build` — queue a plan onto the worker pool and stream its
//! output until both sinks close.

use crate::exit_error::ExitError;
use anyhow::{Context, Result};
use jetty_core::{BuildId, BuildStatus, WorkerId};
use jetty_engine::{pool, EngineConfig, Job, StatusRegistry};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

#[derive(clap::Args)]
pub struct BuildArgs {
    /// Build plan file
    #[arg(short = 'f', long = "file", value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Build plan file (positional form)
    #[arg(value_name = "FILE", conflicts_with = "file")]
    pub positional: Option<PathBuf>,
}

pub async fn handle(args: BuildArgs, cancel: CancellationToken) -> Result<()> {
    let cwd = std::env::current_dir().context("cannot determine current directory")?;
    let file = resolve_plan_path(&args, &cwd)?;

    let config = Arc::new(EngineConfig::from_env());
    let pool = pool::global(config.clone());
    let registry = StatusRegistry::spawn();
    let registry_input = registry.input();

    let (result_tx, mut result_rx) = mpsc::channel(256);
    let (status_tx, mut status_rx) = mpsc::channel(16);
    let build_id = BuildId::next();
    tracing::info!(build = %build_id, file = %file.display(), "queueing build");

    let job = Job {
        build_id,
        file_name: file,
        cwd,
        results: result_tx,
        status: status_tx,
        worker: WorkerId::unassigned(),
        cancel,
    };
    pool.assign(job).await;

    // Stream results to stdout and relay lifecycle records into the
    // registry until both channels close.
    let mut terminal: Option<BuildStatus> = None;
    let mut results_open = true;
    let mut status_open = true;
    while results_open || status_open {
        tokio::select! {
            line = result_rx.recv(), if results_open => match line {
                Some(line) => println!("{}", line.trim_end()),
                None => results_open = false,
            },
            info = status_rx.recv(), if status_open => match info {
                Some(info) => {
                    if info.status.is_terminal() {
                        terminal = Some(info.status);
                    }
                    let _ = registry_input.send(info).await;
                }
                None => status_open = false,
            },
        }
    }

    registry.shutdown().await;
    pool.stop().await;

    match terminal {
        Some(BuildStatus::Completed) => Ok(()),
        _ => Err(ExitError::reported(1).into()),
    }
}

/// Resolve the plan path: `-f` flag, then positional argument, then a
/// `Jettyfile` in the working directory.
fn resolve_plan_path(args: &BuildArgs, cwd: &Path) -> Result<PathBuf> {
    if let Some(file) = &args.file {
        return Ok(file.clone());
    }
    if let Some(positional) = &args.positional {
        return Ok(positional.clone());
    }
    let default = cwd.join("Jettyfile");
    if default.exists() {
        Ok(default)
    } else {
        Err(ExitError::new(1, "no Jettyfile found in current directory and no file specified")
            .into())
    }
}

#[cfg(test)]
#[path = "build_tests.rs"]
mod tests;
