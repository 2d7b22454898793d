// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The build runner: drives one job to completion.
//!
//! Sequential directives run in source order; `*`-prefixed directives
//! fan out onto sibling tasks and are joined before the deferred `CMD`
//! executes. Exactly one `Running` record opens the status stream and
//! one terminal record closes it.

use crate::config::EngineConfig;
use crate::executor::DirectiveExecutor;
use crate::job::Job;
use crate::scope::BuildScope;
use jetty_core::{BuildId, BuildInfo, BuildStatus, Clock, SystemClock, WorkerId};
use jetty_plan::DirectiveKind;
use parking_lot::Mutex;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::{JoinHandle, JoinSet};
use tokio_util::sync::CancellationToken;

/// Spawn a build as a detached task.
///
/// Nested sub-builds enter here rather than through the worker pool, so
/// a deep plan cannot deadlock the pool against itself.
pub fn spawn_build(job: Job, config: Arc<EngineConfig>) -> JoinHandle<()> {
    tokio::spawn(async move { run_build(job, config).await })
}

/// Run a build under the configured deadline.
///
/// On expiry the build token is cancelled and the runner is left to
/// unwind: in-flight handlers observe the token, and the runner emits
/// its terminal `Failed` record on the way out.
pub async fn run_build_with_timeout(job: Job, config: Arc<EngineConfig>) {
    let cancel = job.cancel.clone();
    let results = job.results.clone();
    let timeout = config.build_timeout;

    let build = run_build(job, config);
    tokio::pin!(build);
    let deadline = tokio::time::sleep(timeout);
    tokio::pin!(deadline);

    tokio::select! {
        _ = &mut build => return,
        _ = &mut deadline => {
            tracing::warn!("build deadline expired; cancelling");
            let _ = results.send("Build timed out or was cancelled".to_string()).await;
            cancel.cancel();
        }
    }
    build.await;
}

/// Execute one plan: status entry record, directive loop, join barrier,
/// deferred CMD, terminal record.
pub async fn run_build(job: Job, config: Arc<EngineConfig>) {
    let Job { build_id, file_name, cwd, results, status, worker, cancel } = job;
    let clock = SystemClock;

    let entry = BuildInfo::running(build_id.clone(), worker.clone(), clock.epoch_ms());
    let _ = status.send(entry.clone()).await;
    tracing::info!(build = %build_id, file = %file_name.display(), "build started");

    let outcome =
        execute_plan(&build_id, &file_name, cwd, &worker, &results, &cancel, &config).await;

    let final_status = match outcome {
        Ok(()) => BuildStatus::Completed,
        Err(message) => {
            let _ = results.send(message).await;
            BuildStatus::Failed
        }
    };
    tracing::info!(build = %build_id, status = %final_status, "build finished");
    let _ = status.send(entry.finished(final_status, clock.epoch_ms())).await;
    // Dropping `results` here releases the build's hold on the result
    // stream; it closes once any fire-and-forget tasks wind down.
}

async fn execute_plan(
    build_id: &BuildId,
    file_name: &Path,
    cwd: std::path::PathBuf,
    worker: &WorkerId,
    results: &mpsc::Sender<String>,
    cancel: &CancellationToken,
    config: &Arc<EngineConfig>,
) -> Result<(), String> {
    if cancel.is_cancelled() {
        return Err("Build cancelled".to_string());
    }

    let instructions =
        jetty_plan::parse_file(file_name).map_err(|e| format!("error parsing file: {e}"))?;

    let scope = Arc::new(BuildScope::new(build_id, worker, cwd));
    let executor = Arc::new(DirectiveExecutor::new(
        scope,
        results.clone(),
        cancel.clone(),
        config.clone(),
    ));

    let mut cmd_pending = None;
    let mut tasks: JoinSet<()> = JoinSet::new();
    let async_errors = Arc::new(Mutex::new(Vec::<String>::new()));

    for inst in instructions {
        if cancel.is_cancelled() {
            return Err("Build cancelled".to_string());
        }

        if inst.kind == DirectiveKind::Cmd {
            if cmd_pending.is_some() {
                return Err("multiple CMD directives are not allowed".to_string());
            }
            cmd_pending = Some(inst);
            continue;
        }

        if inst.is_async() {
            let executor = executor.clone();
            let errors = async_errors.clone();
            tasks.spawn(async move {
                if let Err(e) = executor.execute(&inst).await {
                    errors.lock().push(e.to_string());
                }
            });
        } else {
            executor
                .execute(&inst)
                .await
                .map_err(|e| format!("error executing instruction: {e}"))?;
        }
    }

    // Join barrier: every *-task completes before CMD or the terminal
    // status. Errors here were collected, not fatal to siblings.
    while tasks.join_next().await.is_some() {}

    let errors = std::mem::take(&mut *async_errors.lock());
    if !errors.is_empty() {
        return Err(format!("error executing instruction: {}", errors.join("; ")));
    }

    if let Some(cmd) = cmd_pending {
        if cancel.is_cancelled() {
            return Err("Build cancelled".to_string());
        }
        executor
            .execute(&cmd)
            .await
            .map_err(|e| format!("error executing CMD instruction: {e}"))?;
    }

    Ok(())
}
