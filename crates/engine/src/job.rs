// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The unit of work the scheduler routes.

use jetty_core::{BuildId, BuildInfo, WorkerId};
use std::path::PathBuf;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// One queued build. Immutable once assigned to a worker.
#[derive(Debug)]
pub struct Job {
    pub build_id: BuildId,
    /// Plan file to execute.
    pub file_name: PathBuf,
    /// Initial working directory for the build scope.
    pub cwd: PathBuf,
    /// Sink for human-readable execution messages.
    pub results: mpsc::Sender<String>,
    /// Sink for lifecycle records.
    pub status: mpsc::Sender<BuildInfo>,
    /// Worker the job ran on; set by the pool at assignment.
    pub worker: WorkerId,
    /// One-shot cancellation signal, derived from the process root.
    pub cancel: CancellationToken,
}
