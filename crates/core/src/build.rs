// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Build identifier and lifecycle record.

use crate::worker::WorkerId;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Unique identifier for one execution of a plan.
///
/// Ids are structured rather than random: `build-<seq>` for top-level
/// builds and `<parent>-sub-<seq>` for nested sub-builds, so the lineage
/// of a nested build is readable straight from its id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BuildId(pub String);

impl BuildId {
    /// Create a new BuildId from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Id for a fresh top-level build.
    pub fn next() -> Self {
        Self(format!("build-{}", crate::seq::next_seq()))
    }

    /// Id for a sub-build nested under `parent`.
    pub fn sub_of(parent: &str) -> Self {
        Self(format!("{parent}-sub-{}", crate::seq::next_seq()))
    }

    /// Get the string value of this BuildId.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BuildId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for BuildId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for BuildId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl PartialEq<str> for BuildId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for BuildId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl Borrow<str> for BuildId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Lifecycle state of a build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildStatus {
    /// Build is executing directives
    Running,
    /// Build finished with every directive succeeding
    Completed,
    /// Build stopped on an error, cancellation, or timeout
    Failed,
}

impl BuildStatus {
    /// Check if this status ends the build's lifecycle.
    pub fn is_terminal(&self) -> bool {
        matches!(self, BuildStatus::Completed | BuildStatus::Failed)
    }
}

crate::simple_display! {
    BuildStatus {
        Running => "Running",
        Completed => "Completed",
        Failed => "Failed",
    }
}

/// Lifecycle record emitted on the status stream.
///
/// Every build emits at least two: one `Running` record on entry and one
/// terminal record on exit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildInfo {
    pub id: BuildId,
    pub status: BuildStatus,
    pub worker: WorkerId,
    /// Epoch milliseconds when the build entered Running
    pub start_ms: u64,
    /// Epoch milliseconds when the build reached a terminal status
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_ms: Option<u64>,
}

impl BuildInfo {
    /// Record for a build that just entered `Running`.
    pub fn running(id: BuildId, worker: WorkerId, start_ms: u64) -> Self {
        Self { id, status: BuildStatus::Running, worker, start_ms, end_ms: None }
    }

    /// Terminal record derived from the entry record.
    pub fn finished(&self, status: BuildStatus, end_ms: u64) -> Self {
        Self {
            id: self.id.clone(),
            status,
            worker: self.worker.clone(),
            start_ms: self.start_ms,
            end_ms: Some(end_ms),
        }
    }
}

#[cfg(test)]
#[path = "build_tests.rs"]
mod tests;
