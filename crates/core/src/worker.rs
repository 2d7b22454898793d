// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worker identity.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of a pool worker as it appears in lifecycle records and in
/// the `WORKER_NODE` build variable.
///
/// Pool workers are named `worker-<index>`. A job carries a placeholder
/// id until the pool assigns it, and sub-builds inherit their parent's
/// id through the build scope, so the inner value stays a free-form
/// string rather than a pool index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkerId(String);

impl WorkerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Id of the worker at a pool index.
    pub fn from_index(index: usize) -> Self {
        Self(format!("worker-{index}"))
    }

    /// Placeholder for a job that has not been assigned yet.
    pub fn unassigned() -> Self {
        Self("unassigned".to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<str> for WorkerId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

#[cfg(test)]
#[path = "worker_tests.rs"]
mod tests;
