// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-build mutable state.
//!
//! A scope is created fresh when a build begins and dropped when it
//! ends. Environment bindings and the working directory live here, not
//! in the host process: every spawned shell and container exec receives
//! the scope's `env` map and `cwd`, so concurrent builds in the pool
//! cannot race each other through process-wide state.

use jetty_core::{BuildId, WorkerId};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

/// Image coordinates registered by `BOX`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoxImage {
    pub repo: String,
    pub tag: String,
}

impl BoxImage {
    /// The `repo:tag` reference passed to the container CLI.
    pub fn reference(&self) -> String {
        format!("{}:{}", self.repo, self.tag)
    }
}

/// Mutable state shared by the directives of one build.
pub struct BuildScope {
    /// Build variables, written by `ARG` and `&FMT`.
    vars: Mutex<HashMap<String, String>>,
    /// Environment bindings for spawned commands, written by `ENV` and `$FMT`.
    env: Mutex<HashMap<String, String>>,
    /// Working directory for spawned commands and relative paths, set by `WDR`.
    cwd: Mutex<PathBuf>,
    /// Registered boxes, written by `BOX`.
    boxes: Mutex<HashMap<String, BoxImage>>,
    /// Cached container ids, one per box that has seen a `USE`.
    containers: Mutex<HashMap<String, String>>,
}

impl BuildScope {
    /// Create a scope seeded with the build's identity variables.
    pub fn new(build_id: &BuildId, worker: &WorkerId, cwd: PathBuf) -> Self {
        let mut vars = HashMap::new();
        vars.insert("BUILD_ID".to_string(), build_id.to_string());
        vars.insert("WORKER_NODE".to_string(), worker.to_string());
        Self {
            vars: Mutex::new(vars),
            env: Mutex::new(HashMap::new()),
            cwd: Mutex::new(cwd),
            boxes: Mutex::new(HashMap::new()),
            containers: Mutex::new(HashMap::new()),
        }
    }

    /// Expand variable references in `input` against the current vars.
    pub fn expand(&self, input: &str) -> String {
        jetty_plan::expand(input, &self.vars.lock())
    }

    pub fn set_var(&self, key: impl Into<String>, value: impl Into<String>) {
        self.vars.lock().insert(key.into(), value.into());
    }

    pub fn var(&self, key: &str) -> Option<String> {
        self.vars.lock().get(key).cloned()
    }

    pub fn set_env(&self, key: impl Into<String>, value: impl Into<String>) {
        self.env.lock().insert(key.into(), value.into());
    }

    /// Snapshot of the environment bindings for a spawn.
    pub fn env_snapshot(&self) -> HashMap<String, String> {
        self.env.lock().clone()
    }

    pub fn cwd(&self) -> PathBuf {
        self.cwd.lock().clone()
    }

    pub fn set_cwd(&self, path: PathBuf) {
        *self.cwd.lock() = path;
    }

    /// Resolve a path against the scope working directory and clean it.
    pub fn resolve(&self, path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref();
        if path.is_absolute() {
            clean_path(path)
        } else {
            clean_path(&self.cwd.lock().join(path))
        }
    }

    pub fn register_box(&self, name: impl Into<String>, image: BoxImage) {
        self.boxes.lock().insert(name.into(), image);
    }

    pub fn box_image(&self, name: &str) -> Option<BoxImage> {
        self.boxes.lock().get(name).cloned()
    }

    pub fn container_id(&self, box_name: &str) -> Option<String> {
        self.containers.lock().get(box_name).cloned()
    }

    pub fn set_container_id(&self, box_name: impl Into<String>, id: impl Into<String>) {
        self.containers.lock().insert(box_name.into(), id.into());
    }
}

/// Lexically clean a path: drop `.` components and fold `..` into the
/// preceding component where one exists.
pub fn clean_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if matches!(out.components().next_back(), Some(Component::Normal(_))) {
                    out.pop();
                } else if !matches!(out.components().next_back(), Some(Component::RootDir)) {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}

#[cfg(test)]
#[path = "scope_tests.rs"]
mod tests;
