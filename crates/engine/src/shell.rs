// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shell spawning for the command-executing directives.

use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Errors from spawning or running a shell command.
#[derive(Debug, Error)]
pub enum ShellError {
    #[error("failed to spawn shell: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("command execution failed: exit status {code}: {output}")]
    Failed { code: i32, output: String },
    #[error("command cancelled")]
    Cancelled,
}

/// Run `sh -c <command>` in `cwd` with `env` layered over the inherited
/// environment, and return the combined stdout+stderr.
///
/// The cancel token is plumbed into the spawn: cancellation kills the
/// child rather than leaving it orphaned past the build deadline.
pub async fn run_shell(
    command: &str,
    cwd: &Path,
    env: &HashMap<String, String>,
    cancel: &CancellationToken,
) -> Result<String, ShellError> {
    let mut cmd = tokio::process::Command::new("sh");
    cmd.arg("-c")
        .arg(command)
        .current_dir(cwd)
        .envs(env)
        .kill_on_drop(true);

    let output = tokio::select! {
        result = cmd.output() => result.map_err(ShellError::Spawn)?,
        _ = cancel.cancelled() => return Err(ShellError::Cancelled),
    };

    let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
    combined.push_str(&String::from_utf8_lossy(&output.stderr));
    if output.status.success() {
        Ok(combined)
    } else {
        Err(ShellError::Failed {
            code: output.status.code().unwrap_or(-1),
            output: combined.trim_end().to_string(),
        })
    }
}

#[cfg(test)]
#[path = "shell_tests.rs"]
mod tests;
