// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Container driver for the `USE` directive.
//!
//! Containers are managed through the container CLI (`docker` unless
//! overridden). A box's container is created on first use with a
//! keep-alive command and the build's environment bindings; later uses
//! exec into the same container via its cached id.

use crate::config::EngineConfig;
use crate::scope::BoxImage;
use std::collections::HashMap;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Errors from the container driver.
#[derive(Debug, Error)]
pub enum ContainerError {
    #[error("failed to exec {bin}: {source}")]
    Spawn {
        bin: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{bin} {op} failed: {detail}")]
    Cli {
        bin: String,
        op: String,
        detail: String,
    },
    #[error("container command failed: exit status {code}: {output}")]
    ExecFailed { code: i32, output: String },
    #[error("container exec cancelled")]
    Cancelled,
}

/// Start a keep-alive container for a box and return its id.
pub async fn start_container(
    config: &EngineConfig,
    image: &BoxImage,
    container_name: &str,
    env: &HashMap<String, String>,
) -> Result<String, ContainerError> {
    let reference = image.reference();
    let mut args: Vec<String> =
        vec!["run".into(), "-d".into(), "--name".into(), container_name.into()];
    for (key, value) in env {
        args.push("-e".into());
        args.push(format!("{key}={value}"));
    }
    args.push(reference);
    // Keep-alive command so the container stays up between execs.
    args.extend(["tail".into(), "-f".into(), "/dev/null".into()]);

    tracing::info!(container = container_name, image = %image.reference(), "starting container");
    run_cli(config, &args).await
}

/// Exec a shell command inside a running container and return the
/// combined stdout+stderr.
pub async fn exec_in_container(
    config: &EngineConfig,
    container_id: &str,
    command: &str,
    cancel: &CancellationToken,
) -> Result<String, ContainerError> {
    let mut cmd = tokio::process::Command::new(&config.docker_bin);
    cmd.args(["exec", container_id, "sh", "-c", command])
        .kill_on_drop(true);

    let output = tokio::select! {
        result = cmd.output() => result.map_err(|e| ContainerError::Spawn {
            bin: config.docker_bin.clone(),
            source: e,
        })?,
        _ = cancel.cancelled() => return Err(ContainerError::Cancelled),
    };

    let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
    combined.push_str(&String::from_utf8_lossy(&output.stderr));
    if output.status.success() {
        Ok(combined)
    } else {
        Err(ContainerError::ExecFailed {
            code: output.status.code().unwrap_or(-1),
            output: combined.trim_end().to_string(),
        })
    }
}

/// Run a container CLI command and return its trimmed stdout on success.
async fn run_cli(config: &EngineConfig, args: &[String]) -> Result<String, ContainerError> {
    let output = tokio::process::Command::new(&config.docker_bin)
        .args(args)
        .output()
        .await
        .map_err(|e| ContainerError::Spawn { bin: config.docker_bin.clone(), source: e })?;

    if output.status.success() {
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    } else {
        let stderr = String::from_utf8_lossy(&output.stderr);
        Err(ContainerError::Cli {
            bin: config.docker_bin.clone(),
            op: args.first().cloned().unwrap_or_default(),
            detail: stderr.trim().to_string(),
        })
    }
}
