// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Directive dispatch.
//!
//! One executor lives for the duration of a build. Each directive is
//! routed to its handler; handlers read and write the build scope, emit
//! human-readable messages on the result sink, and return an error when
//! the directive cannot complete.

use crate::config::EngineConfig;
use crate::container::{exec_in_container, start_container, ContainerError};
use crate::format::sprintf;
use crate::runner;
use crate::scope::{BoxImage, BuildScope};
use crate::shell::{run_shell, ShellError};
use crate::{fsutil, Job};
use jetty_core::{next_seq, BuildId, WorkerId};
use jetty_plan::{DirectiveKind, Instruction, ValidateError};
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Errors from executing one directive.
#[derive(Debug, Error)]
pub enum ExecError {
    #[error("invalid {directive} format: {args}")]
    InvalidBinding { directive: &'static str, args: String },
    #[error("only one {directive} allowed per directive: {args}")]
    MultipleKeys { directive: &'static str, args: String },
    #[error("invalid RUN command: {0}")]
    Rejected(ValidateError),
    #[error(transparent)]
    Shell(#[from] ShellError),
    #[error("directory creation failed: {0}")]
    DirCreate(#[source] std::io::Error),
    #[error("only one directory allowed per WDR directive: {0}")]
    WdrArgs(String),
    #[error("directory does not exist: {0}")]
    MissingDirectory(String),
    #[error("CPY directive requires exactly two arguments: source and destination")]
    CpyArgs,
    #[error("error accessing source: {0}")]
    SourceAccess(#[source] std::io::Error),
    #[error("copy operation failed: {0}")]
    Copy(#[source] std::io::Error),
    #[error("{0} directive requires a plan file argument")]
    SubArgs(&'static str),
    #[error("BOX directive requires exactly three arguments: name, repository, and tag")]
    BoxArgs,
    #[error("USE directive requires at least two arguments: box name and command")]
    UseArgs,
    #[error("box not found: {0}")]
    UnknownBox(String),
    #[error("failed to execute in container: {0}")]
    Container(#[from] ContainerError),
    #[error("{0} directive requires at least two arguments: format string and arguments")]
    FmtArgs(String),
    #[error("{0} directive requires three arguments: format string, arguments, and a target name")]
    FmtTarget(String),
    #[error("failed to append to file: {0}")]
    Append(#[source] std::io::Error),
    #[error("failed to set environment variable: empty name")]
    EmptyEnvName,
    #[error("plugin not found: {0}")]
    PluginNotFound(String),
}

/// Executes directives against one build's scope.
pub struct DirectiveExecutor {
    scope: Arc<BuildScope>,
    results: mpsc::Sender<String>,
    cancel: CancellationToken,
    config: Arc<EngineConfig>,
}

impl DirectiveExecutor {
    pub fn new(
        scope: Arc<BuildScope>,
        results: mpsc::Sender<String>,
        cancel: CancellationToken,
        config: Arc<EngineConfig>,
    ) -> Self {
        Self { scope, results, cancel, config }
    }

    pub fn scope(&self) -> &Arc<BuildScope> {
        &self.scope
    }

    /// Dispatch one directive to its handler.
    pub async fn execute(&self, inst: &Instruction) -> Result<(), ExecError> {
        tracing::debug!(directive = %inst.kind, args = %inst.args, "executing directive");
        match inst.kind {
            DirectiveKind::Arg => self.handle_arg(inst),
            DirectiveKind::Env => self.handle_env(inst).await,
            DirectiveKind::Run => self.handle_run(inst).await,
            DirectiveKind::Cmd => self.handle_cmd(inst).await,
            DirectiveKind::Dir => self.handle_dir(inst).await,
            DirectiveKind::Wdr => self.handle_wdr(inst).await,
            DirectiveKind::Cpy => self.handle_cpy(inst).await,
            DirectiveKind::Sub | DirectiveKind::Frm => self.handle_sub(inst).await,
            DirectiveKind::Box => self.handle_box(inst).await,
            DirectiveKind::Use => self.handle_use(inst).await,
            DirectiveKind::Fmt => self.handle_fmt(inst).await,
            DirectiveKind::Jet => self.handle_jet(inst).await,
        }
    }

    /// Emit a human-readable message on the result sink.
    async fn log(&self, message: impl Into<String>) {
        if self.results.send(message.into()).await.is_err() {
            tracing::warn!("result sink closed; dropping message");
        }
    }

    /// Split `KEY=VALUE` args for the binding directives.
    fn split_binding(
        directive: &'static str,
        args: &str,
    ) -> Result<(String, String), ExecError> {
        let Some((key, value)) = args.split_once('=') else {
            return Err(ExecError::InvalidBinding { directive, args: args.to_string() });
        };
        let key = key.trim();
        let value = value.trim();
        if key.contains(' ') {
            return Err(ExecError::MultipleKeys { directive, args: args.to_string() });
        }
        Ok((key.to_string(), value.to_string()))
    }

    fn handle_arg(&self, inst: &Instruction) -> Result<(), ExecError> {
        let (key, value) = Self::split_binding("ARG", &inst.args)?;
        let expanded = self.scope.expand(&value);
        self.scope.set_var(key, expanded);
        Ok(())
    }

    async fn handle_env(&self, inst: &Instruction) -> Result<(), ExecError> {
        let (key, value) = Self::split_binding("ENV", &inst.args)?;
        if key.is_empty() {
            return Err(ExecError::EmptyEnvName);
        }
        let expanded = self.scope.expand(&value);
        self.scope.set_env(key.clone(), expanded.clone());
        self.log(format!("ENV: {key}={expanded}")).await;
        Ok(())
    }

    async fn handle_run(&self, inst: &Instruction) -> Result<(), ExecError> {
        let expanded = self.scope.expand(&inst.args);
        jetty_plan::validate(&expanded).map_err(ExecError::Rejected)?;
        let output = run_shell(
            &expanded,
            &self.scope.cwd(),
            &self.scope.env_snapshot(),
            &self.cancel,
        )
        .await?;
        self.log(format!("Done: {output}")).await;
        Ok(())
    }

    /// Deferred terminal command, invoked by the runner after the join
    /// barrier. Same semantics as `RUN`, except a validator rejection is
    /// reported as a warning instead of aborting the command.
    async fn handle_cmd(&self, inst: &Instruction) -> Result<(), ExecError> {
        let expanded = self.scope.expand(&inst.args);
        if let Err(reason) = jetty_plan::validate(&expanded) {
            self.log(format!("CMD validation warning: {reason}")).await;
        }
        self.log(format!("CMD: {expanded}")).await;
        let output = run_shell(
            &expanded,
            &self.scope.cwd(),
            &self.scope.env_snapshot(),
            &self.cancel,
        )
        .await?;
        self.log(format!("Done: {output}")).await;
        Ok(())
    }

    async fn handle_dir(&self, inst: &Instruction) -> Result<(), ExecError> {
        let expanded = self.scope.expand(&inst.args);
        let path = self.scope.resolve(&expanded);
        let mut builder = tokio::fs::DirBuilder::new();
        builder.recursive(true);
        #[cfg(unix)]
        builder.mode(0o755);
        builder.create(&path).await.map_err(ExecError::DirCreate)?;
        self.log(format!("DIR: {expanded}")).await;
        Ok(())
    }

    async fn handle_wdr(&self, inst: &Instruction) -> Result<(), ExecError> {
        let parts: Vec<&str> = inst.args.split_whitespace().collect();
        if parts.len() != 1 {
            return Err(ExecError::WdrArgs(inst.args.clone()));
        }
        let expanded = self.scope.expand(parts[0]);
        let path = self.scope.resolve(&expanded);
        if tokio::fs::metadata(&path).await.is_err() {
            return Err(ExecError::MissingDirectory(path.display().to_string()));
        }
        self.log(format!("WDR: Changed working directory to {}", path.display())).await;
        self.scope.set_cwd(path);
        Ok(())
    }

    async fn handle_cpy(&self, inst: &Instruction) -> Result<(), ExecError> {
        let parts: Vec<&str> = inst.args.split_whitespace().collect();
        if parts.len() != 2 {
            return Err(ExecError::CpyArgs);
        }
        let src = self.scope.resolve(self.scope.expand(parts[0]));
        let dst = self.scope.resolve(self.scope.expand(parts[1]));

        if inst.is_async() {
            // Fire-and-forget: failures are logged on the result stream
            // but never change the build status.
            let results = self.results.clone();
            let cancel = self.cancel.clone();
            let (src_task, dst_task) = (src.clone(), dst.clone());
            tokio::spawn(async move {
                tokio::select! {
                    outcome = copy_path(&src_task, &dst_task) => {
                        let message = match outcome {
                            Ok(()) => format!(
                                "CPY: Copied from {} to {}",
                                src_task.display(),
                                dst_task.display()
                            ),
                            Err(e) => format!("Copy operation failed: {e}"),
                        };
                        let _ = results.send(message).await;
                    }
                    _ = cancel.cancelled() => {
                        tracing::debug!(src = %src_task.display(), "async copy cancelled");
                    }
                }
            });
            self.log(format!(
                "Started asynchronous copy: {} to {}",
                src.display(),
                dst.display()
            ))
            .await;
            return Ok(());
        }

        copy_path(&src, &dst).await?;
        self.log(format!("CPY: Copied from {} to {}", src.display(), dst.display())).await;
        Ok(())
    }

    /// Nested build for `SUB`, `*SUB`, and `FRM`.
    ///
    /// The child build runs detached and is never force-joined: the
    /// parent only subscribes to its streams, and the subscription has a
    /// hard ceiling. When the ceiling hits, the parent moves on and the
    /// child keeps running until its own deadline or the cancel token
    /// catches up with it.
    async fn handle_sub(&self, inst: &Instruction) -> Result<(), ExecError> {
        let label = inst.kind.name();
        let file = inst.args.trim();
        if file.is_empty() {
            return Err(ExecError::SubArgs(label));
        }

        let parent_id = self.scope.var("BUILD_ID").unwrap_or_default();
        let worker = self.scope.var("WORKER_NODE").unwrap_or_default();
        let sub_id = BuildId::sub_of(&parent_id);

        let (sub_results_tx, sub_results_rx) = mpsc::channel(64);
        let (sub_status_tx, sub_status_rx) = mpsc::channel(16);
        let sub_job = Job {
            build_id: sub_id.clone(),
            file_name: self.scope.resolve(file),
            cwd: self.scope.cwd(),
            results: sub_results_tx,
            status: sub_status_tx,
            worker: WorkerId::new(worker),
            cancel: self.cancel.child_token(),
        };
        runner::spawn_build(sub_job, self.config.clone());

        let subscription = forward_sub_build(
            sub_id,
            sub_results_rx,
            sub_status_rx,
            self.results.clone(),
            self.config.build_timeout,
        );

        if inst.is_async() {
            tokio::spawn(subscription);
            self.log(format!("Started asynchronous sub-build: {file}")).await;
        } else {
            subscription.await;
            self.log(format!("Completed synchronous sub-build: {file}")).await;
        }
        Ok(())
    }

    async fn handle_box(&self, inst: &Instruction) -> Result<(), ExecError> {
        let parts: Vec<&str> = inst.args.split_whitespace().collect();
        let &[name, repo, tag] = parts.as_slice() else {
            return Err(ExecError::BoxArgs);
        };
        let image = BoxImage { repo: repo.to_string(), tag: tag.to_string() };
        self.log(format!("BOX: Created box {name} with image {}", image.reference())).await;
        self.scope.register_box(name, image);
        Ok(())
    }

    async fn handle_use(&self, inst: &Instruction) -> Result<(), ExecError> {
        let mut parts = inst.args.split_whitespace();
        let Some(name) = parts.next() else {
            return Err(ExecError::UseArgs);
        };
        let command: Vec<&str> = parts.collect();
        if command.is_empty() {
            return Err(ExecError::UseArgs);
        }
        let command = command.join(" ");

        let image = self
            .scope
            .box_image(name)
            .ok_or_else(|| ExecError::UnknownBox(name.to_string()))?;

        let container_id = match self.scope.container_id(name) {
            Some(id) => id,
            None => {
                let container_name = format!("{name}-{}", next_seq());
                let id = start_container(
                    &self.config,
                    &image,
                    &container_name,
                    &self.scope.env_snapshot(),
                )
                .await?;
                self.scope.set_container_id(name, id.clone());
                id
            }
        };

        let output = exec_in_container(&self.config, &container_id, &command, &self.cancel).await?;
        self.log(format!("Done: {output}")).await;
        self.log(format!("USE: Executed command in box {name}")).await;
        Ok(())
    }

    /// `FMT` family: format a string from positionals, then route it.
    ///
    /// The args are `format positional…`: every positional feeds the
    /// format. `^FMT` additionally reads the last positional as the file
    /// to append to; `$FMT`/`&FMT` instead peel the last token off as
    /// the environment-variable / build-variable name to bind.
    async fn handle_fmt(&self, inst: &Instruction) -> Result<(), ExecError> {
        let label = match inst.modifier {
            Some(m) => format!("{}FMT", m.as_char()),
            None => "FMT".to_string(),
        };
        let Some((format, tail)) = inst.args.split_once(' ') else {
            return Err(ExecError::FmtArgs(label));
        };
        let positionals: Vec<&str> = tail.split(' ').filter(|s| !s.is_empty()).collect();
        if positionals.is_empty() {
            return Err(ExecError::FmtArgs(label));
        }

        use jetty_plan::Modifier;
        match inst.modifier {
            None => {
                let expanded = self.expand_all(&positionals);
                let formatted = sprintf(format, &expanded);
                self.log(format!("FMT: {formatted}")).await;
            }
            Some(Modifier::Caret) => {
                // Last positional doubles as the file path; it still
                // feeds the format like any other positional.
                let expanded = self.expand_all(&positionals);
                let formatted = sprintf(format, &expanded);
                let (file, _) = split_target(&positionals);
                let file = self.scope.expand(file);
                let path = self.scope.resolve(&file);
                fsutil::append_file(&path, &formatted).await.map_err(ExecError::Append)?;
                self.log(format!("^FMT: Appended formatted string to {file}")).await;
            }
            Some(Modifier::Dollar) => {
                if positionals.len() < 2 {
                    return Err(ExecError::FmtTarget(label));
                }
                let (var_name, rest) = split_target(&positionals);
                let expanded = self.expand_all(rest);
                let formatted = sprintf(format, &expanded);
                self.scope.set_env(var_name, formatted);
                self.log(format!(
                    "$FMT: Exported formatted string to environment variable {var_name}"
                ))
                .await;
            }
            Some(Modifier::Amp) => {
                if positionals.len() < 2 {
                    return Err(ExecError::FmtTarget(label));
                }
                let (arg_name, rest) = split_target(&positionals);
                let expanded = self.expand_all(rest);
                let formatted = sprintf(format, &expanded);
                self.scope.set_var(arg_name, formatted);
                self.log(format!("&FMT: Exported formatted string to argument {arg_name}")).await;
            }
            Some(Modifier::Star) => unreachable!("parser rejects *FMT"),
        }
        Ok(())
    }

    async fn handle_jet(&self, inst: &Instruction) -> Result<(), ExecError> {
        let name = inst.args.trim();
        let path = self.scope.resolve(PathBuf::from("plugins").join(name));
        if tokio::fs::metadata(&path).await.is_err() {
            return Err(ExecError::PluginNotFound(name.to_string()));
        }
        self.log(format!("JET: Found plugin {name}; plugin execution is not implemented")).await;
        Ok(())
    }

    fn expand_all(&self, values: &[&str]) -> Vec<String> {
        values.iter().map(|v| self.scope.expand(v)).collect()
    }
}

/// Split the trailing target token off a positional list.
fn split_target<'a>(positionals: &'a [&'a str]) -> (&'a str, &'a [&'a str]) {
    match positionals.split_last() {
        Some((last, rest)) => (*last, rest),
        None => ("", positionals),
    }
}

/// Copy a file or a directory tree, chosen by a stat of the source.
async fn copy_path(src: &std::path::Path, dst: &std::path::Path) -> Result<(), ExecError> {
    let meta = tokio::fs::metadata(src).await.map_err(ExecError::SourceAccess)?;
    if meta.is_dir() {
        fsutil::copy_dir(src, dst).await.map_err(ExecError::Copy)
    } else {
        fsutil::copy_file(src, dst).await.map_err(ExecError::Copy)
    }
}

/// Forward a sub-build's streams onto the parent's result sink.
///
/// Result lines arrive prefixed with the sub-build id; the terminal
/// status is reported as one summary line. The ceiling bounds only the
/// subscription: on expiry a timeout line is emitted and the sub-build
/// is left running in the background.
async fn forward_sub_build(
    sub_id: BuildId,
    mut results_rx: mpsc::Receiver<String>,
    mut status_rx: mpsc::Receiver<jetty_core::BuildInfo>,
    parent_results: mpsc::Sender<String>,
    ceiling: std::time::Duration,
) {
    let deadline = tokio::time::sleep(ceiling);
    tokio::pin!(deadline);
    let mut results_done = false;
    let mut status_done = false;

    while !(results_done && status_done) {
        tokio::select! {
            line = results_rx.recv(), if !results_done => match line {
                Some(line) => {
                    let _ = parent_results.send(format!("Sub-build {sub_id}: {line}")).await;
                }
                None => results_done = true,
            },
            info = status_rx.recv(), if !status_done => match info {
                Some(info) if info.status.is_terminal() => {
                    let _ = parent_results
                        .send(format!(
                            "Sub-build {sub_id} completed with status: {}",
                            info.status
                        ))
                        .await;
                    status_done = true;
                }
                Some(_) => {}
                None => status_done = true,
            },
            _ = &mut deadline => {
                let _ = parent_results.send(format!("Sub-build {sub_id} timed out")).await;
                return;
            }
        }
    }
}

#[cfg(test)]
#[path = "executor_tests.rs"]
mod tests;
