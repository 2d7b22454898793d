// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `jettyctl ps` — render the active-builds view.

use anyhow::Result;
use jetty_core::{BuildInfo, BuildStatus};
use jetty_engine::{StatusRegistry, StatusSnapshot};
use std::fmt::Write;

#[derive(clap::Args, Default)]
pub struct PsArgs {
    /// Show all builds (active and completed)
    #[arg(short = 'a', long = "all")]
    pub all: bool,

    /// Filter builds by id, status, or worker
    #[arg(short = 'f', long = "filter", value_name = "FILTER")]
    pub filter: Option<String>,
}

pub async fn handle(args: PsArgs) -> Result<()> {
    let registry = StatusRegistry::spawn();
    let builds = registry.snapshot();
    print!("{}", render(&args, &builds));
    registry.shutdown().await;
    Ok(())
}

fn render(args: &PsArgs, builds: &StatusSnapshot) -> String {
    let mut out = String::new();
    if args.all {
        out.push_str("All builds (active and completed):\n");
    } else {
        out.push_str("Active builds:\n");
    }

    let mut entries: Vec<&BuildInfo> = builds.values().collect();
    entries.sort_by(|a, b| a.id.as_str().cmp(b.id.as_str()));

    for info in entries {
        if !args.all && info.status != BuildStatus::Running {
            continue;
        }
        if let Some(filter) = &args.filter {
            if !matches_filter(info, filter) {
                continue;
            }
        }
        let _ = writeln!(
            out,
            "Build ID: {}, Status: {}, Worker: {}, Start Time: {}",
            info.id,
            info.status,
            info.worker,
            format_start(info.start_ms),
        );
    }
    out
}

/// A filter matches a build by exact id, status, or worker id.
fn matches_filter(info: &BuildInfo, filter: &str) -> bool {
    info.id == *filter || info.status.to_string() == filter || info.worker == *filter
}

fn format_start(epoch_ms: u64) -> String {
    chrono::DateTime::<chrono::Utc>::from_timestamp_millis(epoch_ms as i64)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| epoch_ms.to_string())
}

#[cfg(test)]
#[path = "ps_tests.rs"]
mod tests;
