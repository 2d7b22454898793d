// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `jettyctl init` — write a skeleton plan file.

use anyhow::{Context, Result};

const SKELETON: &str = "# Jettyfile\n\n# Add your build instructions here\n";

pub async fn handle() -> Result<()> {
    tokio::fs::write("Jettyfile", SKELETON)
        .await
        .context("failed to create Jettyfile")?;
    println!("Jettyfile created successfully in the current directory");
    Ok(())
}
