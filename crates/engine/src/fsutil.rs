// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Filesystem helpers for the copy and append directives.

use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use std::pin::Pin;

/// Copy a single file, creating or truncating the destination.
pub async fn copy_file(src: &Path, dst: &Path) -> io::Result<()> {
    tokio::fs::copy(src, dst).await?;
    Ok(())
}

/// Recursively copy a directory tree.
///
/// The destination is created with the source directory's mode. Symlinks
/// are followed: an entry is copied as whatever its target is.
pub fn copy_dir<'a>(
    src: &'a Path,
    dst: &'a Path,
) -> Pin<Box<dyn Future<Output = io::Result<()>> + Send + 'a>> {
    Box::pin(async move {
        let src_meta = tokio::fs::metadata(src).await?;
        tokio::fs::create_dir_all(dst).await?;
        tokio::fs::set_permissions(dst, src_meta.permissions()).await?;

        let mut entries = tokio::fs::read_dir(src).await?;
        while let Some(entry) = entries.next_entry().await? {
            let from: PathBuf = entry.path();
            let to = dst.join(entry.file_name());
            let meta = tokio::fs::metadata(&from).await?;
            if meta.is_dir() {
                copy_dir(&from, &to).await?;
            } else {
                copy_file(&from, &to).await?;
            }
        }
        Ok(())
    })
}

/// Append `content` to a file, creating it with mode 0644 if absent.
pub async fn append_file(path: &Path, content: &str) -> io::Result<()> {
    use tokio::io::AsyncWriteExt;

    let mut options = tokio::fs::OpenOptions::new();
    options.append(true).create(true);
    #[cfg(unix)]
    options.mode(0o644);
    let mut file = options.open(path).await?;
    file.write_all(content.as_bytes()).await?;
    file.flush().await?;
    Ok(())
}

#[cfg(test)]
#[path = "fsutil_tests.rs"]
mod tests;
