// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Writing and removing materialized files.

use crate::error::{Result, SyncError};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> SyncError + '_ {
    move |source| SyncError::IoError {
        path: path.to_path_buf(),
        source,
    }
}

/// Removes a temporary file on drop unless it was renamed into place
struct TempFile {
    path: PathBuf,
    persisted: bool,
}

impl TempFile {
    /// Fixed-length name so long keys still fit the file name limit
    fn next_to(target: &Path) -> Self {
        let dir = target.parent().unwrap_or_else(|| Path::new(""));
        Self {
            path: dir.join(format!(".tmp-{}", uuid::Uuid::new_v4().simple())),
            persisted: false,
        }
    }
}

impl Drop for TempFile {
    fn drop(&mut self) {
        if !self.persisted {
            let _ = std::fs::remove_file(&self.path);
        }
    }
}

/// Atomically replace `target` with `content`. The parent directory must exist.
pub async fn replace_file(target: &Path, content: &[u8]) -> Result<()> {
    let mut temp = TempFile::next_to(target);
    fs::write(&temp.path, content).await.map_err(io_error(&temp.path))?;
    fs::rename(&temp.path, target).await.map_err(io_error(target))?;
    temp.persisted = true;
    Ok(())
}

/// Create or overwrite `dir/file_name`, creating `dir` if needed.
///
/// Content lands in a temporary sibling first and is renamed into place, so
/// readers never see a partially written file.
pub async fn write_file(dir: &Path, file_name: &str, content: &[u8]) -> Result<PathBuf> {
    fs::create_dir_all(dir).await.map_err(io_error(dir))?;

    let target = dir.join(file_name);
    replace_file(&target, content).await?;

    debug!("Wrote {}", target.display());
    Ok(target)
}

/// Remove `dir/file_name`. A missing file is logged and reported as `Ok(false)`.
pub async fn remove_file(dir: &Path, file_name: &str) -> Result<bool> {
    let target = dir.join(file_name);
    match fs::remove_file(&target).await {
        Ok(()) => {
            debug!("Removed {}", target.display());
            Ok(true)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!("{} not found, nothing to remove", target.display());
            Ok(false)
        }
        Err(source) => Err(SyncError::IoError {
            path: target,
            source,
        }),
    }
}
