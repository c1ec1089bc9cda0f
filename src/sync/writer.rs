// File writer with backup
//
// Every destination write first copies the existing file to a timestamped
// sibling. Content is always rendered fully in memory before this point, so
// a formatting failure never leaves a half-written target behind.

use anyhow::{Context, Result};
use chrono::Utc;
use std::fs;
use std::path::{Path, PathBuf};

/// Writer that snapshots the previous file version before replacing it
#[derive(Debug, Clone)]
pub struct BackupWriter {
    backups: bool,
}

impl BackupWriter {
    pub fn new() -> Self {
        Self { backups: true }
    }

    /// Writer that skips backups (used by tests and --check-only paths)
    pub fn without_backups() -> Self {
        Self { backups: false }
    }

    /// Write `content` to `path`, returning the backup path if one was taken
    pub fn write(&self, path: &Path, content: &str) -> Result<Option<PathBuf>> {
        let backup = if self.backups && path.exists() {
            let backup = backup_path(path, Utc::now().timestamp_millis());
            fs::copy(path, &backup)
                .with_context(|| format!("failed to back up {}", path.display()))?;
            Some(backup)
        } else {
            None
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
        }
        fs::write(path, content)
            .with_context(|| format!("failed to write {}", path.display()))?;
        Ok(backup)
    }
}

impl Default for BackupWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// `<path>.backup-<unix-ms>`
pub fn backup_path(path: &Path, unix_ms: i64) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    name.push_str(&format!(".backup-{}", unix_ms));
    path.with_file_name(name)
}

/// Backups of `path`, newest first
fn list_backups(path: &Path) -> Result<Vec<(i64, PathBuf)>> {
    let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) else {
        return Ok(Vec::new());
    };
    let Some(file_name) = path.file_name().map(|n| n.to_string_lossy().into_owned()) else {
        return Ok(Vec::new());
    };
    let prefix = format!("{}.backup-", file_name);

    let mut backups: Vec<(i64, PathBuf)> = Vec::new();
    for entry in fs::read_dir(parent)
        .with_context(|| format!("failed to list {}", parent.display()))?
    {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if let Some(suffix) = name.strip_prefix(&prefix) {
            if let Ok(stamp) = suffix.parse::<i64>() {
                backups.push((stamp, entry.path()));
            }
        }
    }
    backups.sort_by(|a, b| b.0.cmp(&a.0));
    Ok(backups)
}

/// Delete all but the newest `keep` backups of `path`.
///
/// Backups are never pruned automatically; this runs only on explicit
/// operator request. Returns the deleted paths.
pub fn prune_backups(path: &Path, keep: usize) -> Result<Vec<PathBuf>> {
    let mut deleted = Vec::new();
    for (_, backup) in list_backups(path)?.into_iter().skip(keep) {
        fs::remove_file(&backup)
            .with_context(|| format!("failed to delete {}", backup.display()))?;
        deleted.push(backup);
    }
    Ok(deleted)
}

/// Restore `path` from its newest backup, returning the backup that was
/// used, or `None` when the file has no backups.
///
/// The current content is snapshotted first, so a rollback can itself be
/// rolled back.
pub fn restore_backup(path: &Path) -> Result<Option<PathBuf>> {
    let Some((_, newest)) = list_backups(path)?.into_iter().next() else {
        return Ok(None);
    };
    if path.exists() {
        let snapshot = backup_path(path, Utc::now().timestamp_millis());
        fs::copy(path, &snapshot)
            .with_context(|| format!("failed to snapshot {}", path.display()))?;
    }
    fs::copy(&newest, path)
        .with_context(|| format!("failed to restore {}", path.display()))?;
    Ok(Some(newest))
}
