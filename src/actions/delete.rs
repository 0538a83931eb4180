//! Removal of redundant copies.
//!
//! # Overview
//!
//! For every duplicate group the retention policy picks one survivor; the
//! remaining members are either reported ([`DeleteMode::Preview`]) or removed
//! one at a time ([`DeleteMode::Execute`]). Removal is best-effort: a file that
//! cannot be removed is logged, counted as skipped, and the run continues.
//!
//! # Safety
//!
//! - A plan that would remove every member of a group is rejected.
//! - Before anything in a group is removed, the survivor is checked against
//!   its scan-time size and mtime; if it changed or vanished the whole group
//!   is skipped.
//! - Each candidate is checked the same way right before removal.
//!
//! # Example
//!
//! ```no_run
//! use dupsweep::actions::{process_groups, DeleteMode, KeepPolicy};
//! use dupsweep::duplicates::DuplicateFinder;
//! use std::path::Path;
//!
//! let (groups, _) = DuplicateFinder::with_defaults()
//!     .find_duplicates(Path::new("."), None)
//!     .unwrap();
//! let report = process_groups(&groups, KeepPolicy::Newest, DeleteMode::Preview);
//! println!("{}", report.summary());
//! ```

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use serde::Serialize;
use thiserror::Error;

use super::retain::{plan_group, KeepPolicy};
use crate::duplicates::DuplicateGroup;
use crate::scanner::FileEntry;

/// Error type for deletion operations.
#[derive(Debug, Error)]
pub enum DeleteError {
    /// File was not found (may have been deleted or moved).
    #[error("file not found: {0}")]
    NotFound(PathBuf),

    /// Permission denied when attempting to delete.
    #[error("permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// File was modified since scan.
    #[error("file modified since scan: {0}")]
    Modified(PathBuf),

    /// The file chosen to survive is gone or changed.
    #[error("retained copy is no longer intact: {0}")]
    RetainedCopyChanged(PathBuf),

    /// Trash operation failed.
    #[error("trash operation failed for {path}: {message}")]
    TrashFailed { path: PathBuf, message: String },

    /// Permanent delete operation failed.
    #[error("permanent delete failed for {path}: {message}")]
    PermanentDeleteFailed { path: PathBuf, message: String },

    /// Attempted to delete all copies (at least one must be preserved).
    #[error("cannot delete all copies - at least one file must be preserved")]
    AllCopiesWouldBeDeleted,

    /// General I/O error.
    #[error("I/O error for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl DeleteError {
    /// Get the path associated with this error (if any).
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::NotFound(p)
            | Self::PermissionDenied(p)
            | Self::Modified(p)
            | Self::RetainedCopyChanged(p)
            | Self::TrashFailed { path: p, .. }
            | Self::PermanentDeleteFailed { path: p, .. }
            | Self::Io { path: p, .. } => Some(p),
            Self::AllCopiesWouldBeDeleted => None,
        }
    }

    fn from_metadata_error(path: &Path, e: io::Error) -> Self {
        match e.kind() {
            io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source: e,
            },
        }
    }
}

/// Whether redundant copies are only reported or actually removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteMode {
    /// Report what would be removed; never touch the filesystem
    Preview,
    /// Remove files, to the system trash when `trash` is set
    Execute {
        /// Move to trash instead of unlinking
        trash: bool,
    },
}

impl DeleteMode {
    /// Whether this mode leaves the filesystem untouched.
    #[must_use]
    pub fn is_preview(self) -> bool {
        matches!(self, DeleteMode::Preview)
    }
}

/// Result of a successful deletion operation.
#[derive(Debug, Clone)]
pub struct DeleteResult {
    /// Path that was deleted.
    pub path: PathBuf,
    /// Size of the deleted file in bytes.
    pub size: u64,
    /// Whether deletion was permanent (true) or to trash (false).
    pub permanent: bool,
}

impl DeleteResult {
    /// Create a new delete result.
    #[must_use]
    pub fn new(path: PathBuf, size: u64, permanent: bool) -> Self {
        Self {
            path,
            size,
            permanent,
        }
    }
}

/// What happened to one deletion candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DeletionOutcome {
    /// Removed (or moved to trash)
    Deleted,
    /// Preview only
    WouldDelete,
    /// Left in place
    Skipped {
        /// Why the file was left in place
        reason: String,
    },
}

/// Per-file line of a [`DeletionReport`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeletionRecord {
    /// Candidate path
    pub path: PathBuf,
    /// Size from the scan
    pub size: u64,
    /// Retained copy of the same group
    pub kept: PathBuf,
    /// Outcome
    #[serde(flatten)]
    pub outcome: DeletionOutcome,
}

/// Aggregate counters across all processed groups.
///
/// In preview mode `deleted` and `bytes_freed` count what would have been
/// removed.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DeletionReport {
    /// Whether this report comes from a preview run
    pub preview: bool,
    /// Files removed (or that would be removed)
    pub deleted: usize,
    /// Files left in place because of an error
    pub skipped: usize,
    /// Bytes freed (or that would be freed)
    pub bytes_freed: u64,
    /// Per-file outcomes in processing order
    pub records: Vec<DeletionRecord>,
}

impl DeletionReport {
    /// Create an empty report for `mode`.
    #[must_use]
    pub fn new(mode: DeleteMode) -> Self {
        Self {
            preview: mode.is_preview(),
            ..Self::default()
        }
    }

    /// Check if every candidate was handled without error.
    #[must_use]
    pub fn all_succeeded(&self) -> bool {
        self.skipped == 0
    }

    /// Paths actually removed from disk; empty for a preview.
    pub fn removed_paths(&self) -> impl Iterator<Item = &Path> {
        self.records
            .iter()
            .filter(|record| record.outcome == DeletionOutcome::Deleted)
            .map(|record| record.path.as_path())
    }

    /// Human-readable summary of the operation.
    #[must_use]
    pub fn summary(&self) -> String {
        let freed = bytesize::ByteSize(self.bytes_freed);
        if self.preview {
            format!(
                "Would delete {} file(s), would free {}",
                self.deleted, freed
            )
        } else {
            format!(
                "Deleted {} file(s), skipped {}, freed {}",
                self.deleted, self.skipped, freed
            )
        }
    }

    fn record(&mut self, file: &FileEntry, kept: &Path, outcome: DeletionOutcome) {
        match outcome {
            DeletionOutcome::Deleted | DeletionOutcome::WouldDelete => {
                self.deleted += 1;
                self.bytes_freed += file.size;
            }
            DeletionOutcome::Skipped { .. } => self.skipped += 1,
        }
        self.records.push(DeletionRecord {
            path: file.path.clone(),
            size: file.size,
            kept: kept.to_path_buf(),
            outcome,
        });
    }
}

/// File metadata snapshot used to detect changes after the scan.
#[derive(Debug, Clone)]
pub struct FileSnapshot {
    /// Path to the file.
    pub path: PathBuf,
    /// File size in bytes.
    pub size: u64,
    /// Last modification time.
    pub mtime: Option<SystemTime>,
}

impl FileSnapshot {
    /// Create a snapshot of a file's current state.
    ///
    /// # Errors
    ///
    /// Returns error if file doesn't exist or can't be accessed.
    pub fn capture(path: &Path) -> Result<Self, DeleteError> {
        let metadata =
            fs::metadata(path).map_err(|e| DeleteError::from_metadata_error(path, e))?;

        Ok(Self {
            path: path.to_path_buf(),
            size: metadata.len(),
            mtime: metadata.modified().ok(),
        })
    }

    /// Snapshot as recorded by the scan.
    #[must_use]
    pub fn from_entry(entry: &FileEntry) -> Self {
        Self {
            path: entry.path.clone(),
            size: entry.size,
            mtime: Some(entry.modified),
        }
    }

    /// Verify that the file still matches this snapshot.
    ///
    /// # Errors
    ///
    /// Returns error if file was modified, deleted, or can't be accessed.
    pub fn verify(&self) -> Result<(), DeleteError> {
        let current = Self::capture(&self.path)?;

        if let (Some(orig), Some(curr)) = (self.mtime, current.mtime) {
            if orig != curr {
                log::warn!(
                    "File modified since scan: {} (mtime changed)",
                    self.path.display()
                );
                return Err(DeleteError::Modified(self.path.clone()));
            }
        }

        if self.size != current.size {
            log::warn!(
                "File modified since scan: {} (size changed from {} to {})",
                self.path.display(),
                self.size,
                current.size
            );
            return Err(DeleteError::Modified(self.path.clone()));
        }

        Ok(())
    }
}

/// Move a single file to the system trash.
///
/// # Errors
///
/// - `NotFound` if the file doesn't exist
/// - `PermissionDenied` if the file can't be inspected
/// - `TrashFailed` if the trash operation fails
pub fn delete_to_trash(path: &Path) -> Result<DeleteResult, DeleteError> {
    let size = fs::metadata(path)
        .map_err(|e| DeleteError::from_metadata_error(path, e))?
        .len();

    trash::delete(path).map_err(|e| {
        log::error!("Trash operation failed for {}: {}", path.display(), e);
        DeleteError::TrashFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        }
    })?;

    log::debug!("Moved to trash: {} ({} bytes)", path.display(), size);

    Ok(DeleteResult::new(path.to_path_buf(), size, false))
}

/// Permanently delete a single file.
///
/// # Errors
///
/// - `NotFound` if the file doesn't exist
/// - `PermissionDenied` if the file can't be inspected
/// - `PermanentDeleteFailed` if the delete operation fails
pub fn permanent_delete(path: &Path) -> Result<DeleteResult, DeleteError> {
    let size = fs::metadata(path)
        .map_err(|e| DeleteError::from_metadata_error(path, e))?
        .len();

    fs::remove_file(path).map_err(|e| {
        log::error!("Permanent delete failed for {}: {}", path.display(), e);
        DeleteError::PermanentDeleteFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        }
    })?;

    log::debug!("Deleted: {} ({} bytes)", path.display(), size);

    Ok(DeleteResult::new(path.to_path_buf(), size, true))
}

/// Delete a file after checking it still matches its scan snapshot.
///
/// # Errors
///
/// - `Modified` if the file was changed since scan
/// - Other errors from [`delete_to_trash`] or [`permanent_delete`]
pub fn delete_verified(entry: &FileEntry, trash: bool) -> Result<DeleteResult, DeleteError> {
    FileSnapshot::from_entry(entry).verify()?;

    if trash {
        delete_to_trash(&entry.path)
    } else {
        permanent_delete(&entry.path)
    }
}

/// Validate that a selection doesn't delete all copies.
///
/// # Errors
///
/// Returns `AllCopiesWouldBeDeleted` if all copies would be deleted.
///
/// # Example
///
/// ```
/// use dupsweep::actions::validate_preserves_copy;
/// use std::path::PathBuf;
///
/// let group = vec![PathBuf::from("/original.txt"), PathBuf::from("/copy.txt")];
///
/// assert!(validate_preserves_copy(&[PathBuf::from("/copy.txt")], &group).is_ok());
/// assert!(validate_preserves_copy(&group, &group).is_err());
/// ```
pub fn validate_preserves_copy(
    selected_paths: &[PathBuf],
    group_paths: &[PathBuf],
) -> Result<(), DeleteError> {
    let selected_set: HashSet<&PathBuf> = selected_paths.iter().collect();
    let preserved_count = group_paths
        .iter()
        .filter(|p| !selected_set.contains(p))
        .count();

    if preserved_count == 0 {
        log::error!(
            "Attempted to delete all {} copies of a duplicate group",
            group_paths.len()
        );
        Err(DeleteError::AllCopiesWouldBeDeleted)
    } else {
        Ok(())
    }
}

/// Apply the retention policy to one group, updating `report`.
pub fn process_group(
    group: &DuplicateGroup,
    policy: KeepPolicy,
    mode: DeleteMode,
    report: &mut DeletionReport,
) {
    let Some(plan) = plan_group(group, policy) else {
        return;
    };

    let selected: Vec<PathBuf> = plan.remove.iter().map(|f| f.path.clone()).collect();
    let guard = validate_preserves_copy(&selected, &group.paths()).and_then(|()| {
        if mode.is_preview() {
            Ok(())
        } else {
            FileSnapshot::from_entry(&plan.keep)
                .verify()
                .map_err(|_| DeleteError::RetainedCopyChanged(plan.keep.path.clone()))
        }
    });

    if let Err(e) = guard {
        log::warn!("Skipping group of {}: {}", plan.keep.path.display(), e);
        let reason = e.to_string();
        for file in &plan.remove {
            report.record(
                file,
                &plan.keep.path,
                DeletionOutcome::Skipped {
                    reason: reason.clone(),
                },
            );
        }
        return;
    }

    for file in &plan.remove {
        let outcome = match mode {
            DeleteMode::Preview => {
                log::debug!("Would delete: {}", file.path.display());
                DeletionOutcome::WouldDelete
            }
            DeleteMode::Execute { trash } => match delete_verified(file, trash) {
                Ok(_) => DeletionOutcome::Deleted,
                Err(e) => {
                    log::warn!("Failed to delete {}: {}", file.path.display(), e);
                    DeletionOutcome::Skipped {
                        reason: e.to_string(),
                    }
                }
            },
        };
        report.record(file, &plan.keep.path, outcome);
    }
}

/// Apply the retention policy to every group.
#[must_use]
pub fn process_groups(
    groups: &[DuplicateGroup],
    policy: KeepPolicy,
    mode: DeleteMode,
) -> DeletionReport {
    let mut report = DeletionReport::new(mode);
    for group in groups {
        process_group(group, policy, mode, &mut report);
    }
    log::debug!("{}", report.summary());
    report
}
