//! Directory walker implementation using walkdir.
//!
//! # Overview
//!
//! This module provides the [`Walker`] struct for traversing a directory and
//! collecting candidate file metadata for duplicate detection.
//!
//! # Features
//!
//! - Recursive or direct-children-only traversal
//! - Hidden file and directory filtering (dot names)
//! - Case-insensitive extension filtering
//! - Inclusive min/max size filtering
//! - Excluded file names (the hash cache file)
//! - Graceful shutdown via atomic flag
//!
//! Entries within each directory are visited in file-name order, so the
//! candidate order (and with it the `first` retention policy) is stable for
//! a given tree.
//!
//! Symbolic links are not followed and are never candidates: deleting a link
//! while keeping its target, or the reverse, is not a dedup.

use std::fs::Metadata;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::SystemTime;

use walkdir::{DirEntry, WalkDir};

use super::{FileEntry, ScanError, WalkerConfig};

/// Directory walker for candidate discovery.
#[derive(Debug)]
pub struct Walker {
    /// Root path to walk
    root: PathBuf,
    /// Walker configuration
    config: WalkerConfig,
    /// Optional shutdown flag for graceful termination
    shutdown_flag: Option<Arc<AtomicBool>>,
}

impl Walker {
    /// Create a new walker for the given path.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use dupsweep::scanner::{Walker, WalkerConfig};
    /// use std::path::Path;
    ///
    /// let walker = Walker::new(Path::new("."), WalkerConfig::default());
    /// ```
    #[must_use]
    pub fn new(path: &Path, config: WalkerConfig) -> Self {
        Self {
            root: path.to_path_buf(),
            config,
            shutdown_flag: None,
        }
    }

    /// Set the shutdown flag for graceful termination.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Check if shutdown has been requested.
    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    /// Whether a directory entry name is hidden.
    fn is_hidden(entry: &DirEntry) -> bool {
        entry.file_name().to_string_lossy().starts_with('.')
    }

    /// Check if a file passes size filters (both bounds inclusive).
    fn passes_size_filter(&self, size: u64) -> bool {
        if let Some(min) = self.config.min_size {
            if size < min {
                return false;
            }
        }
        if let Some(max) = self.config.max_size {
            if size > max {
                return false;
            }
        }
        true
    }

    /// Check if a file passes the extension filter.
    fn passes_extension_filter(&self, path: &Path) -> bool {
        if self.config.extensions.is_empty() {
            return true;
        }

        let extension = path
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
            .unwrap_or_default();

        self.config.extensions.iter().any(|e| *e == extension)
    }

    /// Check if a file name is excluded outright.
    fn is_excluded_name(&self, entry: &DirEntry) -> bool {
        let name = entry.file_name().to_string_lossy();
        self.config.excluded_names.iter().any(|n| *n == name)
    }

    /// Walk the directory, yielding candidate file entries.
    ///
    /// Errors are yielded as [`ScanError`] values rather than stopping
    /// iteration; an unreadable directory drops only its own subtree.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use dupsweep::scanner::{Walker, WalkerConfig};
    /// use std::path::Path;
    ///
    /// let walker = Walker::new(Path::new("."), WalkerConfig::default());
    /// let files: Vec<_> = walker.walk().filter_map(Result::ok).collect();
    /// println!("Found {} files", files.len());
    /// ```
    pub fn walk(&self) -> impl Iterator<Item = Result<FileEntry, ScanError>> + '_ {
        let max_depth = if self.config.recursive { usize::MAX } else { 1 };
        let include_hidden = self.config.include_hidden;

        let walk_dir = WalkDir::new(&self.root)
            .follow_links(false)
            .max_depth(max_depth)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(move |entry| {
                // Never prune the root, even if it is a dot directory
                entry.depth() == 0 || include_hidden || !Self::is_hidden(entry)
            });

        walk_dir
            .take_while(move |_| {
                if self.is_shutdown_requested() {
                    log::debug!("Walker: Shutdown requested, stopping iteration");
                    false
                } else {
                    true
                }
            })
            .filter_map(move |entry_result| match entry_result {
                Ok(entry) => {
                    let file_type = entry.file_type();

                    // Only regular files are candidates
                    if !file_type.is_file() {
                        if file_type.is_symlink() {
                            log::trace!("Skipping symlink: {}", entry.path().display());
                        }
                        return None;
                    }

                    if self.is_excluded_name(&entry) {
                        log::trace!("Skipping excluded file: {}", entry.path().display());
                        return None;
                    }

                    if !self.passes_extension_filter(entry.path()) {
                        log::trace!(
                            "Skipping file due to extension filter: {}",
                            entry.path().display()
                        );
                        return None;
                    }

                    let metadata = match entry.metadata() {
                        Ok(m) => m,
                        Err(e) => {
                            let path = entry.path().to_path_buf();
                            return Some(self.handle_walk_error(path, e));
                        }
                    };

                    self.process_file_entry(entry.into_path(), &metadata)
                }
                Err(e) => {
                    let path = e
                        .path()
                        .map_or_else(|| self.root.clone(), std::borrow::ToOwned::to_owned);
                    Some(self.handle_walk_error(path, e))
                }
            })
    }

    /// Apply metadata filters and build the FileEntry.
    fn process_file_entry(
        &self,
        path: PathBuf,
        metadata: &Metadata,
    ) -> Option<Result<FileEntry, ScanError>> {
        let size = metadata.len();

        if !self.passes_size_filter(size) {
            log::trace!(
                "Skipping file due to size filter ({}): {}",
                size,
                path.display()
            );
            return None;
        }

        let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);

        Some(Ok(FileEntry::new(path, size, modified)))
    }

    /// Convert walkdir errors into ScanError, logging them.
    fn handle_walk_error(
        &self,
        path: PathBuf,
        error: walkdir::Error,
    ) -> Result<FileEntry, ScanError> {
        use std::io::ErrorKind;

        let kind = error.io_error().map(std::io::Error::kind);
        match kind {
            Some(ErrorKind::PermissionDenied) => {
                log::warn!("Permission denied: {}", path.display());
                Err(ScanError::PermissionDenied(path))
            }
            Some(ErrorKind::NotFound) => {
                log::debug!("Path vanished during scan: {}", path.display());
                Err(ScanError::NotFound(path))
            }
            _ => {
                log::warn!("Walker error for {}: {}", path.display(), error);
                let source = error
                    .into_io_error()
                    .unwrap_or_else(|| std::io::Error::other("filesystem loop detected"));
                Err(ScanError::Io { path, source })
            }
        }
    }
}
