//! Duplicate grouping and size-based file organization.
//!
//! # Overview
//!
//! This module provides the size-bucket pre-filter (phase 1 of duplicate
//! detection) and the [`DuplicateGroup`] type produced by the resolver.
//!
//! ## Size Grouping
//!
//! Files with different sizes cannot have equal content, so grouping by exact
//! byte size removes every file with a unique size before any content is read.
//! Zero-byte files are ordinary candidates and bucket together at size 0.
//!
//! # Example
//!
//! ```
//! use dupsweep::scanner::FileEntry;
//! use dupsweep::duplicates::group_by_size;
//! use std::path::PathBuf;
//! use std::time::SystemTime;
//!
//! let files = vec![
//!     FileEntry::new(PathBuf::from("/file1.txt"), 1024, SystemTime::now()),
//!     FileEntry::new(PathBuf::from("/file2.txt"), 1024, SystemTime::now()),
//!     FileEntry::new(PathBuf::from("/file3.txt"), 2048, SystemTime::now()),
//! ];
//!
//! // Only buckets with 2+ files are potential duplicates
//! let (buckets, stats) = group_by_size(files);
//!
//! assert_eq!(stats.total_files, 3);
//! assert_eq!(stats.potential_duplicates, 2);
//! assert_eq!(buckets.len(), 1);
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::scanner::{Digest, FileEntry};

/// Identifier of a duplicate group.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupKey {
    /// Grouped on byte size alone (size-only mode)
    Size(u64),
    /// Grouped on equal content digest
    Digest(Digest),
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupKey::Size(size) => write!(f, "size {size}"),
            GroupKey::Digest(digest) => write!(f, "{digest}"),
        }
    }
}

/// Files considered equal under the active comparison mode.
///
/// Always holds at least two files, in scan order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateGroup {
    /// Digest or size that identifies this group
    pub key: GroupKey,
    /// File size in bytes (shared by all members)
    pub size: u64,
    /// Member files in scan order
    pub files: Vec<FileEntry>,
}

impl DuplicateGroup {
    /// Create a new duplicate group.
    ///
    /// # Arguments
    ///
    /// * `key` - Digest or size identifying the group
    /// * `size` - File size in bytes
    /// * `files` - Member files, in scan order
    #[must_use]
    pub fn new(key: GroupKey, size: u64, files: Vec<FileEntry>) -> Self {
        debug_assert!(files.iter().all(|f| f.size == size));
        Self { key, size, files }
    }

    /// Number of files in this group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if this group is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Whether membership was confirmed by content digest.
    #[must_use]
    pub fn is_hash_confirmed(&self) -> bool {
        matches!(self.key, GroupKey::Digest(_))
    }

    /// Total size of all files in this group.
    #[must_use]
    pub fn total_size(&self) -> u64 {
        self.size * self.files.len() as u64
    }

    /// Space freed by keeping a single copy.
    #[must_use]
    pub fn wasted_space(&self) -> u64 {
        self.size * self.duplicate_count() as u64
    }

    /// Number of redundant copies (total - 1 retained).
    #[must_use]
    pub fn duplicate_count(&self) -> usize {
        self.files.len().saturating_sub(1)
    }

    /// Get just the paths of files in this group.
    #[must_use]
    pub fn paths(&self) -> Vec<PathBuf> {
        self.files.iter().map(|f| f.path.clone()).collect()
    }

    fn first_path(&self) -> Option<&PathBuf> {
        self.files.first().map(|f| &f.path)
    }
}

/// Ordering of groups in the report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Largest per-file size first
    #[default]
    Size,
    /// Most members first
    Count,
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortOrder::Size => write!(f, "size"),
            SortOrder::Count => write!(f, "count"),
        }
    }
}

/// Sort groups for display.
///
/// `Size` orders by per-file size descending, then member count descending.
/// `Count` orders by member count descending, then per-file size descending.
/// Remaining ties fall back to the first member's path so the order never
/// depends on hashing schedule.
pub fn sort_groups(groups: &mut [DuplicateGroup], order: SortOrder) {
    groups.sort_by(|a, b| {
        let primary = match order {
            SortOrder::Size => b.size.cmp(&a.size).then(b.len().cmp(&a.len())),
            SortOrder::Count => b.len().cmp(&a.len()).then(b.size.cmp(&a.size)),
        };
        primary.then_with(|| a.first_path().cmp(&b.first_path()))
    });
}

/// Statistics from size grouping phase.
///
/// Provides insight into the distribution of files by size and
/// the effectiveness of the size grouping filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupingStats {
    /// Total number of files processed
    pub total_files: usize,
    /// Total size of all files in bytes
    pub total_size: u64,
    /// Number of unique file sizes
    pub unique_sizes: usize,
    /// Number of files that could be duplicates (in buckets of 2+)
    pub potential_duplicates: usize,
    /// Number of files eliminated as unique (singleton buckets)
    pub eliminated_unique: usize,
    /// Number of empty files encountered
    pub empty_files: usize,
    /// Number of size buckets with 2+ files
    pub duplicate_groups: usize,
}

impl GroupingStats {
    /// Percentage of files eliminated by size grouping.
    #[must_use]
    pub fn elimination_rate(&self) -> f64 {
        if self.total_files == 0 {
            0.0
        } else {
            (self.eliminated_unique as f64 / self.total_files as f64) * 100.0
        }
    }
}

/// Group files by size (phase 1 of duplicate detection).
///
/// # Arguments
///
/// * `files` - File entries in scan order
///
/// # Returns
///
/// A tuple of:
/// - `BTreeMap<u64, Vec<FileEntry>>` - Buckets with 2+ files, keyed by size;
///   scan order is preserved inside each bucket
/// - `GroupingStats` - Statistics about the grouping operation
///
/// No file I/O is performed.
///
/// # Example
///
/// ```
/// use dupsweep::scanner::FileEntry;
/// use dupsweep::duplicates::group_by_size;
/// use std::path::PathBuf;
/// use std::time::SystemTime;
///
/// let files = vec![
///     FileEntry::new(PathBuf::from("/a.txt"), 100, SystemTime::now()),
///     FileEntry::new(PathBuf::from("/b.txt"), 100, SystemTime::now()),
///     FileEntry::new(PathBuf::from("/c.txt"), 200, SystemTime::now()),
/// ];
///
/// let (buckets, stats) = group_by_size(files);
///
/// assert_eq!(buckets.len(), 1);
/// assert_eq!(buckets[&100].len(), 2);
/// assert_eq!(stats.eliminated_unique, 1);
/// ```
#[must_use]
pub fn group_by_size(
    files: impl IntoIterator<Item = FileEntry>,
) -> (BTreeMap<u64, Vec<FileEntry>>, GroupingStats) {
    let mut all_buckets: BTreeMap<u64, Vec<FileEntry>> = BTreeMap::new();
    let mut stats = GroupingStats::default();

    for file in files {
        stats.total_files += 1;
        stats.total_size += file.size;
        if file.size == 0 {
            stats.empty_files += 1;
        }
        all_buckets.entry(file.size).or_default().push(file);
    }

    stats.unique_sizes = all_buckets.len();

    all_buckets.retain(|size, files| {
        if files.len() == 1 {
            stats.eliminated_unique += 1;
            log::trace!(
                "Eliminated unique size {}: {}",
                size,
                files[0].path.display()
            );
            false
        } else {
            stats.potential_duplicates += files.len();
            stats.duplicate_groups += 1;
            log::debug!(
                "Size bucket {} bytes: {} potential duplicates",
                size,
                files.len()
            );
            true
        }
    });

    log::debug!(
        "Size grouping: {} files → {} potential duplicates ({:.1}% eliminated)",
        stats.total_files,
        stats.potential_duplicates,
        stats.elimination_rate()
    );

    (all_buckets, stats)
}
