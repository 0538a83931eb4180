//! Retention policy: which member of a duplicate group survives.
//!
//! All policies are deterministic for a given group. Ties on modification
//! time keep scan order because the sort is stable.

use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::duplicates::DuplicateGroup;
use crate::scanner::FileEntry;

/// Rule selecting the survivor of a group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum KeepPolicy {
    /// Keep the most recently modified file
    #[default]
    Newest,
    /// Keep the least recently modified file
    Oldest,
    /// Keep the first file in scan order
    First,
}

impl fmt::Display for KeepPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeepPolicy::Newest => write!(f, "newest"),
            KeepPolicy::Oldest => write!(f, "oldest"),
            KeepPolicy::First => write!(f, "first"),
        }
    }
}

/// Order group members by preference under `policy`, most preferred first.
///
/// Returns indices into `files`.
#[must_use]
pub fn rank(files: &[FileEntry], policy: KeepPolicy) -> Vec<usize> {
    let mut order: Vec<usize> = (0..files.len()).collect();
    match policy {
        KeepPolicy::Newest => order.sort_by(|&a, &b| files[b].modified.cmp(&files[a].modified)),
        KeepPolicy::Oldest => order.sort_by(|&a, &b| files[a].modified.cmp(&files[b].modified)),
        KeepPolicy::First => {}
    }
    order
}

/// Index of the retained member, or `None` for an empty slice.
///
/// # Example
///
/// ```
/// use dupsweep::actions::{select_retained, KeepPolicy};
/// use dupsweep::scanner::FileEntry;
/// use std::time::{Duration, SystemTime};
///
/// let old = SystemTime::UNIX_EPOCH;
/// let new = old + Duration::from_secs(60);
/// let files = vec![
///     FileEntry::new("a.txt".into(), 1, old),
///     FileEntry::new("b.txt".into(), 1, new),
/// ];
///
/// assert_eq!(select_retained(&files, KeepPolicy::Newest), Some(1));
/// assert_eq!(select_retained(&files, KeepPolicy::Oldest), Some(0));
/// assert_eq!(select_retained(&files, KeepPolicy::First), Some(0));
/// ```
#[must_use]
pub fn select_retained(files: &[FileEntry], policy: KeepPolicy) -> Option<usize> {
    rank(files, policy).first().copied()
}

/// Survivor and deletion candidates for one group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RetentionPlan {
    /// File that is kept
    pub keep: FileEntry,
    /// Files to remove, in preference order
    pub remove: Vec<FileEntry>,
}

/// Split a group into the retained file and the files to remove.
///
/// Returns `None` for an empty group.
#[must_use]
pub fn plan_group(group: &DuplicateGroup, policy: KeepPolicy) -> Option<RetentionPlan> {
    let mut ranked = rank(&group.files, policy).into_iter();
    let keep = group.files[ranked.next()?].clone();
    let remove = ranked.map(|i| group.files[i].clone()).collect();
    Some(RetentionPlan { keep, remove })
}
