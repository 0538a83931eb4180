//! JSON report for scripting.
//!
//! # Output Schema
//!
//! ```json
//! {
//!   "duplicates": [
//!     {
//!       "key": { "digest": "5d41402abc4b2a76b9719d911017c592" },
//!       "size": 5,
//!       "files": [
//!         { "path": "./a.txt", "size": 5, "modified": "2026-01-01T10:00:00+00:00" },
//!         { "path": "./b.txt", "size": 5, "modified": "2026-01-02T10:00:00+00:00" }
//!       ]
//!     }
//!   ],
//!   "summary": {
//!     "total_files": 3,
//!     "duplicate_groups": 1,
//!     "files_in_groups": 2,
//!     "reclaimable_space": 5,
//!     "exit_code": 0,
//!     "exit_code_name": "DS000"
//!   },
//!   "deletion": null
//! }
//! ```
//!
//! The summary carries more counters than shown; `deletion` is present when
//! `--delete` or `--dry-run` was given.

use std::io::Write;

use serde::Serialize;

use crate::actions::DeletionReport;
use crate::duplicates::{DuplicateGroup, GroupKey, ScanSummary};
use crate::error::ExitCode;
use crate::scanner::FileEntry;

/// One file inside a group.
#[derive(Debug, Clone, Serialize)]
pub struct JsonFile {
    /// Path as discovered by the walk
    pub path: String,
    /// Size in bytes
    pub size: u64,
    /// Modification time, RFC 3339 in UTC
    pub modified: String,
}

impl From<&FileEntry> for JsonFile {
    fn from(entry: &FileEntry) -> Self {
        Self {
            path: entry.path.display().to_string(),
            size: entry.size,
            modified: super::format_utc(entry.modified),
        }
    }
}

/// A duplicate group in JSON form.
#[derive(Debug, Clone, Serialize)]
pub struct JsonDuplicateGroup {
    /// `{"digest": "..."}` or `{"size": N}` in size-only mode
    pub key: GroupKey,
    /// Per-file size in bytes
    pub size: u64,
    /// Members in scan order
    pub files: Vec<JsonFile>,
}

impl From<&DuplicateGroup> for JsonDuplicateGroup {
    fn from(group: &DuplicateGroup) -> Self {
        Self {
            key: group.key.clone(),
            size: group.size,
            files: group.files.iter().map(JsonFile::from).collect(),
        }
    }
}

/// Scan counters in JSON form.
#[derive(Debug, Clone, Serialize)]
pub struct JsonSummary {
    /// Candidate files after filtering
    pub total_files: usize,
    /// Combined size of all candidates
    pub total_size: u64,
    /// Files ruled out because their size was unique
    pub eliminated_by_size: usize,
    /// Files with a digest, computed or cached
    pub hashed_files: usize,
    /// Digests served from the cache
    pub cache_hits: usize,
    /// Cache lookups that missed
    pub cache_misses: usize,
    /// Number of duplicate groups
    pub duplicate_groups: usize,
    /// Files that belong to some group
    pub files_in_groups: usize,
    /// Redundant copies (group members minus one per group)
    pub duplicate_files: usize,
    /// Bytes held by redundant copies
    pub reclaimable_space: u64,
    /// Wall time of the scan in milliseconds
    pub scan_duration_ms: u64,
    /// Directory entries that could not be read
    pub scan_errors: Vec<String>,
    /// Files that could not be hashed
    pub hash_errors: Vec<String>,
    /// Numeric exit code of this run
    pub exit_code: i32,
    /// Code name such as `"DS003"`
    pub exit_code_name: String,
}

impl JsonSummary {
    /// Build from a scan summary and the run's exit code.
    #[must_use]
    pub fn from_scan_summary(summary: &ScanSummary, exit_code: ExitCode) -> Self {
        Self {
            total_files: summary.total_files,
            total_size: summary.total_size,
            eliminated_by_size: summary.eliminated_by_size,
            hashed_files: summary.hashed_files,
            cache_hits: summary.cache_hits,
            cache_misses: summary.cache_misses,
            duplicate_groups: summary.duplicate_groups,
            files_in_groups: summary.files_in_groups,
            duplicate_files: summary.duplicate_files,
            reclaimable_space: summary.reclaimable_space,
            scan_duration_ms: u64::try_from(summary.scan_duration.as_millis()).unwrap_or(u64::MAX),
            scan_errors: summary.scan_errors.iter().map(ToString::to_string).collect(),
            hash_errors: summary.hash_errors.iter().map(ToString::to_string).collect(),
            exit_code: exit_code.as_i32(),
            exit_code_name: exit_code.code_prefix().to_string(),
        }
    }
}

/// Complete JSON document.
#[derive(Debug, Clone, Serialize)]
pub struct JsonOutput {
    /// Groups in report order
    pub duplicates: Vec<JsonDuplicateGroup>,
    /// Scan counters
    pub summary: JsonSummary,
    /// Deletion or preview outcome, if requested
    pub deletion: Option<DeletionReport>,
}

impl JsonOutput {
    /// Assemble the document.
    ///
    /// ```
    /// use dupsweep::duplicates::ScanSummary;
    /// use dupsweep::error::ExitCode;
    /// use dupsweep::output::JsonOutput;
    ///
    /// let output = JsonOutput::new(&[], &ScanSummary::default(), None, ExitCode::Success);
    /// assert!(output.duplicates.is_empty());
    /// assert_eq!(output.summary.exit_code_name, "DS000");
    /// ```
    #[must_use]
    pub fn new(
        groups: &[DuplicateGroup],
        summary: &ScanSummary,
        deletion: Option<&DeletionReport>,
        exit_code: ExitCode,
    ) -> Self {
        Self {
            duplicates: groups.iter().map(JsonDuplicateGroup::from).collect(),
            summary: JsonSummary::from_scan_summary(summary, exit_code),
            deletion: deletion.cloned(),
        }
    }

    /// Serialize to compact JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize to pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write the document followed by a newline.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W, pretty: bool) -> Result<(), JsonOutputError> {
        let json = if pretty {
            self.to_json_pretty()?
        } else {
            self.to_json()?
        };
        writer.write_all(json.as_bytes())?;
        writer.write_all(b"\n")?;
        Ok(())
    }
}

/// Errors while producing JSON output.
#[derive(Debug, thiserror::Error)]
pub enum JsonOutputError {
    /// Serialization failed
    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Writing failed
    #[error("I/O error while writing JSON: {0}")]
    Io(#[from] std::io::Error),
}
