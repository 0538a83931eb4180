//! Duplicate detection module.
//!
//! This module provides functionality for:
//! - Size-based file grouping
//! - Per-bucket resolution by content digest or by size alone
//! - Duplicate group management and ordering

pub mod finder;
pub mod groups;

pub use finder::{
    resolve_bucket, BucketOutcome, CompareMode, DuplicateFinder, FinderConfig, FinderError,
    ScanSummary,
};
pub use groups::{group_by_size, sort_groups, DuplicateGroup, GroupKey, GroupingStats, SortOrder};
