//! File actions module.
//!
//! This module provides functionality for:
//! - Choosing the surviving copy of each duplicate group
//! - Removing the other copies, permanently or via the system trash
//! - A preview mode that reports intended removals without touching files
//!
//! ```no_run
//! use dupsweep::actions::{process_groups, DeleteMode, KeepPolicy};
//!
//! let groups = Vec::new();
//! let report = process_groups(&groups, KeepPolicy::Oldest, DeleteMode::Execute { trash: true });
//! println!("{}", report.summary());
//! ```

pub mod delete;
pub mod retain;

pub use delete::{
    delete_to_trash, delete_verified, permanent_delete, process_group, process_groups,
    validate_preserves_copy, DeleteError, DeleteMode, DeleteResult, DeletionOutcome,
    DeletionRecord, DeletionReport, FileSnapshot,
};
pub use retain::{plan_group, rank, select_retained, KeepPolicy, RetentionPlan};
