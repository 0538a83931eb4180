//! Report formatters for scan and deletion results.
//!
//! - [`TextOutput`]: the human-readable report, optionally colored
//! - [`JsonOutput`]: the same report as a JSON document
//!
//! # Example
//!
//! ```no_run
//! use dupsweep::duplicates::DuplicateFinder;
//! use dupsweep::error::ExitCode;
//! use dupsweep::output::JsonOutput;
//! use std::path::Path;
//!
//! let finder = DuplicateFinder::with_defaults();
//! let (groups, summary) = finder.find_duplicates(Path::new("."), None).unwrap();
//!
//! let output = JsonOutput::new(&groups, &summary, None, ExitCode::Success);
//! println!("{}", output.to_json_pretty().unwrap());
//! ```

pub mod json;
pub mod text;

pub use json::{JsonDuplicateGroup, JsonFile, JsonOutput, JsonOutputError, JsonSummary};
pub use text::TextOutput;

use std::time::SystemTime;

use chrono::{DateTime, Local, Utc};

/// Format a modification time in local time for the text report.
#[must_use]
pub fn format_local(time: SystemTime) -> String {
    DateTime::<Local>::from(time)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}

/// Format a modification time as RFC 3339 in UTC for the JSON report.
#[must_use]
pub fn format_utc(time: SystemTime) -> String {
    DateTime::<Utc>::from(time).to_rfc3339()
}
