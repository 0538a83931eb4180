//! Command-line interface definitions for dupsweep.
//!
//! This module defines all CLI arguments and options using the clap derive API.
//!
//! # Example
//!
//! ```bash
//! # Report duplicates directly inside ~/Downloads
//! dupsweep ~/Downloads
//!
//! # Recurse, only look at photos of at least 100 KB
//! dupsweep -r ~/Pictures -e jpg,png --min-size 100KB
//!
//! # Show what would be removed, keeping the oldest copy
//! dupsweep -r ~/Music --dry-run --keep oldest
//!
//! # Remove redundant copies to the system trash
//! dupsweep -r ~/Music --delete --trash
//! ```

use std::path::{Path, PathBuf};

use clap::{Parser, ValueEnum};

use crate::actions::KeepPolicy;
use crate::duplicates::{CompareMode, SortOrder};
use crate::scanner::HashAlgorithm;

/// Find duplicate files and optionally remove redundant copies.
///
/// Files are first bucketed by size; same-size files are then compared by a
/// content digest. Digests are cached in `.dup_cache.json` inside the scanned
/// directory so later runs only hash new or resized files.
#[derive(Debug, Parser)]
#[command(name = "dupsweep")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory to search
    #[arg(value_name = "DIRECTORY", default_value = ".")]
    pub directory: PathBuf,

    /// Search recursively in subdirectories
    #[arg(short, long)]
    pub recursive: bool,

    /// Include hidden files and directories (starting with .)
    #[arg(short = 'a', long)]
    pub include_hidden: bool,

    /// Only consider these extensions (comma separated, e.g. jpg,.PNG)
    #[arg(short, long, value_name = "LIST", value_delimiter = ',')]
    pub extensions: Vec<String>,

    /// Minimum file size to consider, inclusive (e.g., 1KB, 1MB, 1GB)
    ///
    /// Supports suffixes: B, KB, KiB, MB, MiB, GB, GiB, TB, TiB
    #[arg(long, value_name = "SIZE", value_parser = parse_size)]
    pub min_size: Option<u64>,

    /// Maximum file size to consider, inclusive (e.g., 1KB, 1MB, 1GB)
    ///
    /// Supports suffixes: B, KB, KiB, MB, MiB, GB, GiB, TB, TiB
    #[arg(long, value_name = "SIZE", value_parser = parse_size)]
    pub max_size: Option<u64>,

    /// Compare files by size only, without hashing
    ///
    /// Much faster, but files of equal size with different content are
    /// reported as duplicates.
    #[arg(long, visible_alias = "no-hash")]
    pub size_only: bool,

    /// Don't read or write the hash cache
    #[arg(long)]
    pub no_cache: bool,

    /// Order of duplicate groups in the report [default: size]
    #[arg(short, long, value_enum)]
    pub sort: Option<SortOrder>,

    /// Delete redundant copies
    #[arg(short, long, conflicts_with = "dry_run")]
    pub delete: bool,

    /// Show what would be deleted without deleting anything
    #[arg(long)]
    pub dry_run: bool,

    /// Which copy to keep when deleting [default: newest]
    #[arg(long, value_enum)]
    pub keep: Option<KeepPolicy>,

    /// Move deleted files to the system trash instead of removing them
    #[arg(long, requires = "delete")]
    pub trash: bool,

    /// Content digest algorithm [default: md5]
    #[arg(long, value_enum)]
    pub algorithm: Option<HashAlgorithm>,

    /// Number of I/O threads for hashing [default: 4]
    ///
    /// Lower values reduce disk thrashing on HDDs.
    #[arg(long, value_name = "N")]
    pub io_threads: Option<usize>,

    /// Report format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,

    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors and the report
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, env = "NO_COLOR")]
    pub no_color: bool,

    /// Print fatal errors as a JSON object on stderr
    #[arg(long)]
    pub json_errors: bool,
}

impl Cli {
    /// The comparison mode selected on the command line.
    #[must_use]
    pub fn compare_mode(&self) -> CompareMode {
        if self.size_only {
            CompareMode::SizeOnly
        } else {
            CompareMode::Hash
        }
    }

    /// Whether a deletion pass (real or preview) was requested.
    #[must_use]
    pub fn wants_deletion(&self) -> bool {
        self.delete || self.dry_run
    }

    /// Check argument combinations clap cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`UsageError`] describing the first problem found.
    pub fn validate(&self) -> Result<(), UsageError> {
        if let (Some(min), Some(max)) = (self.min_size, self.max_size) {
            if min > max {
                return Err(UsageError::MinExceedsMax { min, max });
            }
        }
        if self.io_threads == Some(0) {
            return Err(UsageError::ZeroIoThreads);
        }
        validate_directory(&self.directory)
    }
}

fn validate_directory(path: &Path) -> Result<(), UsageError> {
    if !path.exists() {
        return Err(UsageError::PathNotFound(path.to_path_buf()));
    }
    if !path.is_dir() {
        return Err(UsageError::NotADirectory(path.to_path_buf()));
    }
    Ok(())
}

/// Invalid argument combination, reported before any scanning.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum UsageError {
    /// `--min-size` is larger than `--max-size`.
    #[error("--min-size ({min}) is greater than --max-size ({max})")]
    MinExceedsMax {
        /// Requested minimum
        min: u64,
        /// Requested maximum
        max: u64,
    },

    /// `--io-threads 0`.
    #[error("--io-threads must be at least 1")]
    ZeroIoThreads,

    /// The directory does not exist.
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    /// The path exists but is not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// The configured cache file name is not a plain file name.
    #[error("cache_file_name must be a plain file name, got {0:?}")]
    InvalidCacheFileName(String),
}

/// Output format for scan results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable report
    #[default]
    Text,
    /// JSON report for scripting
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Parse a human-readable size string into bytes.
///
/// Supports suffixes: B, KB, KiB, MB, MiB, GB, GiB, TB, TiB
/// Case-insensitive. Numbers without suffix are treated as bytes.
///
/// # Examples
///
/// ```
/// use dupsweep::cli::parse_size;
///
/// assert_eq!(parse_size("1024").unwrap(), 1024);
/// assert_eq!(parse_size("1KB").unwrap(), 1000);
/// assert_eq!(parse_size("1KiB").unwrap(), 1024);
/// assert_eq!(parse_size("1MiB").unwrap(), 1_048_576);
/// ```
///
/// # Errors
///
/// Returns an error if the string is empty, contains an invalid number,
/// a negative number, or an unknown size suffix.
pub fn parse_size(s: &str) -> Result<u64, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("Size cannot be empty".to_string());
    }

    let (num_str, suffix) = match s.find(|c: char| !c.is_ascii_digit() && c != '.') {
        Some(idx) => (&s[..idx], s[idx..].trim().to_uppercase()),
        None => (s, String::new()),
    };

    let num: f64 = num_str
        .parse()
        .map_err(|_| format!("Invalid number: '{num_str}'"))?;

    let multiplier: u64 = match suffix.as_str() {
        "" | "B" => 1,
        "KB" | "K" => 1_000,
        "KIB" => 1_024,
        "MB" | "M" => 1_000_000,
        "MIB" => 1_048_576,
        "GB" | "G" => 1_000_000_000,
        "GIB" => 1_073_741_824,
        "TB" | "T" => 1_000_000_000_000,
        "TIB" => 1_099_511_627_776,
        _ => return Err(format!("Unknown size suffix: '{suffix}'")),
    };

    Ok((num * multiplier as f64) as u64)
}
