//! Duplicate finder implementation.
//!
//! # Overview
//!
//! This module orchestrates the duplicate detection pipeline:
//! 1. **Walk**: collect candidate files (see [`crate::scanner::walker`])
//! 2. **Size grouping**: bucket candidates by exact size (see [`crate::duplicates::groups`])
//! 3. **Resolve**: per bucket, either emit it whole ([`CompareMode::SizeOnly`])
//!    or confirm members by full-content digest ([`CompareMode::Hash`])
//!
//! Digests inside a bucket are computed on a bounded rayon pool. The hash
//! cache is only read from worker threads; new digests are written back once
//! the bucket completes, in scan order, so group membership and order never
//! depend on thread scheduling.
//!
//! # Example
//!
//! ```no_run
//! use dupsweep::cache::HashCache;
//! use dupsweep::duplicates::{DuplicateFinder, FinderConfig};
//! use std::path::Path;
//!
//! let finder = DuplicateFinder::new(FinderConfig::default().with_io_threads(4));
//! let mut cache = HashCache::new();
//! let (groups, summary) = finder
//!     .find_duplicates(Path::new("."), Some(&mut cache))
//!     .unwrap();
//!
//! println!("{} groups, {} reclaimable", groups.len(), summary.reclaimable_display());
//! ```

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use clap::ValueEnum;
use rayon::prelude::*;
use rayon::ThreadPool;
use serde::{Deserialize, Serialize};

use super::groups::{group_by_size, DuplicateGroup, GroupKey};
use crate::cache::HashCache;
use crate::progress::ProgressCallback;
use crate::scanner::{Digest, FileEntry, HashAlgorithm, HashError, Hasher, ScanError, Walker, WalkerConfig};

/// How members of a size bucket are compared.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum CompareMode {
    /// Confirm by full-content digest
    #[default]
    Hash,
    /// Treat equal size as equal content (fast, may report false duplicates)
    SizeOnly,
}

impl fmt::Display for CompareMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompareMode::Hash => write!(f, "hash"),
            CompareMode::SizeOnly => write!(f, "size-only"),
        }
    }
}

/// Shared processed-candidate counter.
///
/// The counter and the callback invocation happen under one lock, so
/// reported positions never go backwards even when workers race.
struct ProgressTracker<'a> {
    callback: Option<&'a dyn ProgressCallback>,
    processed: Mutex<usize>,
}

impl<'a> ProgressTracker<'a> {
    fn new(callback: Option<&'a dyn ProgressCallback>) -> Self {
        Self {
            callback,
            processed: Mutex::new(0),
        }
    }

    fn advance(&self, count: usize, path: &Path) {
        let mut processed = self
            .processed
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        *processed += count;
        if let Some(callback) = self.callback {
            callback.on_progress(*processed, path.to_string_lossy().as_ref());
        }
    }

    fn processed(&self) -> usize {
        *self
            .processed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Result of resolving one size bucket.
#[derive(Debug, Default)]
pub struct BucketOutcome {
    /// Groups with 2+ members, in order of first appearance
    pub groups: Vec<DuplicateGroup>,
    /// Files dropped because they could not be hashed
    pub errors: Vec<HashError>,
    /// Files whose digest was computed or read from cache
    pub hashed_files: usize,
    /// Whether hashing stopped early on shutdown
    pub interrupted: bool,
}

/// Resolve one size bucket into duplicate groups.
///
/// # Arguments
///
/// * `size` - Byte size shared by every file in `files`
/// * `files` - Bucket members in scan order (2 or more)
/// * `mode` - Comparison mode
/// * `hasher` - Digest implementation
/// * `cache` - Optional digest cache; consulted per file, updated afterwards
/// * `pool` - Worker pool for digests
/// * `progress` - Optional callback receiving the running candidate count
///
/// The running count starts from zero for each call; use
/// [`DuplicateFinder`] for totals that span buckets.
pub fn resolve_bucket(
    size: u64,
    files: Vec<FileEntry>,
    mode: CompareMode,
    hasher: &Hasher,
    cache: Option<&mut HashCache>,
    pool: &ThreadPool,
    progress: Option<&dyn ProgressCallback>,
) -> BucketOutcome {
    let tracker = ProgressTracker::new(progress);
    resolve_with_tracker(size, files, mode, hasher, cache, pool, &tracker)
}

fn resolve_with_tracker(
    size: u64,
    files: Vec<FileEntry>,
    mode: CompareMode,
    hasher: &Hasher,
    cache: Option<&mut HashCache>,
    pool: &ThreadPool,
    tracker: &ProgressTracker<'_>,
) -> BucketOutcome {
    let mut outcome = BucketOutcome::default();

    if mode == CompareMode::SizeOnly {
        if let Some(first) = files.first() {
            tracker.advance(files.len(), &first.path);
        }
        if files.len() > 1 {
            outcome
                .groups
                .push(DuplicateGroup::new(GroupKey::Size(size), size, files));
        }
        return outcome;
    }

    let cache_view: Option<&HashCache> = cache.as_deref();
    let results: Vec<(FileEntry, Result<Digest, HashError>, bool)> = pool.install(|| {
        files
            .into_par_iter()
            .map(|file| {
                if let Some(cached) = cache_view.and_then(|c| c.get(&file.path, file.size)) {
                    log::trace!("Cache hit: {}", file.path.display());
                    tracker.advance(1, &file.path);
                    return (file, Ok(cached), true);
                }

                let result = hasher.digest(&file.path);
                tracker.advance(1, &file.path);
                (file, result, false)
            })
            .collect()
    });

    // Synchronization point: cache writes and grouping, in scan order
    let mut cache = cache;
    let mut order: Vec<(Digest, Vec<FileEntry>)> = Vec::new();
    let mut index: HashMap<Digest, usize> = HashMap::new();

    for (file, result, from_cache) in results {
        match result {
            Ok(digest) => {
                outcome.hashed_files += 1;
                if !from_cache {
                    if let Some(cache) = cache.as_deref_mut() {
                        cache.put(&file.path, file.size, digest.clone());
                    }
                }
                match index.get(&digest) {
                    Some(&i) => order[i].1.push(file),
                    None => {
                        index.insert(digest.clone(), order.len());
                        order.push((digest, vec![file]));
                    }
                }
            }
            Err(HashError::Interrupted(path)) => {
                log::debug!("Hashing interrupted at {}", path.display());
                outcome.interrupted = true;
            }
            Err(e) => {
                log::warn!("Skipping {}: {}", file.path.display(), e);
                outcome.errors.push(e);
            }
        }
    }

    outcome.groups = order
        .into_iter()
        .filter(|(_, members)| members.len() > 1)
        .map(|(digest, members)| DuplicateGroup::new(GroupKey::Digest(digest), size, members))
        .collect();

    outcome
}

/// Configuration for the duplicate finder.
#[derive(Clone)]
pub struct FinderConfig {
    /// Number of I/O threads for parallel hashing.
    /// Default is 4 to prevent disk thrashing.
    pub io_threads: usize,
    /// How size buckets are resolved.
    pub compare_mode: CompareMode,
    /// Digest algorithm for hash mode.
    pub algorithm: HashAlgorithm,
    /// Walker configuration for directory traversal.
    pub walker_config: WalkerConfig,
    /// Optional shutdown flag for graceful termination.
    pub shutdown_flag: Option<Arc<AtomicBool>>,
    /// Optional progress callback for reporting.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl fmt::Debug for FinderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FinderConfig")
            .field("io_threads", &self.io_threads)
            .field("compare_mode", &self.compare_mode)
            .field("algorithm", &self.algorithm)
            .field("walker_config", &self.walker_config)
            .field("shutdown_flag", &self.shutdown_flag)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            io_threads: 4,
            compare_mode: CompareMode::default(),
            algorithm: HashAlgorithm::default(),
            walker_config: WalkerConfig::default(),
            shutdown_flag: None,
            progress_callback: None,
        }
    }
}

impl FinderConfig {
    /// Create a new configuration with custom I/O thread count.
    #[must_use]
    pub fn with_io_threads(mut self, threads: usize) -> Self {
        self.io_threads = threads.max(1);
        self
    }

    /// Set the comparison mode.
    #[must_use]
    pub fn with_compare_mode(mut self, mode: CompareMode) -> Self {
        self.compare_mode = mode;
        self
    }

    /// Set the digest algorithm.
    #[must_use]
    pub fn with_algorithm(mut self, algorithm: HashAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Set the walker configuration.
    #[must_use]
    pub fn with_walker_config(mut self, config: WalkerConfig) -> Self {
        self.walker_config = config;
        self
    }

    /// Set the shutdown flag for graceful termination.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Check if shutdown has been requested.
    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }
}

/// Summary statistics from a duplicate scan.
#[derive(Debug, Default)]
pub struct ScanSummary {
    /// Total number of candidate files
    pub total_files: usize,
    /// Total size of all candidates in bytes
    pub total_size: u64,
    /// Number of files eliminated by size grouping (unique sizes)
    pub eliminated_by_size: usize,
    /// Number of files with a digest (computed or cached)
    pub hashed_files: usize,
    /// Digests answered by the cache
    pub cache_hits: usize,
    /// Digests that had to be computed
    pub cache_misses: usize,
    /// Number of duplicate groups
    pub duplicate_groups: usize,
    /// Number of files that are members of some group
    pub files_in_groups: usize,
    /// Number of redundant copies (members minus one per group)
    pub duplicate_files: usize,
    /// Total space that can be reclaimed by removing duplicates
    pub reclaimable_space: u64,
    /// Duration of the entire scan
    pub scan_duration: std::time::Duration,
    /// Entries that could not be walked
    pub scan_errors: Vec<ScanError>,
    /// Files that could not be hashed
    pub hash_errors: Vec<HashError>,
}

impl ScanSummary {
    /// Calculate the percentage of space that is wasted by duplicates.
    #[must_use]
    pub fn wasted_percentage(&self) -> f64 {
        if self.total_size == 0 {
            0.0
        } else {
            (self.reclaimable_space as f64 / self.total_size as f64) * 100.0
        }
    }

    /// Format reclaimable space as human-readable string.
    #[must_use]
    pub fn reclaimable_display(&self) -> String {
        bytesize::ByteSize(self.reclaimable_space).to_string()
    }

    /// Number of recoverable errors collected during the scan.
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.scan_errors.len() + self.hash_errors.len()
    }

    fn record_groups(&mut self, groups: &[DuplicateGroup]) {
        self.duplicate_groups = groups.len();
        self.files_in_groups = groups.iter().map(DuplicateGroup::len).sum();
        self.duplicate_files = groups.iter().map(DuplicateGroup::duplicate_count).sum();
        self.reclaimable_space = groups.iter().map(DuplicateGroup::wasted_space).sum();
    }
}

/// Errors that stop a duplicate scan.
#[derive(thiserror::Error, Debug)]
pub enum FinderError {
    /// The scan was interrupted by user (Ctrl+C or shutdown signal).
    #[error("Scan interrupted by user")]
    Interrupted,

    /// The provided path does not exist.
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    /// The provided path is not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// The hashing worker pool could not be created.
    #[error("Failed to start hashing threads: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Duplicate finder that runs the walk, size grouping and resolution.
///
/// # Example
///
/// ```no_run
/// use dupsweep::duplicates::{CompareMode, DuplicateFinder, FinderConfig};
/// use std::path::Path;
///
/// let config = FinderConfig::default().with_compare_mode(CompareMode::SizeOnly);
/// let finder = DuplicateFinder::new(config);
///
/// match finder.find_duplicates(Path::new("."), None) {
///     Ok((groups, summary)) => {
///         println!("Found {} groups", groups.len());
///         println!("Can reclaim {} bytes", summary.reclaimable_space);
///     }
///     Err(e) => eprintln!("Scan failed: {}", e),
/// }
/// ```
pub struct DuplicateFinder {
    config: FinderConfig,
    hasher: Hasher,
}

impl DuplicateFinder {
    /// Create a new duplicate finder with the given configuration.
    #[must_use]
    pub fn new(config: FinderConfig) -> Self {
        let mut hasher = Hasher::new(config.algorithm);
        if let Some(ref flag) = config.shutdown_flag {
            hasher = hasher.with_shutdown_flag(flag.clone());
        }
        Self { config, hasher }
    }

    /// Create a new duplicate finder with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(FinderConfig::default())
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &FinderConfig {
        &self.config
    }

    /// Find all duplicate files under `path`.
    ///
    /// Groups are returned in size-bucket order (ascending size), and within
    /// a bucket in order of first appearance.
    ///
    /// # Errors
    ///
    /// Returns `FinderError` if:
    /// - The path does not exist
    /// - The path is not a directory
    /// - The scan is interrupted by shutdown signal (digests computed so
    ///   far have already been written to `cache`)
    pub fn find_duplicates(
        &self,
        path: &Path,
        cache: Option<&mut HashCache>,
    ) -> Result<(Vec<DuplicateGroup>, ScanSummary), FinderError> {
        if !path.exists() {
            return Err(FinderError::PathNotFound(path.to_path_buf()));
        }
        if !path.is_dir() {
            return Err(FinderError::NotADirectory(path.to_path_buf()));
        }

        log::info!("Starting duplicate scan of {}", path.display());

        if self.config.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }

        let callback = self.config.progress_callback.as_deref();
        if let Some(callback) = callback {
            callback.on_phase_start("walking", 0);
        }

        let mut walker = Walker::new(path, self.config.walker_config.clone());
        if let Some(ref flag) = self.config.shutdown_flag {
            walker = walker.with_shutdown_flag(flag.clone());
        }

        let mut files = Vec::new();
        let mut scan_errors = Vec::new();
        for result in walker.walk() {
            match result {
                Ok(file) => {
                    if let Some(callback) = callback {
                        callback.on_progress(files.len() + 1, file.path.to_string_lossy().as_ref());
                    }
                    files.push(file);
                }
                Err(e) => scan_errors.push(e),
            }
        }

        if let Some(callback) = callback {
            callback.on_phase_end("walking");
        }

        if self.config.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }

        log::debug!("Found {} candidate files", files.len());

        let (groups, mut summary) = self.find_duplicates_from_files(files, cache)?;
        summary.scan_errors = scan_errors;
        Ok((groups, summary))
    }

    /// Find duplicates from a pre-collected list of files.
    ///
    /// `files` must be in scan order; it determines member order inside
    /// groups.
    ///
    /// # Errors
    ///
    /// Returns [`FinderError::Interrupted`] on shutdown or
    /// [`FinderError::ThreadPool`] if workers cannot be started.
    pub fn find_duplicates_from_files(
        &self,
        files: Vec<FileEntry>,
        mut cache: Option<&mut HashCache>,
    ) -> Result<(Vec<DuplicateGroup>, ScanSummary), FinderError> {
        let start_time = std::time::Instant::now();
        let callback = self.config.progress_callback.as_deref();
        let mode = self.config.compare_mode;

        let (buckets, size_stats) = group_by_size(files);
        let mut summary = ScanSummary {
            total_files: size_stats.total_files,
            total_size: size_stats.total_size,
            eliminated_by_size: size_stats.eliminated_unique,
            ..ScanSummary::default()
        };

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.io_threads.max(1))
            .build()?;

        if let Some(callback) = callback {
            callback.on_phase_start("hashing", summary.total_files);
        }
        let tracker = ProgressTracker::new(callback);
        if size_stats.eliminated_unique > 0 {
            // Singletons need no work but still count towards completion
            tracker.advance(size_stats.eliminated_unique, Path::new(""));
        }

        if let Some(held) = cache.as_deref().map(HashCache::algorithm) {
            if held != self.hasher.algorithm() {
                log::warn!(
                    "Hash cache holds {} digests but this scan uses {}; not using it",
                    held,
                    self.hasher.algorithm()
                );
                cache = None;
            }
        }

        let hits_before = cache.as_deref().map_or(0, HashCache::hits);
        let misses_before = cache.as_deref().map_or(0, HashCache::misses);

        let mut groups = Vec::new();
        let mut interrupted = false;
        for (size, members) in buckets {
            if self.config.is_shutdown_requested() {
                interrupted = true;
                break;
            }

            let outcome = resolve_with_tracker(
                size,
                members,
                mode,
                &self.hasher,
                cache.as_deref_mut(),
                &pool,
                &tracker,
            );
            summary.hashed_files += outcome.hashed_files;
            summary.hash_errors.extend(outcome.errors);
            groups.extend(outcome.groups);

            if outcome.interrupted {
                interrupted = true;
                break;
            }
        }

        if let Some(callback) = callback {
            callback.on_phase_end("hashing");
        }

        if interrupted || self.config.is_shutdown_requested() {
            log::info!(
                "Interrupted after {} of {} candidates",
                tracker.processed(),
                summary.total_files
            );
            return Err(FinderError::Interrupted);
        }

        summary.cache_hits = cache.as_deref().map_or(0, HashCache::hits) - hits_before;
        summary.cache_misses = cache.as_deref().map_or(0, HashCache::misses) - misses_before;
        summary.record_groups(&groups);
        summary.scan_duration = start_time.elapsed();

        log::debug!(
            "Scan complete ({} mode): {} duplicate groups, {} duplicate files, {} reclaimable, {} cache hits",
            mode,
            summary.duplicate_groups,
            summary.duplicate_files,
            summary.reclaimable_display(),
            summary.cache_hits
        );

        Ok((groups, summary))
    }
}
