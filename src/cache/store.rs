//! JSON-backed hash cache.
//!
//! The cache lives next to the scanned files as a pretty-printed JSON array
//! of [`CacheEntry`] records. It is loaded once before hashing, consulted and
//! extended during the run, and written back at the end (or on Ctrl+C).
//!
//! Loading never fails: a missing, unreadable or malformed file yields an
//! empty cache and the run simply hashes everything again. Records made by
//! a different digest algorithm are dropped on load, so switching
//! `--algorithm` costs one full re-hash and nothing more.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use super::entry::{CacheEntry, CacheKey};
use crate::scanner::{Digest, HashAlgorithm};

/// File name of the cache inside the scanned directory.
pub const DEFAULT_CACHE_FILE: &str = ".dup_cache.json";

/// Errors raised when persisting the cache.
#[derive(thiserror::Error, Debug)]
pub enum CacheError {
    /// Cache could not be serialized.
    #[error("Failed to serialize hash cache: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Cache file could not be written.
    #[error("Failed to write hash cache {path}: {source}")]
    Write {
        /// Destination path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

/// Result alias for cache persistence.
pub type CacheResult<T> = Result<T, CacheError>;

/// In-memory digest cache keyed by (path, size).
///
/// All digests in one cache come from the same [`HashAlgorithm`].
#[derive(Debug, Default)]
pub struct HashCache {
    algorithm: HashAlgorithm,
    entries: BTreeMap<CacheKey, Digest>,
    hits: AtomicUsize,
    misses: AtomicUsize,
}

impl HashCache {
    /// Create an empty cache for the default algorithm.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty cache for `algorithm`.
    #[must_use]
    pub fn with_algorithm(algorithm: HashAlgorithm) -> Self {
        Self {
            algorithm,
            ..Self::default()
        }
    }

    /// Load the `algorithm` digests of a cache file, falling back to an
    /// empty cache on any failure.
    #[must_use]
    pub fn load(path: &Path, algorithm: HashAlgorithm) -> Self {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("No hash cache at {}", path.display());
                return Self::with_algorithm(algorithm);
            }
            Err(e) => {
                log::debug!("Unreadable hash cache {}: {}", path.display(), e);
                return Self::with_algorithm(algorithm);
            }
        };

        match serde_json::from_str::<Vec<CacheEntry>>(&content) {
            Ok(records) => {
                let total = records.len();
                let entries: BTreeMap<_, _> = records
                    .into_iter()
                    .filter(|record| record.matches(algorithm))
                    .map(CacheEntry::into_parts)
                    .collect();
                if entries.len() < total {
                    log::debug!(
                        "Dropped {} cached digests not made with {}",
                        total - entries.len(),
                        algorithm
                    );
                }
                log::debug!(
                    "Loaded {} cached digests from {}",
                    entries.len(),
                    path.display()
                );
                Self {
                    algorithm,
                    entries,
                    ..Self::default()
                }
            }
            Err(e) => {
                log::debug!(
                    "Ignoring malformed hash cache {}: {}",
                    path.display(),
                    e
                );
                Self::with_algorithm(algorithm)
            }
        }
    }

    /// Algorithm of every digest held by this cache.
    #[must_use]
    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    /// Look up the digest for `path` at `size` bytes.
    ///
    /// Takes `&self` so worker threads can share the cache; hit and miss
    /// counters are atomic.
    pub fn get(&self, path: &Path, size: u64) -> Option<Digest> {
        let found = self
            .entries
            .get(&CacheKey::from_parts(path, size))
            .cloned();
        if found.is_some() {
            self.hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
        }
        found
    }

    /// Record a freshly computed digest, replacing any previous value.
    pub fn put(&mut self, path: &Path, size: u64, digest: Digest) {
        self.entries.insert(CacheKey::from_parts(path, size), digest);
    }

    /// Drop every digest recorded for any of `paths`, whatever the size.
    ///
    /// Returns the number of entries removed.
    pub fn forget<'a, I>(&mut self, paths: I) -> usize
    where
        I: IntoIterator<Item = &'a Path>,
    {
        let gone: HashSet<&Path> = paths.into_iter().collect();
        if gone.is_empty() {
            return 0;
        }
        let before = self.entries.len();
        self.entries.retain(|key, _| !gone.contains(key.path.as_path()));
        before - self.entries.len()
    }

    /// Number of cached digests.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds no digests.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Lookups answered from the cache.
    #[must_use]
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::Relaxed)
    }

    /// Lookups that required hashing.
    #[must_use]
    pub fn misses(&self) -> usize {
        self.misses.load(Ordering::Relaxed)
    }

    /// Write the cache to `path` as a JSON array.
    ///
    /// The file is written to a sibling temporary file first and renamed into
    /// place, so an interrupted save leaves the previous cache intact.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] if serialization or any filesystem step fails.
    pub fn save(&self, path: &Path) -> CacheResult<()> {
        let records: Vec<CacheEntry> = self
            .entries
            .iter()
            .map(|(key, digest)| CacheEntry {
                path: key.path.clone(),
                size: key.size,
                algorithm: Some(self.algorithm),
                digest: digest.clone(),
            })
            .collect();

        let json = serde_json::to_string_pretty(&records)?;

        let tmp_path = path.with_extension("json.tmp");
        fs::write(&tmp_path, json).map_err(|source| CacheError::Write {
            path: tmp_path.clone(),
            source,
        })?;
        fs::rename(&tmp_path, path).map_err(|source| {
            let _ = fs::remove_file(&tmp_path);
            CacheError::Write {
                path: path.to_path_buf(),
                source,
            }
        })?;

        log::debug!("Saved {} cached digests to {}", records.len(), path.display());
        Ok(())
    }
}
