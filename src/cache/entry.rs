//! Cache key and persisted entry types.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::scanner::{Digest, HashAlgorithm};

/// Lookup key for a cached digest.
///
/// A digest is reused whenever both the path and the byte size match. The
/// modification time is not part of the key, so a same-size edit to a file
/// returns the old digest until the cache file is removed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey {
    /// File path as produced by the walker
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
}

impl CacheKey {
    /// Create a key for `path` at `size` bytes.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, size: u64) -> Self {
        Self {
            path: path.into(),
            size,
        }
    }

    /// Borrowing constructor used on the lookup path.
    #[must_use]
    pub fn from_parts(path: &Path, size: u64) -> Self {
        Self::new(path.to_path_buf(), size)
    }
}

/// One record of the on-disk cache file.
///
/// Records written before the algorithm was stored have no `algorithm`
/// field and never match on load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// File path
    pub path: PathBuf,
    /// File size in bytes at hashing time
    pub size: u64,
    /// Algorithm that produced `digest`
    #[serde(default)]
    pub algorithm: Option<HashAlgorithm>,
    /// Hex digest of the file content
    pub digest: Digest,
}

impl CacheEntry {
    /// Split into the in-memory key and value.
    #[must_use]
    pub fn into_parts(self) -> (CacheKey, Digest) {
        (CacheKey::new(self.path, self.size), self.digest)
    }

    /// Whether this record was produced by `algorithm`.
    #[must_use]
    pub fn matches(&self, algorithm: HashAlgorithm) -> bool {
        self.algorithm == Some(algorithm)
    }
}
