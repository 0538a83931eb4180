//! Hash caching module for dupsweep.
//!
//! This module provides persistent storage for file digests to speed up
//! subsequent scans by avoiding re-hashing of unchanged files.
//!
//! # Architecture
//!
//! * [`store`]: The in-memory [`HashCache`] and its JSON persistence.
//! * [`entry`]: The composite [`CacheKey`] and the on-disk [`CacheEntry`] record.
//!
//! # Cache Invalidation
//!
//! Entries are keyed by file path and file size only. A file whose size
//! changes gets a fresh digest; a same-size edit does not. Deleting the
//! cache file is the way to force a full re-hash.
//!
//! Each record also names the algorithm that produced it, and a cache only
//! loads records of the algorithm in use. Files removed by a deletion pass
//! are dropped from the cache before it is saved.

pub mod entry;
pub mod store;

pub use entry::{CacheEntry, CacheKey};
pub use store::{CacheError, CacheResult, HashCache, DEFAULT_CACHE_FILE};
