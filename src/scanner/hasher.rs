//! Streaming file hasher.
//!
//! # Overview
//!
//! [`Hasher`] reads a file in fixed 64 KiB blocks and feeds each block to an
//! incremental digest. The finalized digest is returned as a lowercase hex
//! string wrapped in [`Digest`].
//!
//! The default algorithm is MD5: fast and good enough as an equality proxy
//! for file content, but not collision resistant against an adversary.
//! BLAKE3 and SHA-256 can be selected through [`HashAlgorithm`].
//!
//! # Example
//!
//! ```no_run
//! use dupsweep::scanner::{HashAlgorithm, Hasher};
//! use std::path::Path;
//!
//! let hasher = Hasher::new(HashAlgorithm::Blake3);
//! let digest = hasher.digest(Path::new("some_file.bin")).unwrap();
//! println!("{}", digest);
//! ```

use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use sha2::Digest as _;

use super::HashError;

/// Read block size for streaming digests (64 KiB).
pub const BLOCK_SIZE: usize = 64 * 1024;

/// Hex-encoded content digest.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Digest(String);

impl Digest {
    /// Wrap an already hex-encoded digest.
    #[must_use]
    pub fn from_hex(hex: impl Into<String>) -> Self {
        Self(hex.into())
    }

    /// The digest as a hex string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Digest algorithm used to confirm duplicates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    /// MD5 (default)
    #[default]
    Md5,
    /// BLAKE3
    Blake3,
    /// SHA-256
    Sha256,
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HashAlgorithm::Md5 => write!(f, "md5"),
            HashAlgorithm::Blake3 => write!(f, "blake3"),
            HashAlgorithm::Sha256 => write!(f, "sha256"),
        }
    }
}

/// Incremental state for one of the supported algorithms.
enum DigestState {
    Md5(md5::Context),
    Blake3(Box<blake3::Hasher>),
    Sha256(sha2::Sha256),
}

impl DigestState {
    fn new(algorithm: HashAlgorithm) -> Self {
        match algorithm {
            HashAlgorithm::Md5 => Self::Md5(md5::Context::new()),
            HashAlgorithm::Blake3 => Self::Blake3(Box::new(blake3::Hasher::new())),
            HashAlgorithm::Sha256 => Self::Sha256(sha2::Sha256::new()),
        }
    }

    fn update(&mut self, block: &[u8]) {
        match self {
            Self::Md5(ctx) => ctx.consume(block),
            Self::Blake3(hasher) => {
                hasher.update(block);
            }
            Self::Sha256(hasher) => hasher.update(block),
        }
    }

    fn finalize(self) -> Digest {
        let hex = match self {
            Self::Md5(ctx) => format!("{:x}", ctx.compute()),
            Self::Blake3(hasher) => hasher.finalize().to_hex().to_string(),
            Self::Sha256(hasher) => format!("{:x}", hasher.finalize()),
        };
        Digest(hex)
    }
}

/// Block-streaming file hasher.
#[derive(Debug, Clone, Default)]
pub struct Hasher {
    algorithm: HashAlgorithm,
    shutdown_flag: Option<Arc<AtomicBool>>,
}

impl Hasher {
    /// Create a hasher for the given algorithm.
    #[must_use]
    pub fn new(algorithm: HashAlgorithm) -> Self {
        Self {
            algorithm,
            shutdown_flag: None,
        }
    }

    /// Abort in-progress digests when the flag is set.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// The configured algorithm.
    #[must_use]
    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    /// Compute the digest of a file's full content.
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] if the file cannot be opened or read, or
    /// [`HashError::Interrupted`] if shutdown is requested mid-file.
    pub fn digest(&self, path: &Path) -> Result<Digest, HashError> {
        let mut file = File::open(path).map_err(|e| HashError::from_io(path, e))?;
        self.digest_reader(path, &mut file)
    }

    /// Compute the digest of everything `reader` yields.
    ///
    /// `path` is used only for error reporting.
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] on read failure or interruption.
    pub fn digest_reader<R: Read>(&self, path: &Path, reader: &mut R) -> Result<Digest, HashError> {
        let mut state = DigestState::new(self.algorithm);
        let mut buffer = vec![0u8; BLOCK_SIZE];

        loop {
            if self.is_shutdown_requested() {
                return Err(HashError::Interrupted(path.to_path_buf()));
            }

            let n = match reader.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(HashError::from_io(path, e)),
            };
            state.update(&buffer[..n]);
        }

        Ok(state.finalize())
    }
}
