//! Application configuration management.
//!
//! Settings are layered with figment, lowest precedence first:
//!
//! 1. Built-in defaults ([`Config::default`])
//! 2. `config.toml` in the platform config directory
//! 3. Environment variables prefixed `DUPSWEEP_` (e.g. `DUPSWEEP_IO_THREADS=8`)
//! 4. Command-line flags ([`Config::merge_cli`])

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::actions::KeepPolicy;
use crate::cache::DEFAULT_CACHE_FILE;
use crate::cli::{Cli, UsageError};
use crate::duplicates::SortOrder;
use crate::scanner::HashAlgorithm;

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "DUPSWEEP_";

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Digest algorithm for hash mode.
    pub algorithm: HashAlgorithm,
    /// Which copy survives a deletion pass.
    pub keep: KeepPolicy,
    /// Worker threads used for hashing.
    pub io_threads: usize,
    /// Report ordering.
    pub sort: SortOrder,
    /// Name of the cache file inside the scanned directory.
    pub cache_file_name: String,
    /// Include dot files and directories.
    pub include_hidden: bool,
    /// Descend into subdirectories.
    pub recursive: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            algorithm: HashAlgorithm::default(),
            keep: KeepPolicy::default(),
            io_threads: 4,
            sort: SortOrder::default(),
            cache_file_name: DEFAULT_CACHE_FILE.to_string(),
            include_hidden: false,
            recursive: false,
        }
    }
}

impl Config {
    /// Load the configuration from the default file and the environment.
    ///
    /// An unreadable or invalid configuration logs a warning and falls back
    /// to the defaults.
    #[must_use]
    pub fn load() -> Self {
        Self::load_from(Self::config_path().as_deref())
    }

    /// Load the configuration using `path` as the config file.
    #[must_use]
    pub fn load_from(path: Option<&Path>) -> Self {
        match Self::figment(path).extract::<Self>() {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Invalid configuration, using defaults: {}", e);
                Self::default()
            }
        }
    }

    /// Build the layered provider chain.
    #[must_use]
    pub fn figment(path: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(path) = path {
            if path.exists() {
                log::debug!("Reading configuration from {}", path.display());
                figment = figment.merge(Toml::file(path));
            }
        }
        figment.merge(Env::prefixed(ENV_PREFIX))
    }

    /// Get the default platform-specific configuration path.
    #[must_use]
    pub fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "dupsweep").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Check settings that only configuration can supply.
    ///
    /// The cache file must sit directly in the scanned directory, so its
    /// name may not contain a separator or be `.` or `..`.
    ///
    /// # Errors
    ///
    /// Returns [`UsageError::InvalidCacheFileName`] otherwise.
    pub fn validate(&self) -> Result<(), UsageError> {
        let name = self.cache_file_name.as_str();
        if Path::new(name).file_name() != Some(OsStr::new(name)) {
            return Err(UsageError::InvalidCacheFileName(name.to_string()));
        }
        Ok(())
    }

    /// Apply command-line overrides.
    ///
    /// Boolean flags can only switch a setting on; options given on the
    /// command line replace the configured value.
    #[must_use]
    pub fn merge_cli(mut self, cli: &Cli) -> Self {
        if let Some(algorithm) = cli.algorithm {
            self.algorithm = algorithm;
        }
        if let Some(keep) = cli.keep {
            self.keep = keep;
        }
        if let Some(io_threads) = cli.io_threads {
            self.io_threads = io_threads;
        }
        if let Some(sort) = cli.sort {
            self.sort = sort;
        }
        self.include_hidden |= cli.include_hidden;
        self.recursive |= cli.recursive;
        self.io_threads = self.io_threads.max(1);
        self
    }
}
