//! User configuration
//!
//! Stored as YAML, by default at `<user config dir>/fan.config`:
//!
//! ```yaml
//! default_invalidate_after: 604800
//! cache_dir: /home/me/.cache/fan.cache
//! backing_cache_dir: /usr/share/fan/cache
//! aliases:
//!   hello: https://example.com/hello.sh
//! ```

// Rust 1.92 compiler bug: false positives for thiserror/miette derive macro fields
// https://github.com/rust-lang/rust/issues/147648
#![allow(unused_assignments)]

use fan_cache::{CacheBackend, DiskCache, LayeredCache, NullCache};
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use std::{fs, io};
use thiserror::Error;
use tracing::debug;

/// Config file name inside the user config directory
pub const DEFAULT_CONFIG_FILE_NAME: &str = "fan.config";

/// Cache directory name inside the user cache directory
pub const DEFAULT_CACHE_DIR_NAME: &str = "fan.cache";

/// One week
pub const DEFAULT_INVALIDATE_AFTER_SECS: u64 = 7 * 24 * 60 * 60;

/// Errors loading or saving configuration
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    /// The file exists but could not be read or written
    #[error("Failed to {operation} config file {}", path.display())]
    #[diagnostic(code(fan::config::io))]
    Io {
        /// The underlying I/O error
        #[source]
        source: io::Error,
        /// Config file path
        path: PathBuf,
        /// Operation that failed
        operation: &'static str,
    },

    /// The file is not valid configuration YAML
    #[error("Failed to parse config file {}: {source}", path.display())]
    #[diagnostic(
        code(fan::config::parse),
        help("Check the YAML syntax and field names")
    )]
    Parse {
        /// The underlying YAML error
        #[source]
        source: serde_yaml::Error,
        /// Config file path
        path: PathBuf,
    },

    /// The configuration could not be encoded
    #[error("Failed to serialize config: {0}")]
    #[diagnostic(code(fan::config::serialize))]
    Serialize(#[source] serde_yaml::Error),
}

/// Result type for configuration operations
pub type Result<T> = std::result::Result<T, Error>;

/// fan configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// TTL, in seconds, given to newly fetched targets
    pub default_invalidate_after: u64,

    /// Writable cache root; an empty path disables the cache
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_dir: Option<PathBuf>,

    /// Read-only cache root consulted before `cache_dir`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backing_cache_dir: Option<PathBuf>,

    /// Short names for URLs
    pub aliases: BTreeMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_invalidate_after: DEFAULT_INVALIDATE_AFTER_SECS,
            cache_dir: default_cache_dir(),
            backing_cache_dir: None,
            aliases: BTreeMap::new(),
        }
    }
}

/// Default location of the config file
#[must_use]
pub fn default_config_path() -> PathBuf {
    dirs::config_dir().map_or_else(
        || PathBuf::from(DEFAULT_CONFIG_FILE_NAME),
        |dir| dir.join(DEFAULT_CONFIG_FILE_NAME),
    )
}

/// Default cache root, if the platform has a user cache directory
#[must_use]
pub fn default_cache_dir() -> Option<PathBuf> {
    dirs::cache_dir().map(|dir| dir.join(DEFAULT_CACHE_DIR_NAME))
}

fn non_empty(path: Option<&PathBuf>) -> Option<&Path> {
    path.map(PathBuf::as_path)
        .filter(|p| !p.as_os_str().is_empty())
}

impl Config {
    /// Load configuration from `path`; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(?path, "No config file, using defaults");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(Error::Io {
                    source,
                    path: path.to_path_buf(),
                    operation: "read",
                });
            }
        };

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        serde_yaml::from_str(&content).map_err(|source| Error::Parse {
            source,
            path: path.to_path_buf(),
        })
    }

    /// Write configuration to `path`, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        let yaml = serde_yaml::to_string(self).map_err(Error::Serialize)?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| Error::Io {
                source,
                path: parent.to_path_buf(),
                operation: "create directory for",
            })?;
        }

        fs::write(path, yaml).map_err(|source| Error::Io {
            source,
            path: path.to_path_buf(),
            operation: "write",
        })
    }

    /// TTL for newly fetched targets
    #[must_use]
    pub const fn default_invalidate_after(&self) -> Duration {
        Duration::from_secs(self.default_invalidate_after)
    }

    /// Expand an alias to its URL; anything else is returned unchanged.
    #[must_use]
    pub fn resolve<'a>(&'a self, name: &'a str) -> &'a str {
        self.aliases.get(name).map_or(name, String::as_str)
    }

    /// Build the cache backend this configuration describes.
    ///
    /// | `backing_cache_dir` | `cache_dir` | backend |
    /// |---|---|---|
    /// | unset | unset | null |
    /// | unset | set | disk |
    /// | set | set | layered over disk |
    /// | set | unset | layered over null |
    #[must_use]
    pub fn cache_backend(&self) -> CacheBackend {
        let store = non_empty(self.cache_dir.as_ref());
        let backing = non_empty(self.backing_cache_dir.as_ref());

        match (backing, store) {
            (None, None) => {
                debug!("No cache directory configured, caching disabled");
                CacheBackend::Null(NullCache)
            }
            (None, Some(store)) => CacheBackend::Disk(DiskCache::new(store)),
            (Some(backing), Some(store)) => CacheBackend::Layered(LayeredCache::new(
                DiskCache::backing(backing),
                DiskCache::new(store),
            )),
            (Some(backing), None) => {
                CacheBackend::Layered(LayeredCache::new(DiskCache::backing(backing), NullCache))
            }
        }
    }
}
