//! URL-keyed executable cache for fan
//!
//! This crate memoizes fetched executables on local disk:
//! - Deterministic entry location derived from the target URL alone
//! - Per-entry metadata recording the URL, TTL and time of caching
//! - Lazy expiration on lookup plus an explicit clean pass
//! - Layered composition of a read-only backing tier under a writable store
//!
//! # Overview
//!
//! Every backend implements [`Cache`]. The concrete backend is chosen once at
//! startup and wrapped in [`CacheBackend`]:
//!
//! - [`DiskCache`] owns one cache root on disk
//! - [`LayeredCache`] reads a backing cache first and writes to a store cache
//! - [`NullCache`] caches nothing, used when caching is disabled
//!
//! # Layout
//!
//! ```text
//! <root>/
//! └── <decimal key of url>/
//!     ├── <payload name>   # the executable, mode 0755
//!     └── metadata         # JSON {url, invalidate_after, cached_at}
//! ```

#![expect(
    clippy::missing_errors_doc,
    reason = "Error variants are documented on the Cache trait"
)]

pub mod disk;
mod error;
pub mod key;
pub mod layered;
pub mod null;
pub mod target;

use std::fmt;
use std::path::{Path, PathBuf};

// Re-export error types at crate root
pub use error::{Error, ErrorKind, Result};

// Re-export main types
pub use disk::DiskCache;
pub use key::{CacheKey, executable_name, hash_url, path_for};
pub use layered::LayeredCache;
pub use null::NullCache;
pub use target::Target;

/// A successful lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheHit {
    /// Metadata of the cached target, with `cached_at` populated
    pub target: Target,
    /// Absolute path of the cached payload
    pub executable: PathBuf,
}

/// Outcome of a clean pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanSummary {
    /// Entries found expired and removed
    pub removed: usize,
    /// Entries still valid
    pub retained: usize,
}

/// Contract shared by every cache backend.
///
/// Operations are synchronous. Nothing here locks across processes: two
/// invocations racing on the same URL may both pass the duplicate check in
/// [`Cache::add`], or both observe an entry as expired.
pub trait Cache: Send + Sync + fmt::Debug {
    /// Store `executable` as the payload for `target`.
    ///
    /// On success the file at `executable` has been moved into the cache and
    /// must not be used by the caller again. Fails with
    /// [`Error::DuplicateEntry`] if a payload already exists for the URL.
    fn add(&self, target: &Target, executable: &Path) -> Result<()>;

    /// Find the valid entry for `url`.
    ///
    /// Fails with [`Error::NotFound`] when there is no entry or the entry had
    /// expired (in which case it has been removed).
    fn lookup(&self, url: &str) -> Result<CacheHit>;

    /// Drop the entry for `url` regardless of its age. Returns whether an
    /// entry existed.
    fn invalidate(&self, url: &str) -> Result<bool>;

    /// Remove every expired entry.
    fn clean(&self) -> Result<CleanSummary>;

    /// Remove every entry.
    fn purge(&self) -> Result<()>;
}

/// The cache backend selected from configuration
#[derive(Debug)]
pub enum CacheBackend {
    /// A single cache root on disk
    Disk(DiskCache),
    /// Backing tier layered under a store tier
    Layered(LayeredCache),
    /// Caching disabled
    Null(NullCache),
}

impl CacheBackend {
    /// Short name for logs
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Disk(_) => "disk",
            Self::Layered(_) => "layered",
            Self::Null(_) => "null",
        }
    }

    fn inner(&self) -> &dyn Cache {
        match self {
            Self::Disk(c) => c,
            Self::Layered(c) => c,
            Self::Null(c) => c,
        }
    }
}

impl Cache for CacheBackend {
    fn add(&self, target: &Target, executable: &Path) -> Result<()> {
        self.inner().add(target, executable)
    }

    fn lookup(&self, url: &str) -> Result<CacheHit> {
        self.inner().lookup(url)
    }

    fn invalidate(&self, url: &str) -> Result<bool> {
        self.inner().invalidate(url)
    }

    fn clean(&self) -> Result<CleanSummary> {
        self.inner().clean()
    }

    fn purge(&self) -> Result<()> {
        self.inner().purge()
    }
}

impl From<DiskCache> for CacheBackend {
    fn from(cache: DiskCache) -> Self {
        Self::Disk(cache)
    }
}

impl From<LayeredCache> for CacheBackend {
    fn from(cache: LayeredCache) -> Self {
        Self::Layered(cache)
    }
}

impl From<NullCache> for CacheBackend {
    fn from(cache: NullCache) -> Self {
        Self::Null(cache)
    }
}
