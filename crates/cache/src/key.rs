//! Cache key derivation
//!
//! A target's identity is its URL and nothing else. The key is the first
//! eight bytes of the SHA-256 digest of the URL, read big-endian, and its
//! decimal numeral names the entry directory. The digest is stable across
//! processes and machines so a cache root can be shared.

use sha2::{Digest, Sha256};
use std::fmt;
use std::path::{Path, PathBuf};
use url::Url;

/// Name of the metadata file inside an entry directory
pub const METADATA_FILE: &str = "metadata";

/// Payload name used when the URL yields nothing better
pub const FALLBACK_EXECUTABLE_NAME: &str = "executable";

/// Deterministic key for a target URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(u64);

impl CacheKey {
    /// Raw key value
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Hash a URL into its cache key
#[must_use]
pub fn hash_url(url: &str) -> CacheKey {
    let digest = Sha256::digest(url.as_bytes());
    let mut prefix = [0u8; 8];
    prefix.copy_from_slice(&digest[..8]);
    CacheKey(u64::from_be_bytes(prefix))
}

/// Directory holding the entry for `key` under `root`
#[must_use]
pub fn path_for(root: &Path, key: CacheKey) -> PathBuf {
    root.join(key.to_string())
}

/// File name for the payload of `url` inside its entry directory.
///
/// Uses the last non-empty path segment, else the host (without port), else
/// [`FALLBACK_EXECUTABLE_NAME`]. A name that would shadow the metadata file
/// also falls back.
#[must_use]
pub fn executable_name(url: &str) -> String {
    let Ok(parsed) = Url::parse(url) else {
        return FALLBACK_EXECUTABLE_NAME.to_string();
    };

    let from_path = parsed
        .path_segments()
        .and_then(|mut segments| segments.rfind(|s| !s.is_empty()))
        .map(str::to_string);

    let name = from_path.or_else(|| {
        parsed
            .host_str()
            .filter(|h| !h.is_empty())
            .map(str::to_string)
    });

    match name {
        Some(n) if n != METADATA_FILE => n,
        _ => FALLBACK_EXECUTABLE_NAME.to_string(),
    }
}
