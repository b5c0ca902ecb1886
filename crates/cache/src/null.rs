//! Cache that stores nothing, used when caching is disabled.

use crate::{Cache, CacheHit, CleanSummary, Error, Result, Target};
use std::path::Path;

/// No-op cache: every lookup misses and every write succeeds.
///
/// The caller's fetch path therefore always runs, and nothing touches the
/// disk. A payload handed to [`Cache::add`] is left where it is.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullCache;

impl Cache for NullCache {
    fn add(&self, _target: &Target, _executable: &Path) -> Result<()> {
        Ok(())
    }

    fn lookup(&self, url: &str) -> Result<CacheHit> {
        Err(Error::not_found(url))
    }

    fn invalidate(&self, _url: &str) -> Result<bool> {
        Ok(false)
    }

    fn clean(&self) -> Result<CleanSummary> {
        Ok(CleanSummary::default())
    }

    fn purge(&self) -> Result<()> {
        Ok(())
    }
}
