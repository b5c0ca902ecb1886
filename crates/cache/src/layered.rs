//! Two-tier cache: a read-only backing tier under a writable store tier.
//!
//! Lookups prefer the backing tier, which is typically a shared cache
//! populated out of band (for example shipped with an installation). Every
//! mutation goes to the store tier only. Lookups are passed through to the
//! backing tier unchanged, so build it with [`DiskCache::backing`] to keep
//! expired entries there from being removed.
//!
//! [`DiskCache::backing`]: crate::DiskCache::backing

use crate::{Cache, CacheHit, CleanSummary, Result, Target};
use std::path::Path;
use tracing::trace;

/// Cache composed of a backing tier and a store tier
#[derive(Debug)]
pub struct LayeredCache {
    backing: Box<dyn Cache>,
    store: Box<dyn Cache>,
}

impl LayeredCache {
    /// Layer `backing` (read precedence) under `store` (reads and writes).
    #[must_use]
    pub fn new(backing: impl Cache + 'static, store: impl Cache + 'static) -> Self {
        Self {
            backing: Box::new(backing),
            store: Box::new(store),
        }
    }
}

impl Cache for LayeredCache {
    fn add(&self, target: &Target, executable: &Path) -> Result<()> {
        self.store.add(target, executable)
    }

    fn lookup(&self, url: &str) -> Result<CacheHit> {
        match self.backing.lookup(url) {
            Ok(hit) => Ok(hit),
            Err(e) => {
                trace!(url, error = %e, "Backing cache missed, trying store");
                self.store.lookup(url)
            }
        }
    }

    fn invalidate(&self, url: &str) -> Result<bool> {
        self.store.invalidate(url)
    }

    fn clean(&self) -> Result<CleanSummary> {
        self.store.clean()
    }

    fn purge(&self) -> Result<()> {
        self.store.purge()
    }
}
