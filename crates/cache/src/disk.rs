//! On-disk entry store

use crate::key::{self, METADATA_FILE};
use crate::{Cache, CacheHit, CleanSummary, Error, Result, Target};
use chrono::Utc;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, trace, warn};

/// Cache rooted at a single directory.
///
/// Each target lives in `<root>/<key>/` with its payload and a `metadata`
/// file. The root is created lazily on the first add.
#[derive(Debug, Clone)]
pub struct DiskCache {
    root: PathBuf,
    prune_on_lookup: bool,
}

impl DiskCache {
    /// Create a cache at the specified root directory.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            prune_on_lookup: true,
        }
    }

    /// Create a cache over a shared backing root.
    ///
    /// Lookups report expired or incomplete entries as misses but leave them
    /// on disk.
    #[must_use]
    pub fn backing(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            prune_on_lookup: false,
        }
    }

    /// Get the cache root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Entry directory for a URL.
    #[must_use]
    pub fn entry_dir(&self, url: &str) -> PathBuf {
        key::path_for(&self.root, key::hash_url(url))
    }

    fn read_metadata(dir: &Path) -> Result<Target> {
        let path = dir.join(METADATA_FILE);
        let data = fs::read(&path).map_err(|e| Error::io(e, &path, "read"))?;
        serde_json::from_slice(&data).map_err(|e| {
            Error::serialization(format!("Failed to parse target metadata: {e}"), &path)
        })
    }

    fn write_metadata(dir: &Path, target: &Target) -> Result<()> {
        let path = dir.join(METADATA_FILE);
        let json = serde_json::to_vec_pretty(target).map_err(|e| {
            Error::serialization(format!("Failed to serialize target metadata: {e}"), &path)
        })?;
        fs::write(&path, json).map_err(|e| Error::io(e, &path, "write"))
    }

    /// Remove an entry directory; an entry that is already gone is not an error.
    fn remove_entry(dir: &Path) -> Result<bool> {
        match fs::remove_dir_all(dir) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(Error::io(e, dir, "remove_dir_all")),
        }
    }
}

/// Move `source` to `dest`, copying when the two are on different filesystems.
///
/// A failed copy leaves no partial `dest` behind.
fn relocate(source: &Path, dest: &Path) -> Result<()> {
    match fs::rename(source, dest) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            trace!(?source, ?dest, "Rename crosses devices, copying instead");
            if let Err(e) = fs::copy(source, dest) {
                discard_file(dest);
                return Err(Error::io(e, dest, "copy"));
            }
            fs::remove_file(source).map_err(|e| Error::io(e, source, "remove_file"))
        }
        Err(e) => Err(Error::io(e, source, "rename")),
    }
}

fn discard_file(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => warn!(?path, error = %e, "Failed to remove partial file"),
    }
}

/// Undo a failed add: drop the entry directory if this add created it,
/// otherwise only the payload.
fn roll_back(dir: &Path, payload: &Path, created_dir: bool) {
    if !created_dir {
        discard_file(payload);
        return;
    }
    match fs::remove_dir_all(dir) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => warn!(?dir, error = %e, "Failed to roll back cache entry"),
    }
}

#[cfg(unix)]
fn mark_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    let perms = fs::Permissions::from_mode(0o755);
    fs::set_permissions(path, perms).map_err(|e| Error::io(e, path, "set_permissions"))
}

#[cfg(not(unix))]
fn mark_executable(_path: &Path) -> Result<()> {
    Ok(())
}

impl Cache for DiskCache {
    fn add(&self, target: &Target, executable: &Path) -> Result<()> {
        let dir = self.entry_dir(&target.url);
        let payload = dir.join(target.executable_name());

        // Checked before the move. Another process can still slip in between
        // this check and the rename; entries are single-writer by convention.
        if payload
            .try_exists()
            .map_err(|e| Error::io(e, &payload, "stat"))?
        {
            return Err(Error::duplicate(&target.url, payload));
        }

        let created_dir = !dir
            .try_exists()
            .map_err(|e| Error::io(e, &dir, "stat"))?;
        fs::create_dir_all(&dir).map_err(|e| Error::io(e, &dir, "create_dir_all"))?;

        let mut record = target.clone();
        record.cached_at = Some(Utc::now());

        // The payload only counts once its metadata is in place.
        let stored = relocate(executable, &payload)
            .and_then(|()| mark_executable(&payload))
            .and_then(|()| Self::write_metadata(&dir, &record));
        if let Err(e) = stored {
            warn!(url = %target.url, ?dir, error = %e, "Rolling back partially written cache entry");
            roll_back(&dir, &payload, created_dir);
            return Err(e);
        }

        debug!(url = %target.url, ?payload, "Stored target in cache");
        Ok(())
    }

    fn lookup(&self, url: &str) -> Result<CacheHit> {
        let dir = self.entry_dir(url);

        match fs::metadata(&dir) {
            Ok(_) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                trace!(url, "Cache miss");
                return Err(Error::not_found(url));
            }
            Err(e) => return Err(Error::io(e, &dir, "stat")),
        }

        let target = Self::read_metadata(&dir)?;

        if target.is_expired() {
            if self.prune_on_lookup {
                debug!(url, ?dir, "Cached target expired, removing");
                Self::remove_entry(&dir)?;
            }
            return Err(Error::not_found(url));
        }

        let payload = dir.join(target.executable_name());
        if !payload
            .try_exists()
            .map_err(|e| Error::io(e, &payload, "stat"))?
        {
            warn!(url, ?payload, "Cached payload is missing");
            if self.prune_on_lookup {
                Self::remove_entry(&dir)?;
            }
            return Err(Error::not_found(url));
        }
        let executable =
            std::path::absolute(&payload).map_err(|e| Error::io(e, &payload, "absolute"))?;

        trace!(url, ?executable, "Cache hit");
        Ok(CacheHit { target, executable })
    }

    fn invalidate(&self, url: &str) -> Result<bool> {
        let removed = Self::remove_entry(&self.entry_dir(url))?;
        debug!(url, removed, "Invalidated cache entry");
        Ok(removed)
    }

    fn clean(&self) -> Result<CleanSummary> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                trace!(root = ?self.root, "Cache root missing, nothing to clean");
                return Ok(CleanSummary::default());
            }
            Err(e) => return Err(Error::io(e, &self.root, "read_dir")),
        };

        let now = Utc::now();
        let mut summary = CleanSummary::default();

        for entry in entries {
            let entry = entry.map_err(|e| Error::io(e, &self.root, "read_dir_entry"))?;
            let dir = entry.path();
            let file_type = entry
                .file_type()
                .map_err(|e| Error::io(e, &dir, "file_type"))?;
            if !file_type.is_dir() {
                continue;
            }

            // A corrupt entry ends the pass; it is reported, not repaired.
            let target = Self::read_metadata(&dir).inspect_err(|e| {
                warn!(?dir, error = %e, "Aborting clean on unreadable cache entry");
            })?;

            if target.is_expired_at(now) {
                Self::remove_entry(&dir)?;
                debug!(url = %target.url, "Removed expired cache entry");
                summary.removed += 1;
            } else {
                summary.retained += 1;
            }
        }

        Ok(summary)
    }

    fn purge(&self) -> Result<()> {
        match fs::remove_dir_all(&self.root) {
            Ok(()) => {
                debug!(root = ?self.root, "Purged cache");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::io(e, &self.root, "remove_dir_all")),
        }
    }
}
