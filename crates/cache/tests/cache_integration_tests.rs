//! Integration tests for the cache contract
//!
//! Exercises every backend through the shared `Cache` trait, the way the CLI
//! consumes it: miss, fetch, add, hit, expire, clean.

use fan_cache::{
    Cache, CacheBackend, DiskCache, ErrorKind, LayeredCache, NullCache, Target,
};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use tempfile::TempDir;

/// Stand-in for a fetched download sitting in a temp directory
fn download(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

/// Miss, add, hit: what `fan run` does on first and second use.
fn miss_then_hit(cache: &dyn Cache, scratch: &TempDir) {
    let url = "https://example.com/bootstrap.sh";

    assert_eq!(cache.lookup(url).unwrap_err().kind(), ErrorKind::NotFound);

    let tmp = download(scratch, "fan-abc", "#!/bin/sh\nexit 0\n");
    let added_at = chrono::Utc::now();
    cache
        .add(&Target::new(url, Duration::from_secs(600)), &tmp)
        .unwrap();

    let hit = cache.lookup(url).unwrap();
    let cached_at = hit.target.cached_at.expect("store stamps cached_at");
    assert!((cached_at - added_at).num_milliseconds().abs() < 1000);
    assert_eq!(
        fs::read_to_string(&hit.executable).unwrap(),
        "#!/bin/sh\nexit 0\n"
    );
}

#[test]
fn test_disk_backend_miss_then_hit() {
    let scratch = TempDir::new().unwrap();
    let backend = CacheBackend::Disk(DiskCache::new(scratch.path().join("cache")));
    miss_then_hit(&backend, &scratch);
}

#[test]
fn test_layered_backend_miss_then_hit() {
    let scratch = TempDir::new().unwrap();
    let backend = CacheBackend::Layered(LayeredCache::new(
        DiskCache::new(scratch.path().join("system")),
        DiskCache::new(scratch.path().join("user")),
    ));
    miss_then_hit(&backend, &scratch);
    assert!(!scratch.path().join("system").exists());
}

#[test]
fn test_null_backend_always_misses() {
    let scratch = TempDir::new().unwrap();
    let backend = CacheBackend::Null(NullCache);
    let url = "https://example.com/bootstrap.sh";
    let tmp = download(&scratch, "fan-abc", "x");

    backend
        .add(&Target::new(url, Duration::from_secs(600)), &tmp)
        .unwrap();
    assert!(backend.lookup(url).unwrap_err().is_not_found());
    assert!(tmp.exists(), "null cache never takes the file");
    assert_eq!(backend.clean().unwrap().removed, 0);
}

#[test]
fn test_clean_sweeps_exactly_expired_entries() {
    let scratch = TempDir::new().unwrap();
    let cache = DiskCache::new(scratch.path().join("cache"));

    let entries = [
        ("https://example.com/a", Duration::ZERO),
        ("https://example.com/b", Duration::from_secs(3600)),
        ("https://example.com/c", Duration::ZERO),
        ("https://example.com/d", Duration::from_secs(86_400)),
    ];
    for (i, (url, ttl)) in entries.iter().enumerate() {
        let tmp = download(&scratch, &format!("dl-{i}"), url);
        cache.add(&Target::new(*url, *ttl), &tmp).unwrap();
    }
    std::thread::sleep(Duration::from_millis(20));

    let summary = cache.clean().unwrap();
    assert_eq!(summary.removed, 2);
    assert_eq!(summary.retained, 2);

    for (url, ttl) in entries {
        assert_eq!(cache.entry_dir(url).exists(), !ttl.is_zero(), "{url}");
    }
}

#[test]
fn test_shared_root_between_handles() {
    // Two handles on the same root see each other's entries, as two
    // invocations of the CLI would.
    let scratch = TempDir::new().unwrap();
    let root = scratch.path().join("cache");
    let writer = DiskCache::new(&root);
    let reader = DiskCache::new(&root);

    let url = "https://example.com/shared";
    writer
        .add(
            &Target::new(url, Duration::from_secs(60)),
            &download(&scratch, "dl", "shared"),
        )
        .unwrap();

    assert_eq!(reader.lookup(url).unwrap().target.url, url);
}

#[test]
fn test_duplicate_add_keeps_first_payload() {
    let scratch = TempDir::new().unwrap();
    let cache = CacheBackend::Disk(DiskCache::new(scratch.path().join("cache")));
    let url = "https://example.com/once";
    let target = Target::new(url, Duration::from_secs(60));

    cache
        .add(&target, &download(&scratch, "one", "first"))
        .unwrap();
    let err = cache
        .add(&target, &download(&scratch, "two", "second"))
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::DuplicateEntry);
    let hit = cache.lookup(url).unwrap();
    assert_eq!(fs::read_to_string(hit.executable).unwrap(), "first");
}
