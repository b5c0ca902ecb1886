//! `fan run`

use crate::cli::CliError;
use crate::context::AppContext;
use crate::{exec, fetch};
use fan_cache::{Cache, ErrorKind, Target};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Executable ready to run
#[derive(Debug, PartialEq, Eq)]
pub enum Prepared {
    /// Lives in the cache and stays there
    Cached(PathBuf),
    /// Downloaded but not cached; deleted after the run
    Transient(PathBuf),
}

impl Prepared {
    /// Path to execute
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Cached(path) | Self::Transient(path) => path,
        }
    }
}

fn remove_download(path: &Path) {
    if let Err(e) = fs::remove_file(path) {
        warn!(path = %path.display(), error = %e, "Failed to remove downloaded file");
    }
}

/// Find `url` in the cache, fetching and caching it on a miss.
pub fn prepare(ctx: &AppContext, url: &str) -> Result<Prepared, CliError> {
    match ctx.cache.lookup(url) {
        Ok(hit) => {
            debug!(url, executable = %hit.executable.display(), "Cache hit");
            return Ok(Prepared::Cached(hit.executable));
        }
        Err(e) if e.is_not_found() => debug!(url, "Cache miss"),
        Err(e) => return Err(e.into()),
    }

    info!(url, "Fetching target");
    let download = fetch::fetch_to_temp_file(url)?;
    let target = Target::new(url, ctx.config.default_invalidate_after());

    match ctx.cache.add(&target, &download) {
        Ok(()) => {}
        // Another process cached it first; use theirs.
        Err(e) if e.kind() == ErrorKind::DuplicateEntry => {
            debug!(url, "Target was cached concurrently");
            remove_download(&download);
        }
        Err(e) => {
            remove_download(&download);
            return Err(e.into());
        }
    }

    match ctx.cache.lookup(url) {
        Ok(hit) => Ok(Prepared::Cached(hit.executable)),
        // The null cache keeps nothing, so the download is still ours.
        Err(e) if e.is_not_found() && download.exists() => {
            debug!(url, "Running uncached download");
            Ok(Prepared::Transient(download))
        }
        Err(e) if e.is_not_found() => Err(CliError::cache_with_help(
            format!("{url} expired as soon as it was cached"),
            "Set default_invalidate_after above zero",
        )),
        Err(e) => Err(e.into()),
    }
}

/// Run `target` (a URL or alias) with `args`, returning the child's exit code.
pub fn execute_run(ctx: &AppContext, target: &str, args: &[String]) -> Result<i32, CliError> {
    let url = ctx.config.resolve(target);
    if url != target {
        debug!(alias = target, url, "Resolved alias");
    }

    let prepared = prepare(ctx, url)?;
    let result = exec::execute(prepared.path(), args);

    if let Prepared::Transient(path) = &prepared {
        remove_download(path);
    }

    let status = result.map_err(|e| {
        CliError::execution(format!(
            "Failed to run {}: {e}",
            prepared.path().display()
        ))
    })?;

    Ok(exec::exit_code(status))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use httpmock::prelude::*;
    use tempfile::TempDir;

    const SCRIPT: &str = "#!/bin/sh\nexit 0\n";

    fn context(cache_dir: Option<PathBuf>, ttl_secs: u64) -> AppContext {
        let config = Config {
            default_invalidate_after: ttl_secs,
            cache_dir,
            backing_cache_dir: None,
            aliases: std::collections::BTreeMap::new(),
        };
        AppContext::new(config, "/nonexistent/fan.config")
    }

    #[test]
    fn test_prepare_fetches_once_then_hits() {
        let temp = TempDir::new().unwrap();
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/tool.sh");
            then.status(200).body(SCRIPT);
        });
        let ctx = context(Some(temp.path().join("cache")), 3600);
        let url = server.url("/tool.sh");

        let first = prepare(&ctx, &url).unwrap();
        let second = prepare(&ctx, &url).unwrap();

        mock.assert_calls(1);
        assert!(matches!(first, Prepared::Cached(_)));
        assert_eq!(first, second);
        assert!(first.path().starts_with(temp.path().join("cache")));
        assert_eq!(fs::read_to_string(first.path()).unwrap(), SCRIPT);
    }

    #[test]
    fn test_prepare_without_cache_is_transient() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/tool.sh");
            then.status(200).body(SCRIPT);
        });
        let ctx = context(None, 3600);

        let prepared = prepare(&ctx, &server.url("/tool.sh")).unwrap();
        let Prepared::Transient(path) = prepared else {
            panic!("Expected a transient download");
        };
        assert!(path.exists());
        fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_prepare_zero_ttl_is_an_error() {
        let temp = TempDir::new().unwrap();
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/tool.sh");
            then.status(200).body(SCRIPT);
        });
        let ctx = context(Some(temp.path().join("cache")), 0);

        let err = prepare(&ctx, &server.url("/tool.sh")).unwrap_err();
        assert!(matches!(err, CliError::Cache { .. }));
    }

    #[test]
    fn test_prepare_fetch_failure() {
        let temp = TempDir::new().unwrap();
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/gone");
            then.status(404);
        });
        let ctx = context(Some(temp.path().join("cache")), 3600);

        let err = prepare(&ctx, &server.url("/gone")).unwrap_err();
        assert!(matches!(err, CliError::Fetch { .. }));
        assert!(!temp.path().join("cache").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_execute_run_resolves_alias_and_returns_exit_code() {
        let temp = TempDir::new().unwrap();
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/fail.sh");
            then.status(200).body("#!/bin/sh\nexit \"$1\"\n");
        });
        let mut ctx = context(Some(temp.path().join("cache")), 3600);
        ctx.config
            .aliases
            .insert("fail".to_string(), server.url("/fail.sh"));

        let code = execute_run(&ctx, "fail", &["5".to_string()]).unwrap();
        assert_eq!(code, 5);
    }
}
