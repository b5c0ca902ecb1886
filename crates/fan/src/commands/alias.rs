//! `fan alias list|add|remove`

use crate::cli::CliError;
use crate::context::AppContext;
use crate::fetch;
use std::collections::BTreeMap;
use std::fmt::Write;
use tracing::{info, warn};

/// Render aliases one per line as `alias: url`, names right-aligned.
#[must_use]
pub fn format_alias_list(aliases: &BTreeMap<String, String>) -> String {
    let width = aliases.keys().map(|a| a.chars().count()).max().unwrap_or(0);

    let mut out = String::new();
    for (alias, url) in aliases {
        let _ = writeln!(out, "{alias:>width$}: {url}");
    }
    out
}

/// Add or replace `alias`, checking first that `url` can be fetched.
pub fn execute_add(
    ctx: &mut AppContext,
    alias: String,
    url: String,
    force: bool,
) -> Result<(), CliError> {
    if alias.trim().is_empty() {
        return Err(CliError::config("Alias name cannot be empty"));
    }

    if force {
        info!(%alias, %url, "Skipping reachability check");
    } else {
        let download = fetch::fetch_to_temp_file(&url).map_err(|e| {
            let mut err = CliError::from(e);
            if let CliError::Fetch { help, .. } = &mut err {
                *help = Some("Use --force to add the alias anyway".to_string());
            }
            err
        })?;
        if let Err(e) = std::fs::remove_file(&download) {
            warn!(path = %download.display(), error = %e, "Failed to remove downloaded file");
        }
    }

    if let Some(previous) = ctx.config.aliases.insert(alias.clone(), url) {
        info!(%alias, %previous, "Replacing alias");
    }
    ctx.save_config()?;
    Ok(())
}

/// Remove `aliases`; unknown names are reported and skipped.
///
/// Returns how many aliases were removed.
pub fn execute_remove(ctx: &mut AppContext, aliases: &[String]) -> Result<usize, CliError> {
    let mut removed = 0;
    for alias in aliases {
        if ctx.config.aliases.remove(alias).is_some() {
            removed += 1;
        } else {
            warn!(%alias, "No such alias");
        }
    }

    if removed > 0 {
        ctx.save_config()?;
    }
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use httpmock::prelude::*;
    use std::path::Path;
    use tempfile::TempDir;

    fn context(dir: &Path) -> AppContext {
        let config = Config {
            cache_dir: None,
            ..Config::default()
        };
        AppContext::new(config, dir.join("fan.config"))
    }

    #[test]
    fn test_format_alias_list_aligns_names() {
        let mut aliases = BTreeMap::new();
        aliases.insert("b".to_string(), "https://example.com/b".to_string());
        aliases.insert("long".to_string(), "https://example.com/long".to_string());

        assert_eq!(
            format_alias_list(&aliases),
            "   b: https://example.com/b\nlong: https://example.com/long\n"
        );
        assert_eq!(format_alias_list(&BTreeMap::new()), "");
    }

    #[test]
    fn test_add_checks_url_and_saves() {
        let temp = TempDir::new().unwrap();
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/hi.sh");
            then.status(200).body("#!/bin/sh\necho hi\n");
        });
        let mut ctx = context(temp.path());
        let url = server.url("/hi.sh");

        execute_add(&mut ctx, "hi".to_string(), url.clone(), false).unwrap();

        mock.assert();
        let saved = Config::load(&ctx.config_path).unwrap();
        assert_eq!(saved.resolve("hi"), url);
    }

    #[test]
    fn test_add_unreachable_url_fails_without_force() {
        let temp = TempDir::new().unwrap();
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/nope");
            then.status(404);
        });
        let mut ctx = context(temp.path());
        let url = server.url("/nope");

        let err = execute_add(&mut ctx, "nope".to_string(), url.clone(), false).unwrap_err();
        let CliError::Fetch { help, .. } = err else {
            panic!("Expected Fetch error");
        };
        assert!(help.is_some_and(|h| h.contains("--force")));
        assert!(!ctx.config_path.exists());

        execute_add(&mut ctx, "nope".to_string(), url.clone(), true).unwrap();
        assert_eq!(Config::load(&ctx.config_path).unwrap().resolve("nope"), url);
    }

    #[test]
    fn test_add_rejects_empty_name() {
        let temp = TempDir::new().unwrap();
        let mut ctx = context(temp.path());

        let err = execute_add(&mut ctx, " ".to_string(), "https://x".to_string(), true)
            .unwrap_err();
        assert!(matches!(err, CliError::Config { .. }));
    }

    #[test]
    fn test_remove_skips_unknown() {
        let temp = TempDir::new().unwrap();
        let mut ctx = context(temp.path());
        execute_add(&mut ctx, "a".to_string(), "https://example.com/a".to_string(), true).unwrap();
        execute_add(&mut ctx, "b".to_string(), "https://example.com/b".to_string(), true).unwrap();

        let removed =
            execute_remove(&mut ctx, &["a".to_string(), "zzz".to_string()]).unwrap();

        assert_eq!(removed, 1);
        let saved = Config::load(&ctx.config_path).unwrap();
        assert!(!saved.aliases.contains_key("a"));
        assert!(saved.aliases.contains_key("b"));
    }
}
