//! State shared by every command

use crate::config::{self, Config};
use fan_cache::CacheBackend;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Loaded configuration plus the cache it selects
#[derive(Debug)]
pub struct AppContext {
    /// Current configuration; commands may modify and save it
    pub config: Config,
    /// File the configuration was loaded from and is saved to
    pub config_path: PathBuf,
    /// Cache backend built from `config`
    pub cache: CacheBackend,
}

impl AppContext {
    /// Build a context from an already loaded configuration.
    #[must_use]
    pub fn new(config: Config, config_path: impl Into<PathBuf>) -> Self {
        let cache = config.cache_backend();
        Self {
            config,
            config_path: config_path.into(),
            cache,
        }
    }

    /// Load the configuration at `config_path`.
    pub fn load(config_path: &Path) -> config::Result<Self> {
        let config = Config::load(config_path)?;
        let ctx = Self::new(config, config_path);
        debug!(
            config = %ctx.config_path.display(),
            cache = ctx.cache.name(),
            "Loaded context"
        );
        Ok(ctx)
    }

    /// Persist the current configuration.
    pub fn save_config(&self) -> config::Result<()> {
        self.config.save(&self.config_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_selects_backend_from_config() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("fan.config");
        std::fs::write(
            &path,
            format!("cache_dir: {}\n", temp.path().join("cache").display()),
        )
        .unwrap();

        let ctx = AppContext::load(&path).unwrap();
        assert_eq!(ctx.cache.name(), "disk");
        assert_eq!(ctx.config_path, path);
    }

    #[test]
    fn test_save_config_writes_to_loaded_path() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("fan.config");

        let mut ctx = AppContext::load(&path).unwrap();
        ctx.config
            .aliases
            .insert("hi".to_string(), "https://example.com/hi".to_string());
        ctx.save_config().unwrap();

        let reloaded = Config::load(&path).unwrap();
        assert_eq!(reloaded.resolve("hi"), "https://example.com/hi");
    }
}
