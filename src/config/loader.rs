//! Configuration loader with tier-based merging.

use super::merge::deep_merge_all;
use super::types::Config;
use anyhow::{Context, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const CONFIG_FILE: &str = "config.yaml";

/// Directories searched for `config.yaml`.
#[derive(Debug, Clone)]
pub struct ConfigPaths {
    /// Project-level config directory
    pub project_dir: Option<PathBuf>,
    /// User-level config directory
    pub user_dir: Option<PathBuf>,
}

impl Default for ConfigPaths {
    fn default() -> Self {
        Self::discover()
    }
}

impl ConfigPaths {
    /// Discover configuration directories from the environment.
    pub fn discover() -> Self {
        let project_dir = std::env::var("HITS_PROJECT_DIR")
            .ok()
            .map(PathBuf::from)
            .or_else(|| Some(PathBuf::from("hits")));

        let user_dir = std::env::var("HITS_USER_DIR")
            .ok()
            .map(PathBuf::from)
            .or_else(|| dirs::home_dir().map(|h| h.join(".hits")));

        Self {
            project_dir,
            user_dir,
        }
    }

    /// Create paths with explicit directories.
    pub fn with_dirs(project_dir: Option<PathBuf>, user_dir: Option<PathBuf>) -> Self {
        Self {
            project_dir,
            user_dir,
        }
    }
}

/// Read one tier's YAML file, if present, as a JSON value.
///
/// A file that exists but cannot be parsed is skipped with a warning.
fn read_tier(dir: Option<&Path>) -> Option<(PathBuf, Value)> {
    let file = dir?.join(CONFIG_FILE);
    if !file.exists() {
        return None;
    }
    let parsed = std::fs::read_to_string(&file)
        .map_err(anyhow::Error::from)
        .and_then(|content| Ok(serde_yaml::from_str::<Value>(&content)?));
    match parsed {
        Ok(value) => {
            debug!(path = %file.display(), "Loaded config tier");
            Some((file, value))
        }
        Err(e) => {
            warn!(path = %file.display(), error = %e, "Ignoring unreadable config file");
            None
        }
    }
}

/// Loads configuration from all tiers.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    pub paths: ConfigPaths,
    config: Config,
    /// Highest-priority config file that contributed, if any
    config_path: Option<PathBuf>,
}

impl ConfigLoader {
    /// Load configuration from the discovered tiers.
    pub fn load() -> Result<Self> {
        Self::load_with_paths(ConfigPaths::discover())
    }

    /// Load configuration from an explicit file, bypassing the tiers.
    pub fn load_file(path: &Path) -> Result<Self> {
        let mut config = Config::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?;
        Self::apply_env_overrides(&mut config);
        config.validate()?;
        Ok(Self {
            paths: ConfigPaths::with_dirs(None, None),
            config,
            config_path: Some(path.to_path_buf()),
        })
    }

    /// Load configuration with explicit tier directories.
    pub fn load_with_paths(paths: ConfigPaths) -> Result<Self> {
        if let Ok(explicit) = std::env::var("HITS_CONFIG_PATH") {
            let mut loader = Self::load_file(Path::new(&explicit))?;
            loader.paths = paths;
            return Ok(loader);
        }

        let mut tiers = vec![serde_json::to_value(Config::default())?];
        let mut config_path = None;

        for dir in [paths.project_dir.as_deref(), paths.user_dir.as_deref()] {
            if let Some((file, value)) = read_tier(dir) {
                tiers.push(value);
                config_path = Some(file);
            }
        }

        let mut config: Config = serde_json::from_value(deep_merge_all(tiers))?;
        Self::apply_env_overrides(&mut config);
        config.validate()?;

        Ok(Self {
            paths,
            config,
            config_path,
        })
    }

    fn apply_env_overrides(config: &mut Config) {
        if let Ok(db_path) = std::env::var("HITS_DB_PATH") {
            config.database.path = PathBuf::from(db_path);
        }
    }

    /// Get the loaded configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Consume the loader and return the configuration.
    pub fn into_config(self) -> Config {
        self.config
    }

    /// The highest-priority config file that was read, if any.
    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }
}
