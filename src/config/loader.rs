//! Configuration file discovery and loading.
//!
//! This module handles finding and loading configuration files from
//! various locations in the correct priority order.

use crate::config::merger::merge_configs;
use crate::config::schema::MidbenchConfig;
use crate::error::{MidbenchError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the per-user and per-project configuration directory.
pub const CONFIG_DIR: &str = ".midbench";

/// Paths to configuration files in priority order (later overrides earlier).
///
/// Merge order:
/// 1. User global config (`~/.midbench/config.yml`)
/// 2. Project config (`.midbench/config.yml`)
/// 3. Local overrides (`.midbench/config.local.yml`)
#[derive(Debug, Clone)]
pub struct ConfigPaths {
    /// User's global config: ~/.midbench/config.yml
    pub user_global: Option<PathBuf>,

    /// Project config: .midbench/config.yml
    pub project: Option<PathBuf>,

    /// Local overrides: .midbench/config.local.yml
    pub project_local: Option<PathBuf>,
}

impl ConfigPaths {
    /// Discover config files for the given project root.
    pub fn discover(project_root: &Path) -> Self {
        Self {
            user_global: dirs::home_dir()
                .and_then(|home| existing(home.join(CONFIG_DIR).join("config.yml"))),
            project: existing(project_root.join(CONFIG_DIR).join("config.yml")),
            project_local: existing(project_root.join(CONFIG_DIR).join("config.local.yml")),
        }
    }

    /// Returns all existing config paths in merge order.
    pub fn all_existing(&self) -> Vec<&PathBuf> {
        [&self.user_global, &self.project, &self.project_local]
            .into_iter()
            .flatten()
            .collect()
    }
}

fn existing(path: PathBuf) -> Option<PathBuf> {
    path.exists().then_some(path)
}

/// Find the project root by walking up from `start`.
///
/// Looks for a `.midbench` directory first, then falls back to `.git`.
pub fn find_project_root(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();

    loop {
        if current.join(CONFIG_DIR).is_dir() || current.join(".git").exists() {
            return Some(current);
        }

        if !current.pop() {
            return None;
        }
    }
}

/// Load a single config file and parse it into MidbenchConfig.
///
/// # Errors
///
/// Returns `ConfigNotFound` if the file doesn't exist.
/// Returns `ConfigParseError` if the YAML is invalid.
pub fn load_config_file(path: &Path) -> Result<MidbenchConfig> {
    let value = load_config_value(path)?;
    from_value(value, path)
}

/// Parse YAML content into MidbenchConfig.
pub fn parse_config(content: &str, source_path: &Path) -> Result<MidbenchConfig> {
    let value: serde_yaml::Value =
        serde_yaml::from_str(content).map_err(|e| MidbenchError::ConfigParseError {
            path: source_path.to_path_buf(),
            message: e.to_string(),
        })?;
    from_value(value, source_path)
}

fn from_value(value: serde_yaml::Value, source_path: &Path) -> Result<MidbenchConfig> {
    // An empty file parses to null
    if value.is_null() {
        return Ok(MidbenchConfig::default());
    }
    serde_yaml::from_value(value).map_err(|e| MidbenchError::ConfigParseError {
        path: source_path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Load a config file as raw YAML Value (for merging).
pub fn load_config_value(path: &Path) -> Result<serde_yaml::Value> {
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            MidbenchError::ConfigNotFound {
                path: path.to_path_buf(),
            }
        } else {
            MidbenchError::Io(e)
        }
    })?;

    serde_yaml::from_str(&content).map_err(|e| MidbenchError::ConfigParseError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Load and merge all config files for a project.
///
/// Unlike a single explicit file, missing layers are not an error: with no
/// config files at all the defaults apply.
///
/// # Errors
///
/// Returns `ConfigParseError` if any config file is invalid.
pub fn load_merged_config(project_root: &Path) -> Result<MidbenchConfig> {
    let paths = ConfigPaths::discover(project_root);

    let mut configs = Vec::new();
    for path in paths.all_existing() {
        tracing::debug!(path = %path.display(), "loading config layer");
        configs.push(load_config_value(path)?);
    }

    let merged = merge_configs(&configs);
    from_value(merged, &project_root.join(CONFIG_DIR).join("config.yml"))
}

/// Load config with optional path override.
///
/// If `config_override` is provided, loads only that file without merging.
/// Otherwise, discovers and merges all config files.
pub fn load_config(project_root: &Path, config_override: Option<&Path>) -> Result<MidbenchConfig> {
    match config_override {
        Some(path) => load_config_file(path),
        None => load_merged_config(project_root),
    }
}
