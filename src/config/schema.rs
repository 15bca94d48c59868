//! Configuration schema definitions for MIDbench.
//!
//! This module contains the structs that map to the YAML configuration
//! file format.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::core::Kwargs;
use crate::registration::{EntryPoint, DEFAULT_GROUP};

/// Root configuration structure for `.midbench/config.yml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MidbenchConfig {
    /// Global settings
    pub settings: Settings,

    /// Extra plugin entry points, loaded after the linked ones
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub plugins: Vec<PluginEntry>,

    /// Per-environment keyword arguments, keyed by environment id
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub environments: IndexMap<String, Kwargs>,
}

impl MidbenchConfig {
    /// Configured plugins as entry points in the configured group.
    pub fn entry_points(&self) -> Vec<EntryPoint> {
        self.plugins
            .iter()
            .map(|p| EntryPoint::new(&self.settings.plugin_group, &p.name, &p.value))
            .collect()
    }

    /// Configured keyword arguments for an environment id.
    pub fn environment_kwargs(&self, id: &str) -> Kwargs {
        self.environments.get(id).cloned().unwrap_or_default()
    }
}

/// Global settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Entry-point group scanned for plugins
    pub plugin_group: String,

    /// Default directory for simulation and optimization results
    pub output_dir: PathBuf,

    /// Default output mode: verbose, normal, quiet, silent
    pub default_output: OutputMode,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            plugin_group: DEFAULT_GROUP.to_string(),
            output_dir: PathBuf::from("results"),
            default_output: OutputMode::Normal,
        }
    }
}

/// A plugin declared in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginEntry {
    /// Namespace the plugin registers under (`__root__` for none)
    pub name: String,

    /// `module:attr` of the registration hook
    pub value: String,
}

/// Output verbosity mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// Show all output including debug details
    Verbose,
    /// Standard output
    #[default]
    Normal,
    /// Only results and errors
    Quiet,
    /// No output except errors
    Silent,
}
