//! Configuration loading, merging, and validation for MIDbench.
//!
//! - Schema definitions in [`schema`]
//! - File discovery and loading in [`loader`]
//! - Deep merging in [`merger`]
//! - Validation in [`validator`]
//!
//! # Example
//!
//! ```
//! use midbench::config::{load_merged_config, validate};
//! use tempfile::TempDir;
//! use std::fs;
//!
//! let temp = TempDir::new().unwrap();
//! let dir = temp.path().join(".midbench");
//! fs::create_dir_all(&dir).unwrap();
//! fs::write(dir.join("config.yml"), "settings:\n  output_dir: out\n").unwrap();
//!
//! let config = load_merged_config(temp.path()).unwrap();
//! validate(&config).unwrap();
//! assert_eq!(config.settings.output_dir, std::path::PathBuf::from("out"));
//! ```
//!
//! # Configuration File Locations
//!
//! MIDbench discovers and merges configuration in this order:
//! 1. User global config (`~/.midbench/config.yml`)
//! 2. Project config (`.midbench/config.yml`)
//! 3. Local overrides (`.midbench/config.local.yml`)

pub mod loader;
pub mod merger;
pub mod schema;
pub mod validator;

pub use loader::{
    find_project_root, load_config, load_config_file, load_config_value, load_merged_config,
    parse_config, ConfigPaths, CONFIG_DIR,
};
pub use merger::{deep_merge, merge_configs};
pub use schema::{MidbenchConfig, OutputMode, PluginEntry, Settings};
pub use validator::{validate, validate_config, ValidationError};
