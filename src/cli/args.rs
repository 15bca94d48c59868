//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! The main entry point is the [`Cli`] struct.

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use crate::core::Kwargs;

/// MIDbench - registry and runner for engineering design benchmarks.
#[derive(Debug, Parser)]
#[command(name = "midbench")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to config file (overrides the merged .midbench/config.yml layers)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Path to project root (overrides current directory)
    #[arg(short, long, global = true)]
    pub project: Option<PathBuf>,

    /// Show verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only print results
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List registered environments
    List(ListArgs),

    /// Show the registration record of an environment
    Spec(SpecArgs),

    /// Resolve and instantiate an environment
    Make(MakeArgs),

    /// Simulate a design under a condition
    Simulate(SimulateArgs),

    /// Optimize a design under a condition
    Optimize(OptimizeArgs),

    /// Show which plugins loaded
    Plugins(PluginsArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// A `key=value` pair; the value is JSON when it parses as JSON, else a string.
pub type KeyValue = (String, serde_json::Value);

/// Parse a `key=value` argument.
pub fn parse_key_value(arg: &str) -> Result<KeyValue, String> {
    let (key, raw) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{}'", arg))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing key in '{}'", arg));
    }

    let value = serde_json::from_str(raw)
        .unwrap_or_else(|_| serde_json::Value::String(raw.to_string()));
    Ok((key.to_string(), value))
}

/// Collect pairs into keyword arguments; later keys win.
pub fn to_kwargs(pairs: &[KeyValue]) -> Kwargs {
    pairs.iter().cloned().collect()
}

/// Arguments for the `list` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct ListArgs {
    /// Only list environments in this namespace
    #[arg(short, long)]
    pub namespace: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `spec` command.
#[derive(Debug, Clone, clap::Args)]
pub struct SpecArgs {
    /// Environment id, e.g. `Airfoil2d-v0`
    pub id: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `make` command.
#[derive(Debug, Clone, clap::Args)]
pub struct MakeArgs {
    /// Environment id; the version may be omitted to use the latest
    pub id: String,

    /// Environment keyword argument (repeatable)
    #[arg(short = 'k', long = "kwarg", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub kwargs: Vec<KeyValue>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments shared by `simulate` and `optimize`.
#[derive(Debug, Clone, clap::Args)]
pub struct RunArgs {
    /// Environment id
    pub id: String,

    /// Environment keyword argument (repeatable)
    #[arg(short = 'k', long = "kwarg", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub kwargs: Vec<KeyValue>,

    /// Design parameter (repeatable)
    #[arg(short = 'd', long = "design", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub design: Vec<KeyValue>,

    /// Condition parameter (repeatable)
    #[arg(
        short = 'c',
        long = "condition",
        value_name = "KEY=VALUE",
        value_parser = parse_key_value
    )]
    pub condition: Vec<KeyValue>,

    /// Output directory (defaults to settings.output_dir)
    #[arg(short = 'o', long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Output metrics as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `simulate` command.
#[derive(Debug, Clone, clap::Args)]
pub struct SimulateArgs {
    #[command(flatten)]
    pub run: RunArgs,

    /// Metric to report (repeatable; all when omitted)
    #[arg(short = 'm', long = "metric", value_name = "METRIC")]
    pub metrics: Vec<String>,
}

/// Arguments for the `optimize` command.
#[derive(Debug, Clone, clap::Args)]
pub struct OptimizeArgs {
    #[command(flatten)]
    pub run: RunArgs,

    /// Objective to report (repeatable; all when omitted)
    #[arg(long = "objective", value_name = "NAME")]
    pub objectives: Vec<String>,
}

/// Arguments for the `plugins` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct PluginsArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `completions` command.
#[derive(Debug, Clone, clap::Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}
