//! Command-line interface for MIDbench.
//!
//! This module provides the CLI argument parsing using clap's derive macros
//! and command implementations.
//!
//! # Architecture
//!
//! - [`args`] - Argument definitions using clap derive macros
//! - [`commands`] - Command implementations

pub mod args;
pub mod commands;

pub use args::{
    parse_key_value, Cli, Commands, CompletionsArgs, KeyValue, ListArgs, MakeArgs, OptimizeArgs,
    PluginsArgs, RunArgs, SimulateArgs, SpecArgs,
};
pub use commands::{Command, CommandContext, CommandDispatcher, CommandResult};
