//! CLI command implementations.
//!
//! Each command implements the [`Command`] trait, which provides a uniform
//! interface for executing commands and reporting results. Commands other
//! than `completions` receive a [`CommandContext`] holding the loaded
//! configuration and build their own registry from it.

pub mod completions;
pub mod context;
pub mod dispatcher;
pub mod display;
pub mod evaluate;
pub mod list;
pub mod make;
pub mod optimize;
pub mod plugins;
pub mod simulate;
pub mod spec;

pub use context::CommandContext;
pub use dispatcher::{Command, CommandDispatcher, CommandResult};
