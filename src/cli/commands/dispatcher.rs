//! Command dispatching.
//!
//! This module provides the core command infrastructure:
//! - [`Command`] trait for implementing commands
//! - [`CommandResult`] for uniform result reporting
//! - [`CommandDispatcher`] for routing CLI subcommands

use std::path::{Path, PathBuf};

use crate::cli::args::{Cli, Commands};
use crate::config::{load_config, validate};
use crate::error::Result;
use crate::ui::{OutputMode, UserInterface};

use super::context::CommandContext;

/// Trait for command implementations.
///
/// Each CLI subcommand implements this trait to provide its execution logic.
pub trait Command {
    /// Execute the command, reporting through `ui`.
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult>;
}

/// Result of command execution.
#[derive(Debug)]
pub struct CommandResult {
    /// Whether the command succeeded.
    pub success: bool,

    /// Exit code to use (0 for success, non-zero for failure).
    pub exit_code: i32,
}

impl CommandResult {
    /// Create a successful result.
    pub fn success() -> Self {
        Self {
            success: true,
            exit_code: 0,
        }
    }

    /// Create a failure result.
    pub fn failure(exit_code: i32) -> Self {
        Self {
            success: false,
            exit_code,
        }
    }
}

/// Dispatches CLI commands to their implementations.
pub struct CommandDispatcher {
    project_root: PathBuf,
    config_override: Option<PathBuf>,
}

impl CommandDispatcher {
    /// Create a new dispatcher for the given project root.
    pub fn new(project_root: PathBuf) -> Self {
        Self {
            project_root,
            config_override: None,
        }
    }

    /// Load only this config file instead of the merged layers.
    pub fn with_config_override(mut self, path: Option<PathBuf>) -> Self {
        self.config_override = path;
        self
    }

    /// Get the project root path.
    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// Load and validate the configuration for registry commands.
    ///
    /// The configured `default_output` applies unless `--verbose` or
    /// `--quiet` was given.
    pub fn context(&self, cli: &Cli, ui: &mut dyn UserInterface) -> Result<CommandContext> {
        let config = load_config(&self.project_root, self.config_override.as_deref())?;
        validate(&config)?;

        ui.set_output_mode(OutputMode::from_flags(
            cli.verbose,
            cli.quiet,
            config.settings.default_output,
        ));

        tracing::debug!(root = %self.project_root.display(), "configuration loaded");
        Ok(CommandContext::new(self.project_root.clone(), config))
    }

    /// Dispatch and execute a command.
    ///
    /// Only `completions` runs without loading the configuration.
    pub fn dispatch(&self, cli: &Cli, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        use super::{completions, list, make, optimize, plugins, simulate, spec};

        let command: Box<dyn Command> = match &cli.command {
            Commands::Completions(args) => {
                Box::new(completions::CompletionsCommand::new(args.clone()))
            }
            Commands::List(args) => {
                Box::new(list::ListCommand::new(self.context(cli, ui)?, args.clone()))
            }
            Commands::Spec(args) => {
                Box::new(spec::SpecCommand::new(self.context(cli, ui)?, args.clone()))
            }
            Commands::Make(args) => {
                Box::new(make::MakeCommand::new(self.context(cli, ui)?, args.clone()))
            }
            Commands::Simulate(args) => Box::new(simulate::SimulateCommand::new(
                self.context(cli, ui)?,
                args.clone(),
            )),
            Commands::Optimize(args) => Box::new(optimize::OptimizeCommand::new(
                self.context(cli, ui)?,
                args.clone(),
            )),
            Commands::Plugins(args) => Box::new(plugins::PluginsCommand::new(
                self.context(cli, ui)?,
                args.clone(),
            )),
        };

        command.execute(ui)
    }
}
