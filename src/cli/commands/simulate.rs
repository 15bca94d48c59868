//! The `midbench simulate` command.

use crate::cli::args::SimulateArgs;
use crate::error::Result;
use crate::ui::UserInterface;

use super::context::CommandContext;
use super::dispatcher::{Command, CommandResult};
use super::evaluate::{evaluate, Evaluation};

pub struct SimulateCommand {
    ctx: CommandContext,
    args: SimulateArgs,
}

impl SimulateCommand {
    pub fn new(ctx: CommandContext, args: SimulateArgs) -> Self {
        Self { ctx, args }
    }
}

impl Command for SimulateCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        evaluate(
            &self.ctx,
            &self.args.run,
            Evaluation::Simulate {
                metrics: &self.args.metrics,
            },
            ui,
        )
    }
}
