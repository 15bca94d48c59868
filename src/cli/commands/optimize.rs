//! The `midbench optimize` command.

use crate::cli::args::OptimizeArgs;
use crate::error::Result;
use crate::ui::UserInterface;

use super::context::CommandContext;
use super::dispatcher::{Command, CommandResult};
use super::evaluate::{evaluate, Evaluation};

pub struct OptimizeCommand {
    ctx: CommandContext,
    args: OptimizeArgs,
}

impl OptimizeCommand {
    pub fn new(ctx: CommandContext, args: OptimizeArgs) -> Self {
        Self { ctx, args }
    }
}

impl Command for OptimizeCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        evaluate(
            &self.ctx,
            &self.args.run,
            Evaluation::Optimize {
                objectives: &self.args.objectives,
            },
            ui,
        )
    }
}
