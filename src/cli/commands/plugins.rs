//! The `midbench plugins` command reports which plugins loaded.
//!
//! Exits with status 1 when any plugin failed, so scripts can detect a
//! partially loaded registry.

use crate::cli::args::PluginsArgs;
use crate::error::Result;
use crate::ui::{Table, UserInterface};

use super::context::CommandContext;
use super::display::to_json;
use super::dispatcher::{Command, CommandResult};

pub struct PluginsCommand {
    ctx: CommandContext,
    args: PluginsArgs,
}

impl PluginsCommand {
    pub fn new(ctx: CommandContext, args: PluginsArgs) -> Self {
        Self { ctx, args }
    }
}

impl Command for PluginsCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let (registry, report) = self.ctx.bootstrap()?;
        let result = if report.is_clean() {
            CommandResult::success()
        } else {
            CommandResult::failure(1)
        };

        if self.args.json {
            ui.message(&to_json(&report)?);
            return Ok(result);
        }

        ui.show_header(&format!("Plugins ({})", report.group));
        if report.loaded.is_empty() && report.failed.is_empty() {
            ui.message("No plugins found.");
        }
        for name in &report.loaded {
            ui.success(name);
        }
        if !report.failed.is_empty() {
            let mut table = Table::new(&["NAME", "VALUE", "ERROR"]);
            for failure in &report.failed {
                table.add_row(&[&failure.name, &failure.value, &failure.error]);
            }
            ui.message(&table.render());
        }
        ui.detail(&format!("{} environments registered", registry.len()));

        Ok(result)
    }
}
