//! The `midbench spec` command prints one registration record.

use crate::cli::args::SpecArgs;
use crate::error::Result;
use crate::ui::{MidbenchTheme, UserInterface};

use super::context::CommandContext;
use super::display::{show_spec, to_json};
use super::dispatcher::{Command, CommandResult};

pub struct SpecCommand {
    ctx: CommandContext,
    args: SpecArgs,
}

impl SpecCommand {
    pub fn new(ctx: CommandContext, args: SpecArgs) -> Self {
        Self { ctx, args }
    }
}

impl Command for SpecCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let spec = self.ctx.registry()?.spec(&self.args.id)?;

        if self.args.json {
            ui.message(&to_json(&spec)?);
        } else {
            show_spec(ui, &MidbenchTheme::detect(), &spec);
        }

        Ok(CommandResult::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MidbenchConfig;
    use crate::error::MidbenchError;
    use crate::ui::MockUI;

    fn spec(id: &str, json: bool) -> (Result<CommandResult>, MockUI) {
        let mut ui = MockUI::new();
        let cmd = SpecCommand::new(
            CommandContext::new(".", MidbenchConfig::default()),
            SpecArgs {
                id: id.to_string(),
                json,
            },
        );
        (cmd.execute(&mut ui), ui)
    }

    #[test]
    fn shows_builtin_record() {
        let (result, ui) = spec("HeatConduction2d-v0", false);
        result.unwrap();
        assert!(ui.has_message("HeatConduction2d-v0"));
        assert!(ui.has_message("heatconduction2d:Heatconduction2dEnv"));
    }

    #[test]
    fn json_record_serializes_locators() {
        let (result, ui) = spec("Airfoil2d-v0", true);
        result.unwrap();

        let parsed: serde_json::Value = serde_json::from_str(&ui.output()).unwrap();
        assert_eq!(parsed["id"], "Airfoil2d-v0");
        assert_eq!(
            parsed["conditions"],
            "midbench.envs.airfoil.airfoil2d:Airfoil2dCondition"
        );
    }

    #[test]
    fn spec_is_exact_about_versions() {
        let (result, _) = spec("Airfoil2d", false);
        assert!(matches!(result, Err(MidbenchError::EnvNotFound { .. })));

        let (result, _) = spec("Airfoil2d-v3", false);
        assert!(matches!(result, Err(MidbenchError::VersionNotFound { .. })));
    }
}
