//! The `midbench make` command resolves and instantiates an environment.
//!
//! Besides the environment, the default design and condition are
//! constructed so a broken registration fails here rather than mid-run.

use serde::Serialize;

use crate::cli::args::MakeArgs;
use crate::error::Result;
use crate::registration::EnvSpec;
use crate::ui::{MidbenchTheme, UserInterface};

use super::context::CommandContext;
use super::display::{format_kwargs, show_spec, to_json};
use super::dispatcher::{Command, CommandResult};

#[derive(Debug, Serialize)]
struct Made<'a> {
    requested: &'a str,
    env: &'a str,
    spec: &'a EnvSpec,
}

pub struct MakeCommand {
    ctx: CommandContext,
    args: MakeArgs,
}

impl MakeCommand {
    pub fn new(ctx: CommandContext, args: MakeArgs) -> Self {
        Self { ctx, args }
    }
}

impl Command for MakeCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let registry = self.ctx.registry()?;
        let kwargs = self.ctx.env_kwargs(&self.args.id, &self.args.kwargs);
        ui.detail(&format!("kwargs: {}", format_kwargs(&kwargs)));

        let made = registry.make(&self.args.id, kwargs)?;
        made.designs.create_default()?;
        made.conditions.create_default()?;

        let spec = made.env.spec();
        if self.args.json {
            let report = Made {
                requested: &self.args.id,
                env: made.env.unwrapped().name(),
                spec,
            };
            ui.message(&to_json(&report)?);
            return Ok(CommandResult::success());
        }

        ui.success(&format!(
            "Made {} ({})",
            spec.id,
            made.env.unwrapped().name()
        ));
        show_spec(ui, &MidbenchTheme::detect(), spec);

        Ok(CommandResult::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MidbenchConfig;
    use crate::error::MidbenchError;
    use crate::ui::MockUI;
    use serde_json::json;

    fn make(
        config: MidbenchConfig,
        id: &str,
        kwargs: &[(&str, serde_json::Value)],
    ) -> (Result<CommandResult>, MockUI) {
        let mut ui = MockUI::new();
        let cmd = MakeCommand::new(
            CommandContext::new(".", config),
            MakeArgs {
                id: id.to_string(),
                kwargs: kwargs
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.clone()))
                    .collect(),
                json: true,
            },
        );
        (cmd.execute(&mut ui), ui)
    }

    #[test]
    fn attached_record_carries_merged_kwargs() {
        let config: MidbenchConfig = serde_yaml::from_str(
            "environments:\n  HeatConduction2d-v0:\n    \
             workdir: /opt/heat\n    simulate_script: sim\n",
        )
        .unwrap();

        let (result, ui) = make(config, "HeatConduction2d-v0", &[("workdir", json!("/tmp/heat"))]);
        result.unwrap();

        let parsed: serde_json::Value = serde_json::from_str(&ui.output()).unwrap();
        assert_eq!(parsed["spec"]["id"], "HeatConduction2d-v0");
        assert_eq!(
            parsed["spec"]["kwargs"],
            json!({"workdir": "/tmp/heat", "simulate_script": "sim"})
        );
    }

    #[test]
    fn unversioned_id_resolves_to_latest() {
        let (result, ui) = make(MidbenchConfig::default(), "Airfoil2d", &[]);
        result.unwrap();

        let parsed: serde_json::Value = serde_json::from_str(&ui.output()).unwrap();
        assert_eq!(parsed["requested"], "Airfoil2d");
        assert_eq!(parsed["spec"]["id"], "Airfoil2d-v0");
    }

    #[test]
    fn unknown_kwarg_fails_construction() {
        let (result, _) = make(MidbenchConfig::default(), "Airfoil2d-v0", &[("bogus", json!(1))]);
        assert!(result.is_err());
    }

    #[test]
    fn misspelled_name_suggests_builtin() {
        let (result, _) = make(MidbenchConfig::default(), "Airfoil2D-v0", &[]);
        match result {
            Err(MidbenchError::NameNotFound { suggestion, .. }) => {
                assert_eq!(suggestion.as_deref(), Some("Airfoil2d"));
            }
            other => panic!("expected NameNotFound, got {:?}", other.map(|r| r.exit_code)),
        }
    }
}
