//! List command implementation.
//!
//! The `midbench list` command lists registered environments.

use serde::Serialize;

use crate::cli::args::ListArgs;
use crate::error::{MidbenchError, Result};
use crate::registration::suggest::closest_match;
use crate::registration::EnvSpec;
use crate::ui::{Table, UserInterface};

use super::context::CommandContext;
use super::display::to_json;
use super::dispatcher::{Command, CommandResult};

/// One row of `list --json`.
#[derive(Debug, Serialize)]
struct Listing<'a> {
    id: &'a str,
    namespace: Option<&'a str>,
    name: &'a str,
    version: Option<u32>,
    entry_point: Option<String>,
}

impl<'a> From<&'a EnvSpec> for Listing<'a> {
    fn from(spec: &'a EnvSpec) -> Self {
        Self {
            id: &spec.id,
            namespace: spec.namespace.as_deref(),
            name: &spec.name,
            version: spec.version,
            entry_point: spec.entry_point.as_ref().map(|e| e.to_string()),
        }
    }
}

/// The list command implementation.
pub struct ListCommand {
    ctx: CommandContext,
    args: ListArgs,
}

impl ListCommand {
    pub fn new(ctx: CommandContext, args: ListArgs) -> Self {
        Self { ctx, args }
    }
}

impl Command for ListCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let registry = self.ctx.registry()?;

        if let Some(ns) = &self.args.namespace {
            let namespaces = registry.namespaces();
            if !namespaces.contains(ns) {
                return Err(MidbenchError::NamespaceNotFound {
                    namespace: ns.clone(),
                    suggestion: closest_match(ns, namespaces.iter().map(String::as_str)),
                });
            }
        }

        let specs: Vec<EnvSpec> = registry
            .specs()
            .into_iter()
            .filter(|spec| match &self.args.namespace {
                Some(ns) => spec.namespace.as_deref() == Some(ns.as_str()),
                None => true,
            })
            .collect();

        if self.args.json {
            let listings: Vec<Listing<'_>> = specs.iter().map(Listing::from).collect();
            ui.message(&to_json(&listings)?);
            return Ok(CommandResult::success());
        }

        ui.show_header(&format!("Registered environments ({})", specs.len()));
        if specs.is_empty() {
            ui.message("No environments registered.");
            return Ok(CommandResult::success());
        }

        let mut table = Table::new(&["ID", "ENTRY POINT"]);
        for spec in &specs {
            let entry_point = spec
                .entry_point
                .as_ref()
                .map(|e| e.to_string())
                .unwrap_or_else(|| "-".to_string());
            table.add_row(&[spec.id.as_str(), entry_point.as_str()]);
        }
        ui.message(&table.render());

        Ok(CommandResult::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MidbenchConfig;
    use crate::ui::MockUI;

    fn list(args: ListArgs) -> (Result<CommandResult>, MockUI) {
        let mut ui = MockUI::new();
        let cmd = ListCommand::new(CommandContext::new(".", MidbenchConfig::default()), args);
        (cmd.execute(&mut ui), ui)
    }

    #[test]
    fn lists_builtins() {
        let (result, ui) = list(ListArgs::default());
        assert!(result.unwrap().success);
        assert!(ui.has_message("Airfoil2d-v0"));
        assert!(ui.has_message("HeatConduction2d-v0"));
        assert_eq!(ui.headers(), ["Registered environments (2)"]);
    }

    #[test]
    fn json_listing_is_parseable() {
        let (result, ui) = list(ListArgs {
            json: true,
            ..Default::default()
        });
        result.unwrap();

        let parsed: serde_json::Value = serde_json::from_str(&ui.output()).unwrap();
        let ids: Vec<&str> = parsed
            .as_array()
            .unwrap()
            .iter()
            .map(|row| row["id"].as_str().unwrap())
            .collect();
        assert_eq!(ids, ["Airfoil2d-v0", "HeatConduction2d-v0"]);
        assert_eq!(parsed[0]["version"], 0);
    }

    #[test]
    fn unknown_namespace_is_an_error() {
        let (result, _) = list(ListArgs {
            namespace: Some("nowhere".to_string()),
            json: false,
        });
        assert!(matches!(
            result,
            Err(MidbenchError::NamespaceNotFound { .. })
        ));
    }
}
