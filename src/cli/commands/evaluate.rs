//! Shared flow of `simulate` and `optimize`: make the environment, build and
//! prepare the design, build the condition, run, report metrics.

use std::fs;

use crate::cli::args::{to_kwargs, RunArgs};
use crate::core::Metrics;
use crate::error::Result;
use crate::ui::UserInterface;

use super::context::CommandContext;
use super::display::{format_kwargs, show_metrics};
use super::dispatcher::CommandResult;

/// Which environment operation to run, with its metric selection.
#[derive(Debug, Clone, Copy)]
pub enum Evaluation<'a> {
    Simulate { metrics: &'a [String] },
    Optimize { objectives: &'a [String] },
}

impl Evaluation<'_> {
    fn verb(&self) -> &'static str {
        match self {
            Self::Simulate { .. } => "Simulated",
            Self::Optimize { .. } => "Optimized",
        }
    }
}

/// Run `evaluation` for the environment named in `args`.
pub fn evaluate(
    ctx: &CommandContext,
    args: &RunArgs,
    evaluation: Evaluation<'_>,
    ui: &mut dyn UserInterface,
) -> Result<CommandResult> {
    let registry = ctx.registry()?;
    let kwargs = ctx.env_kwargs(&args.id, &args.kwargs);
    ui.detail(&format!("kwargs: {}", format_kwargs(&kwargs)));

    let mut made = registry.make(&args.id, kwargs)?;
    let id = made.env.spec().id.clone();
    ui.show_header(&id);

    let mut design = made.designs.create(&to_kwargs(&args.design))?;
    design.prepare()?;
    ui.detail(&format!("design: {:?}", design));

    let condition = made.conditions.create(&to_kwargs(&args.condition))?;
    ui.detail(&format!("condition: {:?}", condition));

    let output_dir = ctx.output_dir(args.output_dir.as_deref());
    fs::create_dir_all(&output_dir)?;
    ui.detail(&format!("output: {}", output_dir.display()));

    let metrics: Metrics = match evaluation {
        Evaluation::Simulate { metrics } => {
            made.env
                .simulate(design.as_ref(), condition.as_ref(), metrics, &output_dir)?
        }
        Evaluation::Optimize { objectives } => {
            made.env
                .optimize(design.as_ref(), condition.as_ref(), objectives, &output_dir)?
        }
    };
    tracing::debug!(env = %id, ?metrics, "{}", evaluation.verb().to_lowercase());

    show_metrics(ui, &metrics, args.json)?;
    ui.success(&format!("{} {}", evaluation.verb(), id));
    Ok(CommandResult::success())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MidbenchConfig;
    use crate::error::MidbenchError;
    use crate::ui::MockUI;
    use serde_json::json;
    use tempfile::TempDir;

    fn run_args(id: &str, output: &std::path::Path) -> RunArgs {
        RunArgs {
            id: id.to_string(),
            kwargs: Vec::new(),
            design: Vec::new(),
            condition: Vec::new(),
            output_dir: Some(output.to_path_buf()),
            json: false,
        }
    }

    #[cfg(unix)]
    #[test]
    fn unsupported_operation_surfaces() {
        let temp = TempDir::new().unwrap();
        let ctx = CommandContext::new(temp.path(), MidbenchConfig::default());
        let mut args = run_args("HeatConduction2d-v0", temp.path());
        args.design = vec![
            ("workdir".to_string(), json!(temp.path())),
            (
                "design_script".to_string(),
                json!(["sh", "-c", "touch Design/initial_v=0.5_resol=50_.xdmf"]),
            ),
        ];

        let err = evaluate(&ctx, &args, Evaluation::Simulate { metrics: &[] }, &mut MockUI::new())
            .unwrap_err();
        assert!(matches!(err, MidbenchError::Unsupported { .. }));
    }

    #[test]
    fn bad_condition_fails_before_running() {
        let temp = TempDir::new().unwrap();
        let ctx = CommandContext::new(temp.path(), MidbenchConfig::default());
        let mut args = run_args("Airfoil2d-v0", temp.path());
        args.condition = vec![("mach".to_string(), json!("fast"))];

        let err = evaluate(&ctx, &args, Evaluation::Simulate { metrics: &[] }, &mut MockUI::new())
            .unwrap_err();
        assert!(matches!(err, MidbenchError::Configuration { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn optimize_heat_conduction_with_stand_in_scripts() {
        let temp = TempDir::new().unwrap();
        let work = temp.path().join("work");
        fs::create_dir_all(&work).unwrap();

        let script = "mkdir -p RES && echo 0.25 > RES/Performance.txt";
        let config: MidbenchConfig = serde_yaml::from_value(serde_yaml::to_value(json!({
            "environments": {
                "HeatConduction2d-v0": {
                    "workdir": work,
                    "simulate_script": ["sh", "-c", script]
                }
            }
        })).unwrap())
        .unwrap();
        let ctx = CommandContext::new(temp.path(), config);

        let out = temp.path().join("out");
        let mut args = run_args("HeatConduction2d-v0", &out);
        args.json = true;
        args.design = vec![
            ("workdir".to_string(), json!(work)),
            (
                "design_script".to_string(),
                json!(["sh", "-c", "touch Design/initial_v=0.5_resol=50_.xdmf"]),
            ),
        ];

        let mut ui = MockUI::new();
        let result = evaluate(
            &ctx,
            &args,
            Evaluation::Optimize { objectives: &[] },
            &mut ui,
        )
        .unwrap();

        assert!(result.success);
        let parsed: serde_json::Value = serde_json::from_str(&ui.messages()[0]).unwrap();
        assert_eq!(parsed, json!({"performance": 0.25}));
        assert!(out.join("Performance.txt").exists());
        assert_eq!(ui.successes(), ["Optimized HeatConduction2d-v0"]);
        assert_eq!(ui.headers(), ["HeatConduction2d-v0"]);
    }
}
