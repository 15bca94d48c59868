//! Shared display helpers for registration records and results.
//!
//! Used by `spec`, `make`, `simulate` and `optimize` so records and metrics
//! render the same everywhere.

use serde::Serialize;

use crate::core::{Kwargs, Metrics};
use crate::error::{MidbenchError, Result};
use crate::registration::EnvSpec;
use crate::ui::{MidbenchTheme, Table, UserInterface};

const KEY_WIDTH: usize = 11;

/// Pretty JSON for `--json` output.
pub fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(|e| MidbenchError::Other(e.into()))
}

/// Print a registration record as aligned `key: value` lines.
pub fn show_spec(ui: &mut dyn UserInterface, theme: &MidbenchTheme, spec: &EnvSpec) {
    let unset = || theme.dim.apply_to("-").to_string();
    let fields = [
        ("id", theme.highlight.apply_to(&spec.id).to_string()),
        ("namespace", spec.namespace.clone().unwrap_or_else(unset)),
        ("name", spec.name.clone()),
        (
            "version",
            spec.version.map(|v| v.to_string()).unwrap_or_else(unset),
        ),
        (
            "entry_point",
            spec.entry_point.as_ref().map(|e| e.to_string()).unwrap_or_else(unset),
        ),
        (
            "designs",
            spec.designs.as_ref().map(|e| e.to_string()).unwrap_or_else(unset),
        ),
        (
            "conditions",
            spec.conditions.as_ref().map(|e| e.to_string()).unwrap_or_else(unset),
        ),
        ("kwargs", format_kwargs(&spec.kwargs)),
    ];

    for (key, value) in fields {
        ui.message(&theme.format_key_value(key, &value, KEY_WIDTH));
    }
}

/// Compact single-line JSON for kwargs; `{}` when empty.
pub fn format_kwargs(kwargs: &Kwargs) -> String {
    serde_json::Value::Object(kwargs.clone()).to_string()
}

/// Print metrics as a two-column table, or as a JSON object.
pub fn show_metrics(
    ui: &mut dyn UserInterface,
    metrics: &Metrics,
    json: bool,
) -> Result<()> {
    if json {
        ui.message(&to_json(metrics)?);
        return Ok(());
    }

    let mut table = Table::new(&["METRIC", "VALUE"]);
    for (name, value) in metrics {
        table.add_row(&[name.clone(), format_metric(*value)]);
    }
    ui.message(&table.render());
    Ok(())
}

fn format_metric(value: f64) -> String {
    if value != 0.0 && (value.abs() < 1e-3 || value.abs() >= 1e6) {
        format!("{:e}", value)
    } else {
        format!("{}", value)
    }
}
