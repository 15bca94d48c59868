//! Built-in environments and registry bootstrap.
//!
//! The built-ins are registered by `module:attr` reference, so their modules
//! are only touched when one of them is made.

pub mod airfoil;
pub mod heatconduction;
pub mod su2;

use crate::config::MidbenchConfig;
use crate::error::Result;
use crate::registration::{Locator, PluginReport, Registration, Registry};

/// Ids of the environments registered by [`register_builtins`].
pub const BUILTIN_IDS: [&str; 2] = ["Airfoil2d-v0", "HeatConduction2d-v0"];

/// Register the built-in environments.
pub fn register_builtins(registry: &Registry) -> Result<()> {
    registry.register(
        "Airfoil2d-v0",
        Registration::new()
            .entry_point(Locator::from_parts(airfoil::MODULE_PATH, "Airfoil2dEnv"))
            .designs(Locator::from_parts(airfoil::MODULE_PATH, "Airfoil2dDesign"))
            .conditions(Locator::from_parts(
                airfoil::MODULE_PATH,
                "Airfoil2dCondition",
            )),
    )?;

    registry.register(
        "HeatConduction2d-v0",
        Registration::new()
            .entry_point(Locator::from_parts(
                heatconduction::MODULE_PATH,
                "Heatconduction2dEnv",
            ))
            .designs(Locator::from_parts(
                heatconduction::MODULE_PATH,
                "Heatconduction2dDesign",
            ))
            .conditions(Locator::from_parts(
                heatconduction::MODULE_PATH,
                "Heatconduction2dCondition",
            )),
    )?;

    Ok(())
}

/// Build a registry the way the CLI sees it: linked plugins, then configured
/// plugins, then the built-ins.
///
/// Plugin failures are contained in the returned report; only a failure to
/// register the built-ins is an error.
pub fn bootstrap(config: &MidbenchConfig) -> Result<(Registry, PluginReport)> {
    let registry = Registry::new();
    let group = config.settings.plugin_group.as_str();

    let mut report = registry.load_plugins(group);
    report.merge(registry.load_plugins_from(&config.entry_points(), group));

    register_builtins(&registry)?;
    tracing::debug!(
        environments = registry.len(),
        plugins = report.loaded.len(),
        "registry ready"
    );

    Ok((registry, report))
}
