//! Plugin discovery.
//!
//! A plugin is an entry point `(group, name, "module:attr")` whose attribute is
//! a registration hook. Loading a group resolves each hook through the module
//! table and calls it with the registry, scoped to the namespace named by the
//! entry point. Entry points are linked in with [`inventory`]:
//!
//! ```ignore
//! inventory::submit! {
//!     EntryPointReg { group: "midbench.envs", name: "demo", value: "demo.widgets:register" }
//! }
//! ```
//!
//! or supplied by any [`EntryPointSource`], such as the `plugins:` section of
//! the configuration file.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::registration::namespace::with_namespace;
use crate::registration::spec::Locator;
use crate::registration::Registry;

/// Entry-point group scanned by default.
pub const DEFAULT_GROUP: &str = "midbench.envs";

/// Entry-point names that register at the root namespace.
const ROOT_NAMES: [&str; 2] = ["__root__", "__internal__"];

/// A plugin declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryPoint {
    pub group: String,
    /// Namespace the plugin registers under, or a root marker.
    pub name: String,
    /// `module:attr` of the registration hook.
    pub value: String,
}

impl EntryPoint {
    pub fn new(
        group: impl Into<String>,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            group: group.into(),
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn locator(&self) -> Locator {
        Locator::new(self.value.clone())
    }
}

/// An entry point linked into the binary.
#[derive(Debug)]
pub struct EntryPointReg {
    pub group: &'static str,
    pub name: &'static str,
    pub value: &'static str,
}

inventory::collect!(EntryPointReg);

impl From<&EntryPointReg> for EntryPoint {
    fn from(reg: &EntryPointReg) -> Self {
        EntryPoint::new(reg.group, reg.name, reg.value)
    }
}

/// Somewhere entry points can be enumerated from.
pub trait EntryPointSource {
    /// Entry points declared under `group`, in declaration order.
    fn entry_points(&self, group: &str) -> Vec<EntryPoint>;
}

impl EntryPointSource for [EntryPoint] {
    fn entry_points(&self, group: &str) -> Vec<EntryPoint> {
        self.iter().filter(|ep| ep.group == group).cloned().collect()
    }
}

impl EntryPointSource for Vec<EntryPoint> {
    fn entry_points(&self, group: &str) -> Vec<EntryPoint> {
        self.as_slice().entry_points(group)
    }
}

/// Entry points submitted with [`EntryPointReg`].
#[derive(Debug, Default, Clone, Copy)]
pub struct LinkedEntryPoints;

impl EntryPointSource for LinkedEntryPoints {
    fn entry_points(&self, group: &str) -> Vec<EntryPoint> {
        let mut found: Vec<EntryPoint> = inventory::iter::<EntryPointReg>
            .into_iter()
            .filter(|reg| reg.group == group)
            .map(EntryPoint::from)
            .collect();
        // inventory gives no ordering guarantee
        found.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.value.cmp(&b.value)));
        found
    }
}

/// How an entry-point name scopes the plugin's registrations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PluginScope {
    /// `__root__` or `__internal__`: no namespace.
    Root,
    /// Some other `__dunder__` name: warned about, no namespace.
    Unsupported,
    /// Registrations go under this namespace.
    Named(String),
}

impl PluginScope {
    pub fn classify(name: &str) -> Self {
        if ROOT_NAMES.contains(&name) {
            PluginScope::Root
        } else if name.starts_with("__") && name.ends_with("__") {
            PluginScope::Unsupported
        } else {
            PluginScope::Named(name.to_string())
        }
    }
}

/// A plugin that failed to load.
#[derive(Debug, Clone, Serialize)]
pub struct PluginFailure {
    pub name: String,
    pub value: String,
    pub error: String,
}

/// Outcome of loading one entry-point group.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PluginReport {
    pub group: String,
    /// Names of entry points whose hook ran successfully.
    pub loaded: Vec<String>,
    pub failed: Vec<PluginFailure>,
}

impl PluginReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }

    /// Fold another report into this one.
    pub fn merge(&mut self, other: PluginReport) {
        self.loaded.extend(other.loaded);
        self.failed.extend(other.failed);
    }
}

/// Load every entry point in `group` from `source` into `registry`.
///
/// Failures are logged and recorded in the report; they never abort the loop.
pub fn load_plugins_from(
    registry: &Registry,
    source: &dyn EntryPointSource,
    group: &str,
) -> PluginReport {
    let mut report = PluginReport {
        group: group.to_string(),
        ..PluginReport::default()
    };

    for entry_point in source.entry_points(group) {
        match load_entry_point(registry, &entry_point) {
            Ok(()) => {
                tracing::debug!(
                    plugin = %entry_point.name,
                    value = %entry_point.value,
                    "loaded plugin"
                );
                report.loaded.push(entry_point.name);
            }
            Err(e) => {
                tracing::warn!("plugin {} failed to load: {}", entry_point.value, e);
                report.failed.push(PluginFailure {
                    name: entry_point.name,
                    value: entry_point.value,
                    error: e.to_string(),
                });
            }
        }
    }

    report
}

fn load_entry_point(registry: &Registry, entry_point: &EntryPoint) -> Result<()> {
    let locator = entry_point.locator();
    locator.split()?;

    let run = || -> Result<()> {
        let hook = registry.modules().resolve_hook(&locator, registry)?;
        hook(registry)
    };

    match PluginScope::classify(&entry_point.name) {
        PluginScope::Root => run(),
        PluginScope::Unsupported => {
            tracing::warn!(
                "The environment namespace magic key `{}` is unsupported. To register an \
                 environment at the root namespace you should specify the `__root__` namespace.",
                entry_point.name
            );
            run()
        }
        PluginScope::Named(ns) => with_namespace(ns, run),
    }
}
