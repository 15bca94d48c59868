//! The environment registry.
//!
//! [`Registry`] ties the pieces together: it registers records into its
//! [`SpecStore`], resolves ids to records with latest-version fallback, and
//! instantiates the environment/design/condition triad, importing modules
//! through its [`ModuleTable`] as deferred references require.

use std::collections::BTreeSet;
use std::fmt;

use parking_lot::RwLock;

use crate::core::{Env, Kwargs, MadeEnv};
use crate::error::{MidbenchError, Result};
use crate::registration::id::EnvId;
use crate::registration::modules::ModuleTable;
use crate::registration::namespace::current_namespace;
use crate::registration::plugins::{self, EntryPointSource, LinkedEntryPoints, PluginReport};
use crate::registration::spec::{EnvSpec, Registration};
use crate::registration::store::SpecStore;

/// An environment registry.
///
/// Registries are explicit values; nothing is global. `Registry` is `Send` and
/// `Sync`, and no lock is held while module hooks or constructors run, so
/// hooks may call back into [`register`](Self::register).
pub struct Registry {
    store: RwLock<SpecStore>,
    modules: ModuleTable,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// An empty registry that can import every linked module.
    pub fn new() -> Self {
        Self::with_modules(ModuleTable::linked())
    }

    /// An empty registry importing from `modules`.
    pub fn with_modules(modules: ModuleTable) -> Self {
        Self {
            store: RwLock::new(SpecStore::new()),
            modules,
        }
    }

    /// The module table deferred references resolve against.
    pub fn modules(&self) -> &ModuleTable {
        &self.modules
    }

    /// Register an environment.
    ///
    /// An active [namespace scope](super::namespace) replaces the namespace
    /// given in `id`. Registering an existing id replaces the old record with
    /// a warning.
    ///
    /// # Errors
    ///
    /// - [`MidbenchError::MalformedId`] if `id` does not parse
    /// - [`MidbenchError::Registration`] if it would mix versioned and
    ///   unversioned records of the same name
    pub fn register(&self, id: &str, registration: Registration) -> Result<()> {
        let parsed = EnvId::parse(id)?;

        let env_id = match current_namespace() {
            Some(ns) => {
                if let Some(given) = parsed.namespace.as_deref().filter(|given| *given != ns) {
                    tracing::warn!(
                        "Custom namespace `{}` is being overridden by namespace `{}`. If you are \
                         developing a plugin you shouldn't specify a namespace in `register` \
                         calls. The namespace is specified through the entry point name.",
                        given,
                        ns
                    );
                }
                parsed.with_namespace(Some(ns))
            }
            None => parsed,
        };

        let spec = EnvSpec::new(env_id, registration);

        let mut store = self.store.write();
        store.check_register(&spec)?;
        if store.contains(&spec.id) {
            tracing::warn!("Overriding environment {}", spec.id);
        }
        tracing::debug!(env = %spec.id, "registered environment");
        store.insert(spec);

        Ok(())
    }

    /// Make an environment by id.
    ///
    /// A `module:` prefix imports that module first, so its import hook can
    /// register the environment. `kwargs` override the registered defaults.
    ///
    /// # Errors
    ///
    /// Any error from id parsing, module import, lookup (see
    /// [`make_id`](Self::make_id)) or construction.
    pub fn make(&self, id: &str, kwargs: Kwargs) -> Result<MadeEnv> {
        let id = match id.split_once(':') {
            Some((module, rest)) => {
                self.modules.import(module, self)?;
                rest
            }
            None => id,
        };
        self.make_id(&EnvId::parse(id)?, kwargs)
    }

    /// Make an environment from a parsed id.
    ///
    /// Without a version, the highest registered version is used if one
    /// exists. Asking for an older version than the highest still works but
    /// logs a warning.
    ///
    /// # Errors
    ///
    /// When no record matches: [`MidbenchError::NamespaceNotFound`],
    /// [`MidbenchError::NameNotFound`], [`MidbenchError::DeprecatedEnv`],
    /// [`MidbenchError::VersionNotFound`] or [`MidbenchError::EnvNotFound`],
    /// whichever is most specific.
    pub fn make_id(&self, id: &EnvId, kwargs: Kwargs) -> Result<MadeEnv> {
        let spec = self.lookup(id)?;
        self.make_spec(&spec, kwargs)
    }

    /// Make an environment from a record, skipping lookup.
    ///
    /// # Errors
    ///
    /// [`MidbenchError::Configuration`] if the record lacks an entry point,
    /// designs or conditions; otherwise whatever resolution or construction
    /// reports.
    pub fn make_spec(&self, spec: &EnvSpec, kwargs: Kwargs) -> Result<MadeEnv> {
        let mut merged = spec.kwargs.clone();
        merged.extend(kwargs);

        let entry_point = spec.entry_point.as_ref().ok_or_else(|| {
            MidbenchError::configuration(format!(
                "{} registered but entry_point is not specified",
                spec.id
            ))
        })?;
        let create = self.modules.normalize(entry_point, self)?;
        let env = create.create(&merged)?;

        let designs = spec.designs.as_ref().ok_or_else(|| {
            MidbenchError::configuration(format!(
                "{} registered but designs are not specified",
                spec.id
            ))
        })?;
        let designs = self.modules.normalize(designs, self)?;

        let conditions = spec.conditions.as_ref().ok_or_else(|| {
            MidbenchError::configuration(format!(
                "{} registered but conditions are not specified",
                spec.id
            ))
        })?;
        let conditions = self.modules.normalize(conditions, self)?;

        let mut attached = spec.clone();
        attached.kwargs = merged;
        tracing::debug!(env = %attached.id, "made environment");

        Ok(MadeEnv {
            env: Env::new(env, attached),
            designs,
            conditions,
        })
    }

    /// The record registered at exactly `id`.
    ///
    /// # Errors
    ///
    /// [`MidbenchError::MalformedId`], or the same not-found errors as
    /// [`make_id`](Self::make_id).
    pub fn spec(&self, id: &str) -> Result<EnvSpec> {
        let id = EnvId::parse(id)?;
        let store = self.store.read();
        store
            .get(&id.to_string())
            .cloned()
            .ok_or_else(|| store.explain_missing(&id))
    }

    fn lookup(&self, id: &EnvId) -> Result<EnvSpec> {
        let store = self.store.read();
        let latest = store.highest_version(id.namespace.as_deref(), &id.name);

        let id = match (id.version, latest) {
            (Some(requested), Some(latest)) => {
                if latest > requested {
                    tracing::warn!(
                        "The environment {} is out of date. You should consider upgrading to \
                         version `v{}`.",
                        id,
                        latest
                    );
                }
                id.clone()
            }
            (None, Some(latest)) => {
                let substituted = id.with_version(Some(latest));
                tracing::warn!(
                    "Using the latest versioned environment `{}` instead of the unversioned \
                     environment `{}`.",
                    substituted,
                    id
                );
                substituted
            }
            _ => id.clone(),
        };

        store
            .get(&id.to_string())
            .cloned()
            .ok_or_else(|| store.explain_missing(&id))
    }

    /// Snapshot of every record, in registration order.
    pub fn specs(&self) -> Vec<EnvSpec> {
        self.store.read().iter().cloned().collect()
    }

    /// Registered ids, in registration order.
    pub fn ids(&self) -> Vec<String> {
        self.store.read().iter().map(|spec| spec.id.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.store.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.read().is_empty()
    }

    /// Whether a record exists at exactly `id`.
    pub fn contains(&self, id: &str) -> bool {
        match EnvId::parse(id) {
            Ok(id) => self.store.read().contains(&id.to_string()),
            Err(_) => false,
        }
    }

    /// Namespaces with at least one record.
    pub fn namespaces(&self) -> BTreeSet<String> {
        self.store.read().namespaces()
    }

    /// Load plugins linked into the binary under `group`.
    pub fn load_plugins(&self, group: &str) -> PluginReport {
        self.load_plugins_from(&LinkedEntryPoints, group)
    }

    /// Load plugins from any entry-point source.
    pub fn load_plugins_from(&self, source: &dyn EntryPointSource, group: &str) -> PluginReport {
        plugins::load_plugins_from(self, source, group)
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("ids", &self.ids())
            .field("modules", &self.modules)
            .finish()
    }
}
