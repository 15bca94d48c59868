//! Ordered storage of registration records.
//!
//! [`SpecStore`] owns every [`EnvSpec`] keyed by canonical id, in registration
//! order. It enforces that a `(namespace, name)` family is either unversioned
//! or versioned, never both, and it explains failed lookups with the most
//! specific error available.

use std::collections::BTreeSet;

use indexmap::IndexMap;

use crate::error::{MidbenchError, Result};
use crate::registration::id::{get_env_id, EnvId};
use crate::registration::spec::EnvSpec;
use crate::registration::suggest::closest_match;

/// Registration records keyed by canonical id.
#[derive(Debug, Default, Clone)]
pub struct SpecStore {
    specs: IndexMap<String, EnvSpec>,
}

impl SpecStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    /// Whether the store has no records.
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Look up a record by canonical id.
    pub fn get(&self, id: &str) -> Option<&EnvSpec> {
        self.specs.get(id)
    }

    /// Whether a record exists at a canonical id.
    pub fn contains(&self, id: &str) -> bool {
        self.specs.contains_key(id)
    }

    /// Records in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &EnvSpec> {
        self.specs.values()
    }

    /// Insert a record, returning the one it replaced.
    pub fn insert(&mut self, spec: EnvSpec) -> Option<EnvSpec> {
        self.specs.insert(spec.id.clone(), spec)
    }

    /// Records sharing `(namespace, name)`.
    pub fn family<'a>(
        &'a self,
        namespace: Option<&'a str>,
        name: &'a str,
    ) -> impl Iterator<Item = &'a EnvSpec> + 'a {
        self.specs
            .values()
            .filter(move |spec| spec.same_family(namespace, name))
    }

    /// Highest registered version of `(namespace, name)`.
    pub fn highest_version(&self, namespace: Option<&str>, name: &str) -> Option<u32> {
        self.family(namespace, name)
            .filter_map(|spec| spec.version)
            .max()
    }

    /// Every namespace that has at least one record.
    pub fn namespaces(&self) -> BTreeSet<String> {
        self.specs
            .values()
            .filter_map(|spec| spec.namespace.clone())
            .collect()
    }

    /// Every environment name in a namespace.
    pub fn names_in(&self, namespace: Option<&str>) -> BTreeSet<String> {
        self.specs
            .values()
            .filter(|spec| spec.namespace.as_deref() == namespace)
            .map(|spec| spec.name.clone())
            .collect()
    }

    /// Check that `spec` may be registered.
    ///
    /// # Errors
    ///
    /// Returns [`MidbenchError::Registration`] when `spec` is versioned and an
    /// unversioned record of the same family exists, or the other way round.
    pub fn check_register(&self, spec: &EnvSpec) -> Result<()> {
        let namespace = spec.namespace.as_deref();

        let latest_versioned = self
            .family(namespace, &spec.name)
            .filter(|s| s.version.is_some())
            .max_by_key(|s| s.version);
        let unversioned = self
            .family(namespace, &spec.name)
            .find(|s| s.version.is_none());

        if let (Some(existing), Some(_)) = (unversioned, spec.version) {
            return Err(MidbenchError::Registration {
                message: format!(
                    "Can't register the versioned environment `{}` when the unversioned \
                     environment `{}` of the same name already exists.",
                    spec.id, existing.id
                ),
            });
        }

        if let (Some(existing), None) = (latest_versioned, spec.version) {
            return Err(MidbenchError::Registration {
                message: format!(
                    "Can't register the unversioned environment `{}` when the versioned \
                     environment `{}` of the same name already exists. Note: the default \
                     behavior is that `make` with the unversioned environment will return \
                     the latest versioned environment",
                    spec.id, existing.id
                ),
            });
        }

        Ok(())
    }

    /// Explain why `id` has no record, from least to most specific:
    /// namespace, then name, then version.
    pub fn explain_missing(&self, id: &EnvId) -> MidbenchError {
        let namespace = id.namespace.as_deref();

        if self.contains(&id.to_string()) {
            return MidbenchError::EnvNotFound { id: id.to_string() };
        }

        if let Err(e) = self.check_name_exists(namespace, &id.name) {
            return e;
        }

        let Some(version) = id.version else {
            return MidbenchError::EnvNotFound { id: id.to_string() };
        };

        let unversioned_id = id.unversioned();
        let mut message = format!(
            "Environment version `v{}` for environment `{}` doesn't exist.",
            version, unversioned_id
        );

        let mut family: Vec<&EnvSpec> = self.family(namespace, &id.name).collect();
        family.sort_by_key(|spec| spec.version);

        if let Some(default) = family.iter().find(|spec| spec.version.is_none()) {
            message.push_str(&format!(
                " It provides the default version `{}`.",
                default.id
            ));
            if family.len() == 1 {
                return MidbenchError::DeprecatedEnv { message };
            }
        }

        let latest = family.iter().filter_map(|spec| spec.version).max();
        match latest {
            Some(latest) if version > latest => {
                let versions = family
                    .iter()
                    .filter_map(|spec| spec.version)
                    .map(|v| format!("`v{}`", v))
                    .collect::<Vec<_>>()
                    .join(", ");
                message.push_str(&format!(
                    " It provides versioned environments: [ {} ].",
                    versions
                ));
                MidbenchError::VersionNotFound { message }
            }
            Some(latest) if version < latest => MidbenchError::DeprecatedEnv {
                message: format!(
                    "Environment version v{} for `{}` is deprecated. Please use `{}` instead.",
                    version,
                    unversioned_id,
                    get_env_id(namespace, &id.name, Some(latest))
                ),
            },
            _ => MidbenchError::EnvNotFound { id: id.to_string() },
        }
    }

    fn check_namespace_exists(&self, namespace: Option<&str>) -> Result<()> {
        let Some(ns) = namespace else {
            return Ok(());
        };

        let namespaces = self.namespaces();
        if namespaces.contains(ns) {
            return Ok(());
        }

        Err(MidbenchError::NamespaceNotFound {
            namespace: ns.to_string(),
            suggestion: closest_match(ns, namespaces.iter().map(String::as_str)),
        })
    }

    fn check_name_exists(&self, namespace: Option<&str>, name: &str) -> Result<()> {
        self.check_namespace_exists(namespace)?;

        let names = self.names_in(namespace);
        if names.contains(name) {
            return Ok(());
        }

        Err(MidbenchError::NameNotFound {
            name: name.to_string(),
            namespace: namespace.map(str::to_string),
            suggestion: closest_match(name, names.iter().map(String::as_str)),
        })
    }
}
