//! Registration records.
//!
//! An [`EnvSpec`] is what the registry stores for each id: references to the
//! environment constructor and the design/condition factories, plus default
//! keyword arguments. References are either a constructor the caller already
//! holds ([`EntryRef::Callable`]) or a `module:attr` [`Locator`] that is only
//! resolved the first time the environment is made.

use std::fmt;

use serde::{Serialize, Serializer};

use crate::core::{Condition, Design, Environment, Factory, Kwargs};
use crate::error::{MidbenchError, Result};
use crate::registration::id::EnvId;

/// A deferred `module:attr` reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Locator {
    value: String,
}

impl Locator {
    /// Create a locator from a `module:attr` string.
    ///
    /// The string is validated when the locator is resolved, not here, so that
    /// registration never depends on the referenced module.
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }

    /// Create a locator from separate module and attribute names.
    pub fn from_parts(module: &str, attr: &str) -> Self {
        Self::new(format!("{}:{}", module, attr))
    }

    /// The raw `module:attr` string.
    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// Split into `(module, attr)`.
    ///
    /// # Errors
    ///
    /// Returns [`MidbenchError::Configuration`] when there is no attribute
    /// part; a module alone cannot be constructed or invoked.
    pub fn split(&self) -> Result<(&str, &str)> {
        match self.value.split_once(':') {
            Some((module, attr)) if !module.is_empty() && !attr.is_empty() => Ok((module, attr)),
            _ => Err(MidbenchError::configuration(format!(
                "reference `{}` must be of the form module:attribute",
                self.value
            ))),
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

/// A reference to a constructor: direct, or resolved on first use.
pub enum EntryRef<T: ?Sized> {
    /// A constructor held directly.
    Callable(Factory<T>),
    /// A `module:attr` reference resolved through the module table.
    Locator(Locator),
}

impl<T: ?Sized> EntryRef<T> {
    /// Wrap a constructor function.
    pub fn callable<F>(create: F) -> Self
    where
        F: Fn(&Kwargs) -> Result<Box<T>> + Send + Sync + 'static,
    {
        Self::Callable(Factory::new(create))
    }
}

impl<T: ?Sized> Clone for EntryRef<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Callable(factory) => Self::Callable(factory.clone()),
            Self::Locator(locator) => Self::Locator(locator.clone()),
        }
    }
}

impl<T: ?Sized> fmt::Debug for EntryRef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Callable(_) => f.write_str("Callable(..)"),
            Self::Locator(locator) => f.debug_tuple("Locator").field(&locator.value).finish(),
        }
    }
}

impl<T: ?Sized> fmt::Display for EntryRef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Callable(_) => f.write_str("<callable>"),
            Self::Locator(locator) => locator.fmt(f),
        }
    }
}

impl<T: ?Sized> Serialize for EntryRef<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<T: ?Sized> From<&str> for EntryRef<T> {
    fn from(value: &str) -> Self {
        Self::Locator(Locator::new(value))
    }
}

impl<T: ?Sized> From<String> for EntryRef<T> {
    fn from(value: String) -> Self {
        Self::Locator(Locator::new(value))
    }
}

impl<T: ?Sized> From<Locator> for EntryRef<T> {
    fn from(value: Locator) -> Self {
        Self::Locator(value)
    }
}

impl<T: ?Sized> From<Factory<T>> for EntryRef<T> {
    fn from(value: Factory<T>) -> Self {
        Self::Callable(value)
    }
}

/// What a caller supplies to [`Registry::register`](super::Registry::register).
#[derive(Debug, Clone, Default)]
pub struct Registration {
    pub entry_point: Option<EntryRef<dyn Environment>>,
    pub designs: Option<EntryRef<dyn Design>>,
    pub conditions: Option<EntryRef<dyn Condition>>,
    pub kwargs: Kwargs,
}

impl Registration {
    /// An empty registration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the environment constructor.
    pub fn entry_point(mut self, entry_point: impl Into<EntryRef<dyn Environment>>) -> Self {
        self.entry_point = Some(entry_point.into());
        self
    }

    /// Set the design factory.
    pub fn designs(mut self, designs: impl Into<EntryRef<dyn Design>>) -> Self {
        self.designs = Some(designs.into());
        self
    }

    /// Set the condition factory.
    pub fn conditions(mut self, conditions: impl Into<EntryRef<dyn Condition>>) -> Self {
        self.conditions = Some(conditions.into());
        self
    }

    /// Add one default keyword argument.
    pub fn kwarg(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.kwargs.insert(key.into(), value.into());
        self
    }

    /// Replace the default keyword arguments.
    pub fn kwargs(mut self, kwargs: Kwargs) -> Self {
        self.kwargs = kwargs;
        self
    }
}

/// A stored registration.
#[derive(Debug, Clone, Serialize)]
pub struct EnvSpec {
    /// Canonical id.
    pub id: String,
    pub namespace: Option<String>,
    pub name: String,
    pub version: Option<u32>,
    pub entry_point: Option<EntryRef<dyn Environment>>,
    pub designs: Option<EntryRef<dyn Design>>,
    pub conditions: Option<EntryRef<dyn Condition>>,
    pub kwargs: Kwargs,
}

impl EnvSpec {
    /// Build a record for `id` from a registration.
    pub fn new(id: EnvId, registration: Registration) -> Self {
        Self {
            id: id.to_string(),
            namespace: id.namespace,
            name: id.name,
            version: id.version,
            entry_point: registration.entry_point,
            designs: registration.designs,
            conditions: registration.conditions,
            kwargs: registration.kwargs,
        }
    }

    /// The parsed id.
    pub fn env_id(&self) -> EnvId {
        EnvId {
            namespace: self.namespace.clone(),
            name: self.name.clone(),
            version: self.version,
        }
    }

    /// Whether this record belongs to the `(namespace, name)` family.
    pub fn same_family(&self, namespace: Option<&str>, name: &str) -> bool {
        self.namespace.as_deref() == namespace && self.name == name
    }
}
