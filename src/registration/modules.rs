//! Importable modules for deferred `module:attr` references.
//!
//! A module is a named set of attributes: environment constructors, design and
//! condition factories, and registration hooks. Modules linked into the binary
//! are declared with [`inventory`]:
//!
//! ```ignore
//! static WIDGETS: ModuleDef = ModuleDef {
//!     path: "demo.widgets",
//!     attrs: &[("WidgetEnv", StaticAttr::Env(widget_env))],
//!     on_import: Some(register_widgets),
//! };
//! inventory::submit! { ModuleReg(&WIDGETS) }
//! ```
//!
//! More modules can be installed at runtime with [`ModuleTable::install`].
//! "Importing" a module runs its `on_import` hook once per table, which is how
//! `make("demo.widgets:Widget-v0")` can register environments on demand.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::thread::{self, ThreadId};

use parking_lot::{Condvar, Mutex, RwLock};

use crate::core::{Condition, Design, EnvCreator, Environment, Factory, Kwargs};
use crate::error::{MidbenchError, Result};
use crate::registration::spec::{EntryRef, Locator};
use crate::registration::Registry;

/// A hook run against a registry: import hooks and plugin entry points.
pub type Hook = Arc<dyn Fn(&Registry) -> Result<()> + Send + Sync>;

/// Function-pointer forms, usable in `static` module definitions.
pub type EnvFn = fn(&Kwargs) -> Result<Box<dyn Environment>>;
pub type DesignFn = fn(&Kwargs) -> Result<Box<dyn Design>>;
pub type ConditionFn = fn(&Kwargs) -> Result<Box<dyn Condition>>;
pub type HookFn = fn(&Registry) -> Result<()>;

/// An attribute of a linked module.
#[derive(Clone, Copy)]
pub enum StaticAttr {
    Env(EnvFn),
    Design(DesignFn),
    Condition(ConditionFn),
    Hook(HookFn),
}

/// A module linked into the binary.
pub struct ModuleDef {
    /// Dotted module path, e.g. `midbench.envs.airfoil`.
    pub path: &'static str,
    pub attrs: &'static [(&'static str, StaticAttr)],
    /// Run the first time the module is imported.
    pub on_import: Option<HookFn>,
}

/// Registration wrapper for [`inventory`] collection.
pub struct ModuleReg(pub &'static ModuleDef);
inventory::collect!(ModuleReg);

/// An attribute of an installed module.
#[derive(Clone)]
pub enum Attr {
    Env(EnvCreator),
    Design(Factory<dyn Design>),
    Condition(Factory<dyn Condition>),
    Hook(Hook),
}

impl Attr {
    fn kind(&self) -> &'static str {
        match self {
            Attr::Env(_) => <dyn Environment as Constructible>::KIND,
            Attr::Design(_) => <dyn Design as Constructible>::KIND,
            Attr::Condition(_) => <dyn Condition as Constructible>::KIND,
            Attr::Hook(_) => "registration hook",
        }
    }
}

impl From<StaticAttr> for Attr {
    fn from(attr: StaticAttr) -> Self {
        match attr {
            StaticAttr::Env(f) => Attr::Env(EnvCreator::new(f)),
            StaticAttr::Design(f) => Attr::Design(Factory::new(f)),
            StaticAttr::Condition(f) => Attr::Condition(Factory::new(f)),
            StaticAttr::Hook(f) => Attr::Hook(Arc::new(f)),
        }
    }
}

impl fmt::Debug for Attr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind())
    }
}

/// Trait objects that a module attribute can construct.
pub trait Constructible: 'static {
    /// Noun used in error messages.
    const KIND: &'static str;

    /// Extract a factory of this kind from an attribute.
    fn from_attr(attr: &Attr) -> Option<Factory<Self>>;
}

impl Constructible for dyn Environment {
    const KIND: &'static str = "environment constructor";

    fn from_attr(attr: &Attr) -> Option<EnvCreator> {
        match attr {
            Attr::Env(f) => Some(f.clone()),
            _ => None,
        }
    }
}

impl Constructible for dyn Design {
    const KIND: &'static str = "design factory";

    fn from_attr(attr: &Attr) -> Option<Factory<Self>> {
        match attr {
            Attr::Design(f) => Some(f.clone()),
            _ => None,
        }
    }
}

impl Constructible for dyn Condition {
    const KIND: &'static str = "condition factory";

    fn from_attr(attr: &Attr) -> Option<Factory<Self>> {
        match attr {
            Attr::Condition(f) => Some(f.clone()),
            _ => None,
        }
    }
}

/// An importable module.
#[derive(Clone)]
pub struct Module {
    path: String,
    attrs: HashMap<String, Attr>,
    on_import: Option<Hook>,
}

impl Module {
    /// An empty module at `path`.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            attrs: HashMap::new(),
            on_import: None,
        }
    }

    /// Module path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Add an attribute.
    pub fn attr(mut self, name: impl Into<String>, attr: Attr) -> Self {
        self.attrs.insert(name.into(), attr);
        self
    }

    /// Add an environment constructor.
    pub fn env<F>(self, name: &str, create: F) -> Self
    where
        F: Fn(&Kwargs) -> Result<Box<dyn Environment>> + Send + Sync + 'static,
    {
        self.attr(name, Attr::Env(EnvCreator::new(create)))
    }

    /// Add a design factory.
    pub fn design<F>(self, name: &str, create: F) -> Self
    where
        F: Fn(&Kwargs) -> Result<Box<dyn Design>> + Send + Sync + 'static,
    {
        self.attr(name, Attr::Design(Factory::new(create)))
    }

    /// Add a condition factory.
    pub fn condition<F>(self, name: &str, create: F) -> Self
    where
        F: Fn(&Kwargs) -> Result<Box<dyn Condition>> + Send + Sync + 'static,
    {
        self.attr(name, Attr::Condition(Factory::new(create)))
    }

    /// Add a registration hook, callable as a plugin entry point.
    pub fn hook<F>(self, name: &str, hook: F) -> Self
    where
        F: Fn(&Registry) -> Result<()> + Send + Sync + 'static,
    {
        self.attr(name, Attr::Hook(Arc::new(hook)))
    }

    /// Run `hook` the first time this module is imported.
    pub fn on_import<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Registry) -> Result<()> + Send + Sync + 'static,
    {
        self.on_import = Some(Arc::new(hook));
        self
    }

    fn get(&self, name: &str) -> Result<&Attr> {
        self.attrs
            .get(name)
            .ok_or_else(|| MidbenchError::AttributeNotFound {
                module: self.path.clone(),
                attr: name.to_string(),
            })
    }
}

impl From<&ModuleDef> for Module {
    fn from(def: &ModuleDef) -> Self {
        Self {
            path: def.path.to_string(),
            attrs: def
                .attrs
                .iter()
                .map(|(name, attr)| (name.to_string(), Attr::from(*attr)))
                .collect(),
            on_import: def.on_import.map(|f| Arc::new(f) as Hook),
        }
    }
}

impl fmt::Debug for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut attrs: Vec<_> = self.attrs.keys().collect();
        attrs.sort();
        f.debug_struct("Module")
            .field("path", &self.path)
            .field("attrs", &attrs)
            .field("on_import", &self.on_import.is_some())
            .finish()
    }
}

/// Import progress of one module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ImportState {
    /// The `on_import` hook is running on this thread.
    Running(ThreadId),
    Done,
}

/// The set of modules a registry can import from.
#[derive(Default)]
pub struct ModuleTable {
    modules: RwLock<HashMap<String, Arc<Module>>>,
    imports: Mutex<HashMap<String, ImportState>>,
    import_finished: Condvar,
}

/// Clears a running import if its hook fails or unwinds, waking waiters.
struct RunningImport<'a> {
    table: &'a ModuleTable,
    path: &'a str,
    succeeded: bool,
}

impl Drop for RunningImport<'_> {
    fn drop(&mut self) {
        let mut imports = self.table.imports.lock();
        if self.succeeded {
            imports.insert(self.path.to_string(), ImportState::Done);
        } else {
            imports.remove(self.path);
        }
        drop(imports);
        self.table.import_finished.notify_all();
    }
}

impl ModuleTable {
    /// A table with no modules.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A table holding every module linked in via [`ModuleReg`].
    pub fn linked() -> Self {
        let table = Self::empty();
        for reg in inventory::iter::<ModuleReg> {
            table.install(Module::from(reg.0));
        }
        table
    }

    /// Add or replace a module.
    pub fn install(&self, module: Module) {
        let path = module.path.clone();
        if self
            .modules
            .write()
            .insert(path.clone(), Arc::new(module))
            .is_some()
        {
            tracing::debug!(module = %path, "replaced module");
        }
        self.imports.lock().remove(&path);
        self.import_finished.notify_all();
    }

    /// Whether a module is available.
    pub fn contains(&self, path: &str) -> bool {
        self.modules.read().contains_key(path)
    }

    /// Sorted module paths.
    pub fn paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self.modules.read().keys().cloned().collect();
        paths.sort();
        paths
    }

    fn lookup(&self, path: &str) -> Result<Arc<Module>> {
        self.modules
            .read()
            .get(path)
            .cloned()
            .ok_or_else(|| MidbenchError::ModuleNotFound {
                module: path.to_string(),
            })
    }

    /// Import a module, running its `on_import` hook if this is the first import.
    ///
    /// While the hook runs, imports of the same module from other threads
    /// wait for it to finish. A re-import from inside the hook returns at once.
    ///
    /// # Errors
    ///
    /// Returns [`MidbenchError::ModuleImport`] wrapping the cause when the
    /// module is unknown or its hook fails. A failed import is not remembered,
    /// so the next import runs the hook again.
    pub fn import(&self, path: &str, registry: &Registry) -> Result<Arc<Module>> {
        let wrap = |source: MidbenchError| MidbenchError::ModuleImport {
            module: path.to_string(),
            source: Box::new(source),
        };

        let module = self.lookup(path).map_err(wrap)?;
        let Some(hook) = module.on_import.clone() else {
            return Ok(module);
        };

        let current = thread::current().id();
        let mut imports = self.imports.lock();
        loop {
            match imports.get(path).copied() {
                None => break,
                Some(ImportState::Done) => return Ok(module),
                Some(ImportState::Running(owner)) if owner == current => return Ok(module),
                Some(ImportState::Running(_)) => self.import_finished.wait(&mut imports),
            }
        }
        imports.insert(path.to_string(), ImportState::Running(current));
        drop(imports);

        let mut running = RunningImport {
            table: self,
            path,
            succeeded: false,
        };
        tracing::debug!(module = %path, "importing module");
        hook(registry).map_err(wrap)?;
        running.succeeded = true;

        Ok(module)
    }

    /// Resolve a locator to a factory of the requested kind.
    ///
    /// # Errors
    ///
    /// - [`MidbenchError::Configuration`] if the locator has no attribute or
    ///   the attribute is of a different kind
    /// - [`MidbenchError::ModuleImport`] if the module cannot be imported or
    ///   lacks the attribute
    pub fn resolve<T>(&self, locator: &Locator, registry: &Registry) -> Result<Factory<T>>
    where
        T: Constructible + ?Sized,
    {
        let attr = self.attr(locator, registry)?;
        T::from_attr(&attr).ok_or_else(|| {
            MidbenchError::configuration(format!(
                "`{}` is a {}, not a {}",
                locator,
                attr.kind(),
                T::KIND
            ))
        })
    }

    /// Resolve a locator to a registration hook.
    pub fn resolve_hook(&self, locator: &Locator, registry: &Registry) -> Result<Hook> {
        match self.attr(locator, registry)? {
            Attr::Hook(hook) => Ok(hook),
            other => Err(MidbenchError::configuration(format!(
                "`{}` is a {}, not a registration hook",
                locator,
                other.kind()
            ))),
        }
    }

    fn attr(&self, locator: &Locator, registry: &Registry) -> Result<Attr> {
        let (path, name) = locator.split()?;
        let module = self.import(path, registry)?;
        module.get(name).cloned().map_err(|e| MidbenchError::ModuleImport {
            module: path.to_string(),
            source: Box::new(e),
        })
    }

    /// Normalize an entry reference to a factory.
    pub fn normalize<T>(&self, entry: &EntryRef<T>, registry: &Registry) -> Result<Factory<T>>
    where
        T: Constructible + ?Sized,
    {
        match entry {
            EntryRef::Callable(factory) => Ok(factory.clone()),
            EntryRef::Locator(locator) => self.resolve(locator, registry),
        }
    }
}

impl fmt::Debug for ModuleTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleTable")
            .field("modules", &self.paths())
            .finish()
    }
}
