//! Environment registration and resolution.
//!
//! - [`id`] parses and formats `[namespace/]name[-vVERSION]` identifiers
//! - [`store`] holds the registration records
//! - [`namespace`] scopes registrations to a namespace
//! - [`modules`] resolves deferred `module:attr` references
//! - [`registry`] registers, looks up and makes environments
//! - [`plugins`] discovers plugins through entry points

pub mod id;
pub mod modules;
pub mod namespace;
pub mod plugins;
pub mod registry;
pub mod spec;
pub mod store;
pub mod suggest;

pub use id::{get_env_id, parse_env_id, EnvId};
pub use modules::{Attr, Hook, Module, ModuleDef, ModuleReg, ModuleTable, StaticAttr};
pub use namespace::{current_namespace, namespace, no_namespace, with_namespace, NamespaceGuard};
pub use plugins::{
    EntryPoint, EntryPointReg, EntryPointSource, LinkedEntryPoints, PluginFailure, PluginReport,
    PluginScope, DEFAULT_GROUP,
};
pub use registry::Registry;
pub use spec::{EntryRef, EnvSpec, Locator, Registration};
pub use store::SpecStore;
