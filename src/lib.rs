//! MIDbench - a registry for engineering design benchmark environments.
//!
//! Environments are registered under versioned ids such as
//! `demo/widget-v0`, looked up with typo suggestions and version fallback,
//! and made together with constructors for their designs and conditions.
//! Plugins contribute environments through entry points.
//!
//! # Modules
//!
//! - [`registration`] - Ids, the spec store, namespaces, plugins and the
//!   [`Registry`](registration::Registry)
//! - [`core`] - Environment, design and condition traits
//! - [`envs`] - Built-in Airfoil2d and HeatConduction2d environments
//! - [`config`] - Configuration loading, merging, and validation
//! - [`shell`] - External solver command execution
//! - [`cli`] - Command-line interface and argument parsing
//! - [`ui`] - Terminal output
//! - [`error`] - Error types and result aliases
//!
//! # Example
//!
//! ```
//! use midbench::core::{Condition, Design, Environment, Kwargs};
//! use midbench::registration::{EntryRef, Registration, Registry};
//! use midbench::Result;
//!
//! struct Widget;
//!
//! impl Environment for Widget {
//!     fn name(&self) -> &str {
//!         "widget"
//!     }
//! }
//!
//! #[derive(Debug)]
//! struct Blank;
//! impl Design for Blank {}
//! impl Condition for Blank {}
//!
//! fn widget(_: &Kwargs) -> Result<Box<dyn Environment>> {
//!     Ok(Box::new(Widget))
//! }
//! fn design(_: &Kwargs) -> Result<Box<dyn Design>> {
//!     Ok(Box::new(Blank))
//! }
//! fn condition(_: &Kwargs) -> Result<Box<dyn Condition>> {
//!     Ok(Box::new(Blank))
//! }
//!
//! let registry = Registry::new();
//! registry
//!     .register(
//!         "demo/widget-v0",
//!         Registration::new()
//!             .entry_point(EntryRef::callable(widget))
//!             .designs(EntryRef::callable(design))
//!             .conditions(EntryRef::callable(condition))
//!             .kwarg("x", 1),
//!     )
//!     .unwrap();
//!
//! let mut kwargs = Kwargs::new();
//! kwargs.insert("x".into(), 2.into());
//! let made = registry.make("demo/widget", kwargs).unwrap();
//! assert_eq!(made.env.spec().id, "demo/widget-v0");
//! assert_eq!(made.env.spec().kwargs["x"], 2);
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod envs;
pub mod error;
pub mod registration;
pub mod shell;
pub mod ui;

pub use error::{MidbenchError, Result};
