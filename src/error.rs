//! Error types for MIDbench operations.
//!
//! This module defines [`MidbenchError`], the primary error type used throughout
//! the crate, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Identifier and lookup failures carry enough context to produce a
//!   "did you mean" hint for the user
//! - Use `anyhow::Error` (via `MidbenchError::Other`) for unexpected errors
//!   coming out of environment implementations
//! - The plugin loader is the only place that downgrades errors to warnings

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for MIDbench operations.
#[derive(Debug, Error)]
pub enum MidbenchError {
    /// Environment id does not match `[namespace/](env-name)-v(version)`.
    #[error(
        "Malformed environment ID: {id}. (Currently all IDs must be of the form \
         [namespace/](env-name)-v(version). (namespace is optional))"
    )]
    MalformedId { id: String },

    /// No registered environment lives in the requested namespace.
    #[error(
        "Namespace {namespace} not found. {}",
        namespace_hint(.namespace, .suggestion.as_deref())
    )]
    NamespaceNotFound {
        namespace: String,
        suggestion: Option<String>,
    },

    /// The namespace exists but has no environment with this name.
    #[error(
        "Environment {name} doesn't exist{}. {}",
        in_namespace(.namespace.as_deref()),
        did_you_mean(.suggestion.as_deref())
    )]
    NameNotFound {
        name: String,
        namespace: Option<String>,
        suggestion: Option<String>,
    },

    /// Requested version is newer than every registered version.
    #[error("{message}")]
    VersionNotFound { message: String },

    /// Requested version is older than the latest, or only a default exists.
    #[error("{message}")]
    DeprecatedEnv { message: String },

    /// Lookup failed without a more specific explanation.
    #[error("No registered env with id: {id}")]
    EnvNotFound { id: String },

    /// Registration would break the versioned/unversioned invariant.
    #[error("{message}")]
    Registration { message: String },

    /// A registration or entry point is missing a required reference.
    #[error("Invalid configuration: {message}")]
    Configuration { message: String },

    /// Importing a module failed.
    #[error("Failed to import module '{module}': {source}")]
    ModuleImport {
        module: String,
        #[source]
        source: Box<MidbenchError>,
    },

    /// No module with this path is linked or installed.
    #[error("No module named '{module}'")]
    ModuleNotFound { module: String },

    /// The module exists but does not define the attribute.
    #[error("Module '{module}' has no attribute '{attr}'")]
    AttributeNotFound { module: String, attr: String },

    /// The environment does not implement the requested operation.
    #[error("Environment '{env}' does not support {operation}")]
    Unsupported { env: String, operation: String },

    /// An external solver command failed.
    #[error("Command failed with exit code {code:?}: {command}")]
    CommandFailed { command: String, code: Option<i32> },

    /// A solver ran but its output files are missing or unreadable.
    #[error("Failed to read solver output at {path}: {message}")]
    SolverOutput { path: PathBuf, message: String },

    /// Configuration file not found at expected location.
    #[error("Configuration not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Failed to parse configuration file.
    #[error("Failed to parse config at {path}: {message}")]
    ConfigParseError { path: PathBuf, message: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl MidbenchError {
    /// Shorthand for a [`MidbenchError::Configuration`] error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Whether this error means "the id did not resolve to a registration".
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::NamespaceNotFound { .. }
                | Self::NameNotFound { .. }
                | Self::VersionNotFound { .. }
                | Self::DeprecatedEnv { .. }
                | Self::EnvNotFound { .. }
        )
    }
}

fn namespace_hint(namespace: &str, suggestion: Option<&str>) -> String {
    match suggestion {
        Some(s) => format!("Did you mean: `{}`?", s),
        None => format!("Have you installed the proper package for {}?", namespace),
    }
}

fn in_namespace(namespace: Option<&str>) -> String {
    namespace
        .map(|ns| format!(" in namespace {}", ns))
        .unwrap_or_default()
}

fn did_you_mean(suggestion: Option<&str>) -> String {
    suggestion
        .map(|s| format!("Did you mean: `{}`?", s))
        .unwrap_or_default()
}

/// Result type alias for MIDbench operations.
pub type Result<T> = std::result::Result<T, MidbenchError>;
