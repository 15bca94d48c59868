//! Configuration validation rules.
//!
//! - Plugin values must be `module:attr` references
//! - Plugin names must not be empty
//! - Environment keys must be valid environment ids

use crate::config::schema::MidbenchConfig;
use crate::error::{MidbenchError, Result};
use crate::registration::{EnvId, Locator};

/// Validation error with context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Rule identifier
    pub rule: String,
    /// Human-readable error message
    pub message: String,
}

/// Validate a configuration and return all errors.
pub fn validate_config(config: &MidbenchConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if config.settings.plugin_group.trim().is_empty() {
        errors.push(ValidationError {
            rule: "empty-plugin-group".to_string(),
            message: "settings.plugin_group must not be empty".to_string(),
        });
    }

    for (index, plugin) in config.plugins.iter().enumerate() {
        if plugin.name.trim().is_empty() {
            errors.push(ValidationError {
                rule: "empty-plugin-name".to_string(),
                message: format!("Plugin #{} has an empty name", index + 1),
            });
        }
        if Locator::new(plugin.value.as_str()).split().is_err() {
            errors.push(ValidationError {
                rule: "invalid-plugin-value".to_string(),
                message: format!(
                    "Plugin '{}' value '{}' must be of the form module:attribute",
                    plugin.name, plugin.value
                ),
            });
        }
    }

    for id in config.environments.keys() {
        if EnvId::parse(id).is_err() {
            errors.push(ValidationError {
                rule: "invalid-environment-id".to_string(),
                message: format!("Environment key '{}' is not a valid environment id", id),
            });
        }
    }

    errors
}

/// Validate configuration, failing on the first batch of errors.
///
/// # Errors
///
/// Returns [`MidbenchError::Configuration`] listing every problem found.
pub fn validate(config: &MidbenchConfig) -> Result<()> {
    let errors = validate_config(config);
    if errors.is_empty() {
        return Ok(());
    }

    let messages: Vec<String> = errors.into_iter().map(|e| e.message).collect();
    Err(MidbenchError::configuration(messages.join("; ")))
}
