//! Environment identifier parsing and formatting.
//!
//! Identifiers have the shape `[namespace/]name[-vVERSION]`:
//!
//! - `namespace`: word characters, `:` and `-`
//! - `name`: word characters, `:`, `.` and `-`, matched lazily so that a
//!   trailing `-vN` is read as the version
//! - `VERSION`: decimal digits
//!
//! An absent version means "unversioned", which is distinct from `-v0`.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{MidbenchError, Result};

static ENV_ID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:(?P<namespace>[\w:-]+)/)?(?:(?P<name>[\w:.-]+?))(?:-v(?P<version>\d+))?$")
        .unwrap()
});

/// A parsed environment identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EnvId {
    /// Optional grouping prefix.
    pub namespace: Option<String>,
    /// Environment name.
    pub name: String,
    /// Version number, `None` for the unversioned default.
    pub version: Option<u32>,
}

impl EnvId {
    /// Build an id from its parts without validation.
    pub fn new(namespace: Option<&str>, name: &str, version: Option<u32>) -> Self {
        Self {
            namespace: namespace.map(str::to_string),
            name: name.to_string(),
            version,
        }
    }

    /// Parse an id string.
    pub fn parse(id: &str) -> Result<Self> {
        let (namespace, name, version) = parse_env_id(id)?;
        Ok(Self {
            namespace,
            name,
            version,
        })
    }

    /// The same id with a different version.
    pub fn with_version(&self, version: Option<u32>) -> Self {
        Self {
            version,
            ..self.clone()
        }
    }

    /// The same id with a different namespace.
    pub fn with_namespace(&self, namespace: Option<String>) -> Self {
        Self {
            namespace,
            ..self.clone()
        }
    }

    /// Canonical string form without the version suffix.
    pub fn unversioned(&self) -> String {
        get_env_id(self.namespace.as_deref(), &self.name, None)
    }
}

impl fmt::Display for EnvId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&get_env_id(
            self.namespace.as_deref(),
            &self.name,
            self.version,
        ))
    }
}

impl FromStr for EnvId {
    type Err = MidbenchError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Serialize for EnvId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for EnvId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Parse an environment id into `(namespace, name, version)`.
///
/// # Errors
///
/// Returns [`MidbenchError::MalformedId`] unless the whole string matches the
/// identifier grammar and the version fits in a `u32`.
pub fn parse_env_id(id: &str) -> Result<(Option<String>, String, Option<u32>)> {
    let malformed = || MidbenchError::MalformedId { id: id.to_string() };

    let caps = ENV_ID_RE.captures(id).ok_or_else(malformed)?;

    let namespace = caps.name("namespace").map(|m| m.as_str().to_string());
    let name = caps
        .name("name")
        .map(|m| m.as_str().to_string())
        .ok_or_else(malformed)?;
    let version = match caps.name("version") {
        Some(v) => Some(v.as_str().parse::<u32>().map_err(|_| malformed())?),
        None => None,
    };

    Ok((namespace, name, version))
}

/// Format an environment id. Inverse of [`parse_env_id`].
pub fn get_env_id(namespace: Option<&str>, name: &str, version: Option<u32>) -> String {
    let mut full_name = name.to_string();
    if let Some(version) = version {
        full_name.push_str(&format!("-v{}", version));
    }
    match namespace {
        Some(ns) => format!("{}/{}", ns, full_name),
        None => full_name,
    }
}
