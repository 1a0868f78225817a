//! # Policy Configuration
//!
//! The namespace, tag keys, and exemption lists the three policies consult.
//! Defaults are the conventions of the OpenShift origin API types; a YAML
//! file may override any subset of keys.
//!
//! ```yaml
//! namespace: github.com/openshift/origin/pkg
//! internal_types_with_allowed_wire_tags: [DockerConfig, DockerImage]
//! ```

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tagcheck_core::TypeName;
use thiserror::Error;

/// Environment variable naming a policy configuration file.
pub const CONFIG_ENV: &str = "TAGCHECK_CONFIG";

/// Error loading a policy configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("cannot read policy config {}: {source}", .path.display())]
    Read {
        /// Config path.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The file is not a valid policy configuration.
    #[error("invalid policy config {}: {reason}", .path.display())]
    Parse {
        /// Config path.
        path: PathBuf,
        /// Parser message.
        reason: String,
    },
}

/// Settings shared by all three policies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PolicyConfig {
    /// Only types whose package path contains this string are checked.
    pub namespace: String,
    /// Struct-tag key of the wire-serialization annotation.
    pub wire_tag: String,
    /// Struct-tag key of the description annotation.
    pub description_tag: String,
    /// Internal type names that may carry wire annotations.
    pub internal_types_with_allowed_wire_tags: BTreeSet<String>,
    /// Field names skipped by the description policy.
    pub description_exempt_fields: BTreeSet<String>,
    /// Field types skipped by the description policy.
    pub description_exempt_types: BTreeSet<TypeName>,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        let exempt_types = [
            ("k8s.io/apimachinery/pkg/apis/meta/v1", "Time"),
            ("time", "Time"),
            ("k8s.io/apimachinery/pkg/runtime", "RawExtension"),
        ]
        .into_iter()
        .filter_map(|(pkg, name)| TypeName::new(pkg, name).ok())
        .collect();

        Self {
            namespace: "github.com/openshift/origin/pkg".to_string(),
            wire_tag: "json".to_string(),
            description_tag: "description".to_string(),
            internal_types_with_allowed_wire_tags: ["DockerConfig", "DockerImage"]
                .into_iter()
                .map(String::from)
                .collect(),
            description_exempt_fields: ["TypeMeta", "ObjectMeta", "ListMeta"]
                .into_iter()
                .map(String::from)
                .collect(),
            description_exempt_types: exempt_types,
        }
    }
}

impl PolicyConfig {
    /// Parse a YAML configuration; missing keys keep their defaults.
    pub fn from_yaml_str(path: &Path, content: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Read a YAML configuration file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(path, &content)
    }

    /// Resolve the effective configuration: an explicit path wins, then
    /// [`CONFIG_ENV`], then the defaults.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        match std::env::var_os(CONFIG_ENV) {
            Some(path) if !path.is_empty() => {
                tracing::debug!(path = ?path, "policy config from {CONFIG_ENV}");
                Self::from_file(Path::new(&path))
            }
            _ => Ok(Self::default()),
        }
    }

    /// Whether a package path is within the checked namespace.
    pub fn in_namespace(&self, pkg_path: &str) -> bool {
        pkg_path.contains(&self.namespace)
    }

    /// Whether an internal type may carry wire annotations.
    pub fn allows_wire_tags(&self, type_name: &str) -> bool {
        self.internal_types_with_allowed_wire_tags.contains(type_name)
    }
}
