//! # Identities
//!
//! Newtype identifiers for the two things a scheme is keyed by: the
//! `(group, version)` pair a set of types is registered under, and the
//! fully-qualified name of a single type.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TagcheckError;

/// Version marker for the internal, unversioned representation of a group.
///
/// Internal registrations are never part of a scheme's version priority.
pub const INTERNAL_VERSION: &str = "__internal";

/// An API group and version, e.g. `build.openshift.io/v1`.
///
/// The empty group is the legacy core group and displays as the bare version.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GroupVersion {
    /// API group name; empty for the core group.
    pub group: String,
    /// Version name, or [`INTERNAL_VERSION`].
    pub version: String,
}

impl GroupVersion {
    /// Create a group/version pair.
    pub fn new(group: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            version: version.into(),
        }
    }

    /// The internal version of `group`.
    pub fn internal(group: impl Into<String>) -> Self {
        Self::new(group, INTERNAL_VERSION)
    }

    /// Whether this is the internal representation of its group.
    pub fn is_internal(&self) -> bool {
        self.version == INTERNAL_VERSION
    }
}

impl fmt::Display for GroupVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.group.is_empty() {
            write!(f, "{}", self.version)
        } else {
            write!(f, "{}/{}", self.group, self.version)
        }
    }
}

impl FromStr for GroupVersion {
    type Err = TagcheckError;

    /// Parse `group/version`, or a bare `version` for the core group.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (group, version) = match s.split_once('/') {
            Some((group, version)) => (group, version),
            None => ("", s),
        };
        if version.is_empty() || version.contains('/') {
            return Err(TagcheckError::InvalidName(format!(
                "group/version {s:?} must be `group/version` or `version`"
            )));
        }
        Ok(Self::new(group, version))
    }
}

/// Fully-qualified name of a type: package path plus type name.
///
/// `k8s.io/apimachinery/pkg/apis/meta/v1.Time` has package path
/// `k8s.io/apimachinery/pkg/apis/meta/v1` and name `Time`. Predeclared types
/// such as `string` have an empty package path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TypeName {
    pkg_path: String,
    name: String,
}

impl TypeName {
    /// Build a type name from its parts, validating the name.
    pub fn new(
        pkg_path: impl Into<String>,
        name: impl Into<String>,
    ) -> Result<Self, TagcheckError> {
        let pkg_path = pkg_path.into();
        let name = name.into();
        if !is_identifier(&name) {
            return Err(TagcheckError::InvalidName(format!(
                "type name {name:?} is not an identifier"
            )));
        }
        if pkg_path.chars().any(char::is_whitespace) {
            return Err(TagcheckError::InvalidName(format!(
                "package path {pkg_path:?} contains whitespace"
            )));
        }
        Ok(Self { pkg_path, name })
    }

    /// The package path the type originates from.
    pub fn pkg_path(&self) -> &str {
        &self.pkg_path
    }

    /// The unqualified type name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.pkg_path.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}.{}", self.pkg_path, self.name)
        }
    }
}

impl FromStr for TypeName {
    type Err = TagcheckError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        // The separating dot is the last one after the final path segment
        // boundary; dots inside host names (`k8s.io/...`) belong to the path.
        let segment_start = s.rfind('/').map_or(0, |i| i + 1);
        match s[segment_start..].rfind('.') {
            Some(dot) => {
                let dot = segment_start + dot;
                Self::new(&s[..dot], &s[dot + 1..])
            }
            None if segment_start == 0 => Self::new("", s),
            None => Err(TagcheckError::InvalidName(format!(
                "type name {s:?} has a package path but no `.Name` suffix"
            ))),
        }
    }
}

impl TryFrom<String> for TypeName {
    type Error = TagcheckError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TypeName> for String {
    fn from(value: TypeName) -> Self {
        value.to_string()
    }
}

pub(crate) fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_')
}
