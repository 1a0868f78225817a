//! # Policies
//!
//! The three struct-tag conventions and the per-field rule each enforces.
//!
//! | Policy | Roots | Rule |
//! |---|---|---|
//! | `description` | internal | no non-empty description tag, except exempt fields/types |
//! | `internal-wire-tag` | internal | no non-empty wire tag, except allow-listed types |
//! | `external-wire-tag` | external | a non-empty wire tag on every field |
//!
//! The traversal differs between them in two ways. The wire-tag policies
//! only enter structured records and follow pointers to records; the
//! description policy enters any root but follows only direct record
//! fields, never pointers.

use std::fmt;

use serde::{Deserialize, Serialize};
use tagcheck_core::Field;

use crate::config::PolicyConfig;
use crate::report::ViolationKind;

/// Which set of registered roots a policy walks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Internal types, one internal version per group.
    Internal,
    /// External types, every prioritized version.
    External,
}

/// A struct-tag convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Policy {
    /// Internal types carry no description annotations.
    Description,
    /// Internal types carry no wire annotations.
    InternalWireTag,
    /// External types carry a wire annotation on every field.
    ExternalWireTag,
}

/// Outcome of applying a policy's rule to one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FieldCheck {
    /// Not checked and not descended into.
    Exempt,
    /// Conforms.
    Pass,
    /// Does not conform.
    Violation(ViolationKind),
}

impl Policy {
    /// Every policy, in the order a full suite runs them.
    pub const ALL: [Policy; 3] = [Self::Description, Self::InternalWireTag, Self::ExternalWireTag];

    /// Stable name used in reports and on the command line.
    pub fn name(self) -> &'static str {
        match self {
            Self::Description => "description",
            Self::InternalWireTag => "internal-wire-tag",
            Self::ExternalWireTag => "external-wire-tag",
        }
    }

    /// Roots this policy walks.
    pub fn scope(self) -> Scope {
        match self {
            Self::Description | Self::InternalWireTag => Scope::Internal,
            Self::ExternalWireTag => Scope::External,
        }
    }

    /// The struct-tag key this policy inspects.
    pub fn annotation<'c>(self, config: &'c PolicyConfig) -> &'c str {
        match self {
            Self::Description => &config.description_tag,
            Self::InternalWireTag | Self::ExternalWireTag => &config.wire_tag,
        }
    }

    /// Whether a candidate that is not a record is dropped before it is
    /// marked visited.
    pub(crate) fn records_only(self) -> bool {
        !matches!(self, Self::Description)
    }

    /// Whether pointer-to-record fields are descended into.
    pub(crate) fn follows_pointers(self) -> bool {
        !matches!(self, Self::Description)
    }

    /// Whether an enclosing type's name exempts it entirely.
    pub(crate) fn exempts_type(self, config: &PolicyConfig, type_name: &str) -> bool {
        matches!(self, Self::InternalWireTag) && config.allows_wire_tags(type_name)
    }

    /// Apply the rule to one field.
    pub(crate) fn check_field(self, config: &PolicyConfig, field: &Field) -> FieldCheck {
        let value = field.tag.get(self.annotation(config));
        match self {
            Self::Description => {
                let exempt_type = field
                    .ty
                    .as_named()
                    .is_some_and(|name| config.description_exempt_types.contains(name));
                if config.description_exempt_fields.contains(&field.name) || exempt_type {
                    FieldCheck::Exempt
                } else if value.is_empty() {
                    FieldCheck::Pass
                } else {
                    FieldCheck::Violation(ViolationKind::Unexpected)
                }
            }
            Self::InternalWireTag if !value.is_empty() => {
                FieldCheck::Violation(ViolationKind::Unexpected)
            }
            Self::ExternalWireTag if value.is_empty() => {
                FieldCheck::Violation(ViolationKind::Missing)
            }
            Self::InternalWireTag | Self::ExternalWireTag => FieldCheck::Pass,
        }
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
