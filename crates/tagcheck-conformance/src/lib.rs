//! # tagcheck-conformance: Struct-Tag Conformance Checks
//!
//! Walks every root type registered in a [`tagcheck_scheme::Scheme`] and
//! reports fields whose struct tags break one of three conventions:
//!
//! - **description**: internal types carry no `description` annotations
//!   (object metadata fields and timestamp/raw-extension fields exempt);
//! - **internal-wire-tag**: internal types carry no `json` annotations
//!   (`DockerConfig` and `DockerImage` exempt);
//! - **external-wire-tag**: every field of every external type carries a
//!   non-empty `json` annotation.
//!
//! Only types whose package path lies within the configured namespace are
//! examined. Tag keys, namespace and exemption lists come from
//! [`PolicyConfig`].
//!
//! Violations are data, returned in a [`ConformanceReport`]; the checks
//! themselves cannot fail.

pub mod checker;
pub mod config;
pub mod policy;
pub mod report;
pub mod suite;

#[cfg(test)]
mod testing;

pub use checker::{AnnotationChecker, VisitedSet};
pub use config::{ConfigError, PolicyConfig, CONFIG_ENV};
pub use policy::{Policy, Scope};
pub use report::{ConformanceReport, SuiteReport, Violation, ViolationKind};
pub use suite::{
    check_descriptions, check_external_wire_tags, check_internal_wire_tags, run_policy, run_suite,
    versions_for,
};
