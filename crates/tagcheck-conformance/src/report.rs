//! # Reports
//!
//! Violations are findings, not errors. One [`ConformanceReport`] collects
//! every violation of one policy invocation; a [`SuiteReport`] collects the
//! reports of a whole run.

use std::fmt;

use serde::Serialize;
use tagcheck_core::{GroupVersion, StructTag, TypeName};

use crate::policy::Policy;

/// How a field fails its policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    /// The annotation is present but must not be.
    Unexpected,
    /// The annotation is required but absent or empty.
    Missing,
}

/// A field that fails a policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    /// Policy that was violated.
    pub policy: Policy,
    /// Enclosing type.
    pub type_name: TypeName,
    /// Offending field.
    pub field: String,
    /// Struct-tag key concerned.
    pub annotation: String,
    /// Nature of the violation.
    pub kind: ViolationKind,
    /// The field's full tag, for context.
    pub tag: StructTag,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match self.kind {
            ViolationKind::Unexpected => "should not have",
            ViolationKind::Missing => "should have",
        };
        write!(f, "{}.{} {verb} a {} tag", self.type_name, self.field, self.annotation)
    }
}

/// Result of one policy invocation over a scheme.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConformanceReport {
    /// Policy that ran.
    pub policy: Policy,
    /// Group/versions whose roots were walked, in order.
    pub versions: Vec<GroupVersion>,
    /// Number of roots handed to the checker.
    pub roots_checked: usize,
    /// Number of distinct types marked visited.
    pub types_visited: usize,
    /// Every violation, in discovery order.
    pub violations: Vec<Violation>,
}

impl ConformanceReport {
    /// Whether no violation was found.
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }
}

impl fmt::Display for ConformanceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} root(s), {} type(s) visited, {} violation(s)",
            self.policy,
            self.roots_checked,
            self.types_visited,
            self.violations.len()
        )?;
        for v in &self.violations {
            write!(f, "\n  {v}")?;
        }
        Ok(())
    }
}

/// Results of several policy invocations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SuiteReport {
    /// One report per policy, in run order.
    pub reports: Vec<ConformanceReport>,
}

impl SuiteReport {
    /// Whether every policy came back clean.
    pub fn is_clean(&self) -> bool {
        self.reports.iter().all(ConformanceReport::is_clean)
    }

    /// Total number of violations across all policies.
    pub fn violation_count(&self) -> usize {
        self.reports.iter().map(|r| r.violations.len()).sum()
    }

    /// The report of one policy, if it ran.
    pub fn report(&self, policy: Policy) -> Option<&ConformanceReport> {
        self.reports.iter().find(|r| r.policy == policy)
    }
}

impl fmt::Display for SuiteReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, report) in self.reports.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{report}")?;
        }
        Ok(())
    }
}
