//! # Conformance Suite
//!
//! Entry points that run a policy over every root registered in a scheme.
//! Each invocation owns one [`VisitedSet`] shared across all of its roots
//! and versions, so results do not depend on earlier invocations.

use tagcheck_core::GroupVersion;
use tagcheck_scheme::Scheme;

use crate::checker::{AnnotationChecker, VisitedSet};
use crate::config::PolicyConfig;
use crate::policy::{Policy, Scope};
use crate::report::{ConformanceReport, SuiteReport};

/// Group/versions whose roots a policy of `scope` walks.
///
/// Internal scope covers the internal version of every group, including
/// groups that have no external version at all (see design decision 2 on
/// which groups have an internal version). The description policy is
/// internal-scoped and walks these versions under one visited set.
pub fn versions_for(scheme: &Scheme, scope: Scope) -> Vec<GroupVersion> {
    match scope {
        Scope::Internal => scheme.internal_versions_all_groups(),
        Scope::External => scheme.prioritized_versions_all_groups(),
    }
}

/// Run one policy over the scheme.
pub fn run_policy(scheme: &Scheme, config: &PolicyConfig, policy: Policy) -> ConformanceReport {
    let checker = AnnotationChecker::new(scheme, config, policy);
    let versions = versions_for(scheme, policy.scope());
    let mut visited = VisitedSet::new();
    let mut violations = Vec::new();
    let mut roots_checked = 0;

    for gv in &versions {
        let roots = scheme.known_types(gv);
        tracing::debug!(%policy, %gv, roots = roots.len(), "walking version");
        for root in roots {
            roots_checked += 1;
            checker.check(root, &mut visited, &mut violations);
        }
    }

    tracing::info!(
        %policy,
        versions = versions.len(),
        roots = roots_checked,
        visited = visited.len(),
        violations = violations.len(),
        "policy complete"
    );

    ConformanceReport {
        policy,
        versions,
        roots_checked,
        types_visited: visited.len(),
        violations,
    }
}

/// Internal types must not carry description annotations.
pub fn check_descriptions(scheme: &Scheme, config: &PolicyConfig) -> ConformanceReport {
    run_policy(scheme, config, Policy::Description)
}

/// Internal types must not carry wire annotations, except allow-listed ones.
pub fn check_internal_wire_tags(scheme: &Scheme, config: &PolicyConfig) -> ConformanceReport {
    run_policy(scheme, config, Policy::InternalWireTag)
}

/// Every field of every external type must carry a wire annotation.
pub fn check_external_wire_tags(scheme: &Scheme, config: &PolicyConfig) -> ConformanceReport {
    run_policy(scheme, config, Policy::ExternalWireTag)
}

/// Run several policies in order. An empty list runs nothing.
pub fn run_suite(scheme: &Scheme, config: &PolicyConfig, policies: &[Policy]) -> SuiteReport {
    SuiteReport {
        reports: policies
            .iter()
            .map(|&policy| run_policy(scheme, config, policy))
            .collect(),
    }
}
