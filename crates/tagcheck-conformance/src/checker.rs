//! # Annotation Checker
//!
//! Recursive walk from a root type through its record fields, applying one
//! [`Policy`] to every field of every in-namespace record reached.
//!
//! For each candidate type:
//!
//! 1. wire-tag policies drop candidates that are not records;
//! 2. a candidate already in the [`VisitedSet`] is dropped, otherwise it is
//!    marked visited;
//! 3. candidates outside the configured namespace are dropped (their
//!    fields are never examined, even when embedded in an in-namespace type);
//! 4. types exempted by name are dropped;
//! 5. every field is checked in declaration order, then descended into if
//!    it is a record, or (wire-tag policies only) a pointer to a record.
//!
//! The visited set belongs to the caller and is shared across every root of
//! one invocation, so a type reachable from many roots is examined once.

use std::collections::HashSet;

use tagcheck_core::{TypeDef, TypeName};
use tagcheck_scheme::Scheme;

use crate::config::PolicyConfig;
use crate::policy::{FieldCheck, Policy};
use crate::report::Violation;

/// Types already processed in one check invocation, keyed by
/// fully-qualified name.
#[derive(Debug, Default, Clone)]
pub struct VisitedSet(HashSet<TypeName>);

impl VisitedSet {
    /// An empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `name` visited; returns `false` if it already was.
    pub fn insert(&mut self, name: &TypeName) -> bool {
        if self.0.contains(name) {
            return false;
        }
        self.0.insert(name.clone())
    }

    /// Whether `name` has been visited.
    pub fn contains(&self, name: &TypeName) -> bool {
        self.0.contains(name)
    }

    /// Number of visited types.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether nothing has been visited.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Applies one policy to the type graph of a scheme.
#[derive(Debug, Clone, Copy)]
pub struct AnnotationChecker<'a> {
    scheme: &'a Scheme,
    config: &'a PolicyConfig,
    policy: Policy,
}

impl<'a> AnnotationChecker<'a> {
    /// Create a checker for `policy`.
    pub fn new(scheme: &'a Scheme, config: &'a PolicyConfig, policy: Policy) -> Self {
        Self {
            scheme,
            config,
            policy,
        }
    }

    /// Check `root` and everything reachable from it, appending violations.
    pub fn check(
        &self,
        root: &TypeDef,
        visited: &mut VisitedSet,
        violations: &mut Vec<Violation>,
    ) {
        self.visit(root, visited, violations);
    }

    fn visit(&self, ty: &TypeDef, visited: &mut VisitedSet, violations: &mut Vec<Violation>) {
        // Defined types over a record carry that record's fields under
        // their own name and package.
        let fields = self.scheme.struct_fields(ty);
        if self.policy.records_only() && fields.is_none() {
            return;
        }
        if !visited.insert(&ty.name) {
            return;
        }
        if !self.config.in_namespace(ty.pkg_path()) {
            tracing::trace!(policy = %self.policy, type_name = %ty.name, "outside namespace");
            return;
        }
        if self.policy.exempts_type(self.config, ty.name.name()) {
            tracing::debug!(policy = %self.policy, type_name = %ty.name, "type is allow-listed");
            return;
        }

        let fields = fields.unwrap_or_default();
        tracing::trace!(
            policy = %self.policy,
            type_name = %ty.name,
            fields = fields.len(),
            "checking"
        );

        for field in fields {
            match self.policy.check_field(self.config, field) {
                FieldCheck::Exempt => continue,
                FieldCheck::Pass => {}
                FieldCheck::Violation(kind) => {
                    let violation = Violation {
                        policy: self.policy,
                        type_name: ty.name.clone(),
                        field: field.name.clone(),
                        annotation: self.policy.annotation(self.config).to_string(),
                        kind,
                        tag: field.tag.clone(),
                    };
                    tracing::debug!(tag = %field.tag, "{violation}");
                    violations.push(violation);
                }
            }

            if let Some(name) = field.ty.as_named() {
                match self.scheme.lookup(name) {
                    Some(def) if self.scheme.struct_fields(def).is_some() => {
                        self.visit(def, visited, violations)
                    }
                    Some(_) => {}
                    None => self.unresolved(name, ty),
                }
            } else if let Some(name) = field
                .ty
                .pointee()
                .filter(|_| self.policy.follows_pointers())
            {
                match self.scheme.lookup(name) {
                    Some(def) => self.visit(def, visited, violations),
                    None => self.unresolved(name, ty),
                }
            }
        }
    }

    fn unresolved(&self, name: &TypeName, owner: &TypeDef) {
        tracing::warn!(type_name = %name, owner = %owner.name, "unresolved field type");
    }
}
