//! # Scheme
//!
//! The registry mapping `(group, version)` pairs to the root types known
//! under them, backed by a single type table holding every definition
//! reachable from those roots.
//!
//! ## Version Priority
//!
//! [`Scheme::prioritized_versions_all_groups`] lists, first, the versions
//! set explicitly through [`Scheme::set_version_priority`] (groups in call
//! order, versions in the given order), then every other external version
//! in the order it was first registered. Internal registrations are never
//! observed as versions: they are reached through
//! [`Scheme::internal_versions_all_groups`].

use std::collections::{BTreeMap, HashMap};

use tagcheck_core::{Field, GroupVersion, TypeBody, TypeDef, TypeName, TypeRef};

use crate::error::SchemeError;

/// Type registry.
#[derive(Debug, Default, Clone)]
pub struct Scheme {
    /// Every type definition, keyed by fully-qualified name.
    types: BTreeMap<TypeName, TypeDef>,
    /// Kind name to type, per group/version.
    known: HashMap<GroupVersion, BTreeMap<String, TypeName>>,
    /// External group/versions in first-registration order.
    observed: Vec<GroupVersion>,
    /// Groups with internal registrations in first-registration order.
    internal_groups: Vec<String>,
    /// Explicit per-group version priority, in call order.
    priority: Vec<(String, Vec<String>)>,
}

impl Scheme {
    /// Create an empty scheme.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a type definition to the table.
    ///
    /// Adding a definition identical to an existing one is a no-op, so
    /// shared types (object metadata, timestamps) may be declared by every
    /// descriptor that uses them.
    ///
    /// # Errors
    ///
    /// Returns [`SchemeError::ConflictingDefinition`] if a different
    /// definition already exists under the same name.
    pub fn add_type(&mut self, def: TypeDef) -> Result<(), SchemeError> {
        match self.types.get(&def.name) {
            Some(existing) if *existing == def => Ok(()),
            Some(_) => Err(SchemeError::ConflictingDefinition { name: def.name }),
            None => {
                tracing::trace!(type_name = %def.name, "defined type");
                self.types.insert(def.name.clone(), def);
                Ok(())
            }
        }
    }

    /// Add several type definitions, stopping at the first conflict.
    pub fn add_types(
        &mut self,
        defs: impl IntoIterator<Item = TypeDef>,
    ) -> Result<(), SchemeError> {
        defs.into_iter().try_for_each(|def| self.add_type(def))
    }

    /// Register already-defined record types as roots under `gv`.
    ///
    /// Each type is registered under its unqualified name as the kind.
    /// Re-registering the same type is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the version is empty, a type is undefined or not
    /// a struct, or the kind name is taken by a different type.
    pub fn add_known_types(
        &mut self,
        gv: &GroupVersion,
        names: impl IntoIterator<Item = TypeName>,
    ) -> Result<(), SchemeError> {
        if gv.version.is_empty() {
            return Err(SchemeError::EmptyVersion {
                group: gv.group.clone(),
            });
        }

        for name in names {
            match self.types.get(&name) {
                None => {
                    return Err(SchemeError::UndefinedRoot {
                        gv: gv.clone(),
                        name,
                    })
                }
                Some(def) if self.struct_fields(def).is_none() => {
                    return Err(SchemeError::RootNotStruct {
                        gv: gv.clone(),
                        name,
                    })
                }
                Some(_) => {}
            }

            let kinds = self.known.entry(gv.clone()).or_default();
            let kind = name.name().to_string();
            match kinds.get(&kind) {
                Some(existing) if *existing == name => continue,
                Some(existing) => {
                    return Err(SchemeError::KindConflict {
                        gv: gv.clone(),
                        kind,
                        existing: existing.clone(),
                        attempted: name,
                    })
                }
                None => {
                    tracing::debug!(%gv, type_name = %name, "registered known type");
                    kinds.insert(kind, name);
                }
            }
        }

        self.observe(gv);
        Ok(())
    }

    fn observe(&mut self, gv: &GroupVersion) {
        if gv.is_internal() {
            if !self.internal_groups.contains(&gv.group) {
                self.internal_groups.push(gv.group.clone());
            }
        } else if !self.observed.contains(gv) {
            self.observed.push(gv.clone());
        }
    }

    /// Set the preferred version order for `group`, replacing any earlier
    /// priority for that group. The internal version is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`SchemeError::EmptyVersion`] if any version is empty.
    pub fn set_version_priority(
        &mut self,
        group: &str,
        versions: impl IntoIterator<Item = impl Into<String>>,
    ) -> Result<(), SchemeError> {
        let mut ordered = Vec::new();
        for version in versions {
            let version = version.into();
            if version.is_empty() {
                return Err(SchemeError::EmptyVersion {
                    group: group.to_string(),
                });
            }
            if version == tagcheck_core::INTERNAL_VERSION {
                tracing::warn!(group, "internal version cannot be prioritized; ignoring");
                continue;
            }
            if !ordered.contains(&version) {
                ordered.push(version);
            }
        }

        match self.priority.iter_mut().find(|(g, _)| g == group) {
            Some((_, existing)) => *existing = ordered,
            None => self.priority.push((group.to_string(), ordered)),
        }
        Ok(())
    }

    /// All external versions across all groups, in priority order.
    pub fn prioritized_versions_all_groups(&self) -> Vec<GroupVersion> {
        let mut out: Vec<GroupVersion> = self
            .priority
            .iter()
            .flat_map(|(group, versions)| {
                versions
                    .iter()
                    .map(move |v| GroupVersion::new(group.as_str(), v.as_str()))
            })
            .collect();
        for gv in &self.observed {
            if !out.contains(gv) {
                out.push(gv.clone());
            }
        }
        out
    }

    /// External versions of one group, in priority order.
    pub fn prioritized_versions_for_group(&self, group: &str) -> Vec<GroupVersion> {
        self.prioritized_versions_all_groups()
            .into_iter()
            .filter(|gv| gv.group == group)
            .collect()
    }

    /// Distinct groups: those with external versions in priority order,
    /// then groups that only have internal registrations.
    pub fn groups(&self) -> Vec<String> {
        let mut groups: Vec<String> = Vec::new();
        for gv in self.prioritized_versions_all_groups() {
            if !groups.contains(&gv.group) {
                groups.push(gv.group);
            }
        }
        for group in &self.internal_groups {
            if !groups.contains(group) {
                groups.push(group.clone());
            }
        }
        groups
    }

    /// The internal version of `group`, if the group is known at all.
    pub fn internal_version(&self, group: &str) -> Option<GroupVersion> {
        self.groups()
            .iter()
            .any(|g| g == group)
            .then(|| GroupVersion::internal(group))
    }

    /// The internal version of every group, in [`Scheme::groups`] order.
    pub fn internal_versions_all_groups(&self) -> Vec<GroupVersion> {
        self.groups().into_iter().map(GroupVersion::internal).collect()
    }

    /// Root types registered under `gv`, ordered by kind name.
    ///
    /// Unknown group/versions yield an empty list.
    pub fn known_types(&self, gv: &GroupVersion) -> Vec<&TypeDef> {
        self.known
            .get(gv)
            .map(|kinds| kinds.values().filter_map(|name| self.types.get(name)).collect())
            .unwrap_or_default()
    }

    /// `(kind, type name)` pairs registered under `gv`, ordered by kind.
    pub fn known_kinds(&self, gv: &GroupVersion) -> Vec<(&str, &TypeName)> {
        self.known
            .get(gv)
            .map(|kinds| kinds.iter().map(|(k, n)| (k.as_str(), n)).collect())
            .unwrap_or_default()
    }

    /// Look up a type definition.
    pub fn lookup(&self, name: &TypeName) -> Option<&TypeDef> {
        self.types.get(name)
    }

    /// Look up the definition a type reference names directly.
    pub fn resolve(&self, ty: &TypeRef) -> Option<&TypeDef> {
        ty.as_named().and_then(|name| self.types.get(name))
    }

    /// Fields of `def` if it is a record, either directly or as a defined
    /// type whose underlying named type chain ends at a record.
    ///
    /// The fields belong to the record at the end of the chain; `def` keeps
    /// its own name and package.
    pub fn struct_fields<'s>(&'s self, def: &'s TypeDef) -> Option<&'s [Field]> {
        let mut current = def;
        for _ in 0..=self.types.len() {
            match &current.body {
                TypeBody::Struct(fields) => return Some(fields),
                TypeBody::Underlying(TypeRef::Named(name)) => current = self.types.get(name)?,
                TypeBody::Underlying(_) => return None,
            }
        }
        // Cyclic underlying chain.
        None
    }

    /// Number of type definitions in the table.
    pub fn type_count(&self) -> usize {
        self.types.len()
    }

    /// Every type definition, ordered by name.
    pub fn types(&self) -> impl Iterator<Item = &TypeDef> {
        self.types.values()
    }

    /// Check that every named type referenced by any definition resolves.
    ///
    /// # Errors
    ///
    /// Returns [`SchemeError::DanglingReferences`] listing every
    /// `(referencing type, missing type)` pair.
    pub fn verify(&self) -> Result<(), SchemeError> {
        let mut dangling = Vec::new();
        for def in self.types.values() {
            for referenced in def.references() {
                if !self.types.contains_key(referenced) {
                    let pair = (def.name.clone(), referenced.clone());
                    if !dangling.contains(&pair) {
                        dangling.push(pair);
                    }
                }
            }
        }
        if dangling.is_empty() {
            Ok(())
        } else {
            Err(SchemeError::DanglingReferences(dangling))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tagcheck_core::Field;

    const BUILD: &str = "github.com/openshift/origin/pkg/build/apis/build";
    const BUILD_V1: &str = "github.com/openshift/origin/pkg/build/apis/build/v1";
    const IMAGE_V1: &str = "github.com/openshift/origin/pkg/image/apis/image/v1";

    fn tn(pkg: &str, name: &str) -> TypeName {
        TypeName::new(pkg, name).unwrap()
    }

    fn record(pkg: &str, name: &str, fields: Vec<Field>) -> TypeDef {
        TypeDef::record(tn(pkg, name), fields)
    }

    fn build_scheme() -> Scheme {
        let mut scheme = Scheme::new();
        scheme
            .add_types([
                record(BUILD, "Build", vec![]),
                record(BUILD, "BuildConfig", vec![]),
                record(BUILD_V1, "Build", vec![]),
            ])
            .unwrap();
        scheme
    }

    #[test]
    fn identical_redefinition_is_noop() {
        let mut scheme = build_scheme();
        assert!(scheme.add_type(record(BUILD, "Build", vec![])).is_ok());
        assert_eq!(scheme.type_count(), 3);
    }

    #[test]
    fn conflicting_redefinition_is_rejected() {
        let mut scheme = build_scheme();
        let other = record(
            BUILD,
            "Build",
            vec![Field::new("Name", TypeRef::Builtin("string".into()), "")],
        );
        assert_eq!(
            scheme.add_type(other),
            Err(SchemeError::ConflictingDefinition {
                name: tn(BUILD, "Build")
            })
        );
    }

    #[test]
    fn roots_must_be_defined_structs() {
        let mut scheme = build_scheme();
        scheme
            .add_type(TypeDef::underlying(
                tn(BUILD, "BuildPhase"),
                TypeRef::Builtin("string".into()),
            ))
            .unwrap();
        let gv = GroupVersion::internal("build.openshift.io");

        assert!(matches!(
            scheme.add_known_types(&gv, [tn(BUILD, "Missing")]),
            Err(SchemeError::UndefinedRoot { .. })
        ));
        assert!(matches!(
            scheme.add_known_types(&gv, [tn(BUILD, "BuildPhase")]),
            Err(SchemeError::RootNotStruct { .. })
        ));
    }

    #[test]
    fn defined_type_over_record_is_a_root() {
        let upstream = "example.com/upstream/docker";
        let mut scheme = Scheme::new();
        scheme
            .add_types([
                record(
                    upstream,
                    "Config",
                    vec![Field::new("Hostname", TypeRef::Builtin("string".into()), "")],
                ),
                TypeDef::underlying(
                    tn(BUILD, "DockerConfig"),
                    TypeRef::named(tn(upstream, "Config")),
                ),
                TypeDef::underlying(tn(BUILD, "Alias"), TypeRef::named(tn(BUILD, "DockerConfig"))),
            ])
            .unwrap();
        let gv = GroupVersion::internal("build.openshift.io");
        scheme
            .add_known_types(&gv, [tn(BUILD, "DockerConfig"), tn(BUILD, "Alias")])
            .unwrap();

        let roots = scheme.known_types(&gv);
        assert_eq!(roots.len(), 2);
        for root in roots {
            let fields = scheme.struct_fields(root).unwrap();
            assert_eq!(fields.len(), 1);
            assert_eq!(fields[0].name, "Hostname");
            assert_eq!(root.pkg_path(), BUILD);
        }
    }

    #[test]
    fn struct_fields_stops_at_non_records_and_cycles() {
        let mut scheme = Scheme::new();
        scheme
            .add_types([
                TypeDef::underlying(tn(BUILD, "Phase"), TypeRef::Builtin("string".into())),
                TypeDef::underlying(tn(BUILD, "Ptr"), TypeRef::pointer_to(tn(BUILD, "Build"))),
                TypeDef::underlying(tn(BUILD, "A"), TypeRef::named(tn(BUILD, "B"))),
                TypeDef::underlying(tn(BUILD, "B"), TypeRef::named(tn(BUILD, "A"))),
                TypeDef::underlying(tn(BUILD, "Dangling"), TypeRef::named(tn(BUILD, "Gone"))),
                record(BUILD, "Build", vec![]),
            ])
            .unwrap();
        for name in ["Phase", "Ptr", "A", "Dangling"] {
            let def = scheme.lookup(&tn(BUILD, name)).unwrap();
            assert!(scheme.struct_fields(def).is_none(), "{name}");
        }
        let build = scheme.lookup(&tn(BUILD, "Build")).unwrap();
        assert_eq!(scheme.struct_fields(build).map(<[Field]>::len), Some(0));
    }

    #[test]
    fn kind_names_are_unique_per_group_version() {
        let mut scheme = build_scheme();
        let gv = GroupVersion::new("build.openshift.io", "v1");
        scheme.add_known_types(&gv, [tn(BUILD_V1, "Build")]).unwrap();
        scheme.add_known_types(&gv, [tn(BUILD_V1, "Build")]).unwrap();
        let err = scheme.add_known_types(&gv, [tn(BUILD, "Build")]).unwrap_err();
        assert!(matches!(err, SchemeError::KindConflict { ref kind, .. } if kind == "Build"));
    }

    #[test]
    fn empty_version_is_rejected() {
        let mut scheme = build_scheme();
        let gv = GroupVersion::new("build.openshift.io", "");
        assert!(matches!(
            scheme.add_known_types(&gv, [tn(BUILD_V1, "Build")]),
            Err(SchemeError::EmptyVersion { .. })
        ));
        assert!(scheme.set_version_priority("build.openshift.io", [""]).is_err());
    }

    #[test]
    fn internal_version_is_never_prioritized() {
        let mut scheme = build_scheme();
        scheme
            .add_known_types(&GroupVersion::internal("build.openshift.io"), [tn(BUILD, "Build")])
            .unwrap();
        assert!(scheme.prioritized_versions_all_groups().is_empty());
        assert_eq!(scheme.groups(), vec!["build.openshift.io".to_string()]);
        assert_eq!(
            scheme.internal_versions_all_groups(),
            vec![GroupVersion::internal("build.openshift.io")]
        );
        assert_eq!(
            scheme.internal_version("build.openshift.io"),
            Some(GroupVersion::internal("build.openshift.io"))
        );
        assert_eq!(scheme.internal_version("apps.openshift.io"), None);

        scheme
            .set_version_priority("build.openshift.io", [tagcheck_core::INTERNAL_VERSION])
            .unwrap();
        assert!(scheme.prioritized_versions_all_groups().is_empty());
    }

    #[test]
    fn explicit_priority_precedes_observed_order() {
        let mut scheme = build_scheme();
        let v1 = GroupVersion::new("build.openshift.io", "v1");
        let image = GroupVersion::new("image.openshift.io", "v1");
        scheme
            .add_type(record(IMAGE_V1, "Image", vec![]))
            .unwrap();
        scheme.add_known_types(&v1, [tn(BUILD_V1, "Build")]).unwrap();
        scheme
            .add_known_types(&image, [tn(IMAGE_V1, "Image")])
            .unwrap();

        assert_eq!(
            scheme.prioritized_versions_all_groups(),
            vec![v1.clone(), image.clone()]
        );

        scheme.set_version_priority("image.openshift.io", ["v1"]).unwrap();
        assert_eq!(
            scheme.prioritized_versions_all_groups(),
            vec![image.clone(), v1.clone()]
        );
        assert_eq!(scheme.prioritized_versions_for_group("build.openshift.io"), vec![v1]);
        assert_eq!(
            scheme.groups(),
            vec!["image.openshift.io".to_string(), "build.openshift.io".to_string()]
        );
    }

    #[test]
    fn known_types_are_ordered_by_kind() {
        let mut scheme = build_scheme();
        let gv = GroupVersion::internal("build.openshift.io");
        scheme
            .add_known_types(&gv, [tn(BUILD, "BuildConfig"), tn(BUILD, "Build")])
            .unwrap();
        let names: Vec<String> = scheme
            .known_types(&gv)
            .iter()
            .map(|d| d.name.name().to_string())
            .collect();
        assert_eq!(names, vec!["Build", "BuildConfig"]);
        assert!(scheme.known_types(&GroupVersion::new("nope", "v1")).is_empty());
        assert_eq!(scheme.known_kinds(&gv)[0].0, "Build");
    }

    #[test]
    fn verify_reports_dangling_references_once() {
        let mut scheme = Scheme::new();
        let missing = tn(BUILD, "BuildSpec");
        scheme
            .add_type(record(
                BUILD,
                "Build",
                vec![
                    Field::new("Spec", TypeRef::named(missing.clone()), ""),
                    Field::new("Previous", TypeRef::pointer_to(missing.clone()), ""),
                ],
            ))
            .unwrap();
        let err = scheme.verify().unwrap_err();
        assert_eq!(
            err,
            SchemeError::DanglingReferences(vec![(tn(BUILD, "Build"), missing.clone())])
        );
        assert!(err.to_string().contains("1 unresolved type reference(s)"));

        scheme.add_type(record(BUILD, "BuildSpec", vec![])).unwrap();
        assert!(scheme.verify().is_ok());
        assert_eq!(
            scheme.resolve(&TypeRef::named(missing)).map(|d| d.is_struct()),
            Some(true)
        );
    }
}
