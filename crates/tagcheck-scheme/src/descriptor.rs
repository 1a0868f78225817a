//! # Scheme Descriptors
//!
//! Installation of a [`Scheme`] from YAML or JSON documents. A descriptor
//! declares type definitions and the group/versions their roots register
//! under:
//!
//! ```yaml
//! types:
//!   - package: github.com/openshift/origin/pkg/build/apis/build
//!     name: Build
//!     fields:
//!       - name: ObjectMeta
//!         type: k8s.io/apimachinery/pkg/apis/meta/v1.ObjectMeta
//!       - name: Spec
//!         type: github.com/openshift/origin/pkg/build/apis/build.BuildSpec
//!   - package: github.com/openshift/origin/pkg/build/apis/build
//!     name: BuildPhase
//!     underlying: string
//! groups:
//!   - group: build.openshift.io
//!     priority: [v1]
//!     versions:
//!       - version: __internal
//!         types: [github.com/openshift/origin/pkg/build/apis/build.Build]
//! ```
//!
//! ## Pipeline
//!
//! 1. Parse the document (YAML; JSON is accepted as a YAML subset).
//! 2. Validate it against the bundled `scheme-descriptor.schema.json`
//!    (Draft 2020-12). Violations are reported with their instance path.
//! 3. Decode into [`SchemeDescriptor`]; type expressions and type names are
//!    parsed here.
//! 4. Check every struct tag strictly against the tag grammar.
//! 5. Install: all type definitions from every document first, then all
//!    registrations, so roots may be defined in any document of the set.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::Value;
use tagcheck_core::{Field, GroupVersion, StructTag, TypeDef, TypeName, TypeRef};

use crate::error::{DescriptorError, DescriptorViolation, SchemeError};
use crate::scheme::Scheme;

/// The bundled JSON Schema every descriptor is validated against.
pub const DESCRIPTOR_SCHEMA: &str = include_str!("../schemas/scheme-descriptor.schema.json");

/// File extensions recognized when loading a directory.
const DESCRIPTOR_EXTENSIONS: &[&str] = &["yaml", "yml", "json"];

/// A decoded scheme descriptor document.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemeDescriptor {
    /// Type definitions.
    #[serde(default)]
    pub types: Vec<TypeDescriptor>,
    /// Group/version registrations.
    #[serde(default)]
    pub groups: Vec<GroupDescriptor>,
}

/// One type definition.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TypeDescriptor {
    /// Package path.
    pub package: String,
    /// Unqualified type name.
    pub name: String,
    /// Fields of a record type, in declaration order.
    #[serde(default)]
    pub fields: Vec<FieldDescriptor>,
    /// Underlying type of a non-record named type.
    #[serde(default)]
    pub underlying: Option<TypeRef>,
}

/// One field of a record type.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldDescriptor {
    /// Field name.
    pub name: String,
    /// Declared type expression.
    #[serde(rename = "type")]
    pub ty: TypeRef,
    /// Struct tag; absent means no annotation at all.
    #[serde(default)]
    pub tag: StructTag,
}

/// Registrations for one API group.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GroupDescriptor {
    /// Group name; empty for the core group.
    pub group: String,
    /// Preferred version order.
    #[serde(default)]
    pub priority: Vec<String>,
    /// Versions and their root types.
    pub versions: Vec<VersionDescriptor>,
}

/// Root types registered under one version.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VersionDescriptor {
    /// Version name, or `__internal`.
    pub version: String,
    /// Fully-qualified names of the root types.
    pub types: Vec<TypeName>,
}

impl TypeDescriptor {
    /// Build the table entry for this descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`tagcheck_core::TagcheckError::InvalidName`] for an invalid
    /// package path or name.
    pub fn to_type_def(&self) -> Result<TypeDef, tagcheck_core::TagcheckError> {
        let name = TypeName::new(&self.package, &self.name)?;
        Ok(match &self.underlying {
            Some(ty) => TypeDef::underlying(name, ty.clone()),
            None => TypeDef::record(
                name,
                self.fields
                    .iter()
                    .map(|f| Field::new(&f.name, f.ty.clone(), f.tag.clone()))
                    .collect(),
            ),
        })
    }
}

impl SchemeDescriptor {
    /// Install this descriptor's types and registrations into `scheme`.
    ///
    /// # Errors
    ///
    /// Propagates the first [`SchemeError`].
    pub fn install(&self, scheme: &mut Scheme) -> Result<(), SchemeError> {
        self.install_types(scheme)?;
        self.install_groups(scheme)
    }

    fn install_types(&self, scheme: &mut Scheme) -> Result<(), SchemeError> {
        for ty in &self.types {
            let def = ty.to_type_def().map_err(|e| SchemeError::InvalidDefinition {
                package: ty.package.clone(),
                name: ty.name.clone(),
                reason: e.to_string(),
            })?;
            scheme.add_type(def)?;
        }
        Ok(())
    }

    fn install_groups(&self, scheme: &mut Scheme) -> Result<(), SchemeError> {
        for group in &self.groups {
            for version in &group.versions {
                let gv = GroupVersion::new(group.group.as_str(), version.version.as_str());
                scheme.add_known_types(&gv, version.types.iter().cloned())?;
            }
            if !group.priority.is_empty() {
                scheme.set_version_priority(&group.group, group.priority.iter().cloned())?;
            }
        }
        Ok(())
    }
}

/// Loads and installs scheme descriptors.
///
/// Compiles the bundled descriptor schema once at construction.
pub struct DescriptorLoader {
    validator: jsonschema::Validator,
}

impl DescriptorLoader {
    /// Compile the bundled descriptor schema.
    ///
    /// # Errors
    ///
    /// Returns [`DescriptorError::SchemaBuild`] if the bundled schema does
    /// not compile.
    pub fn new() -> Result<Self, DescriptorError> {
        let schema: Value = serde_json::from_str(DESCRIPTOR_SCHEMA)
            .map_err(|e| DescriptorError::SchemaBuild(format!("invalid JSON: {e}")))?;
        let mut opts = jsonschema::options();
        opts.with_draft(jsonschema::Draft::Draft202012);
        let validator = opts
            .build(&schema)
            .map_err(|e| DescriptorError::SchemaBuild(e.to_string()))?;
        Ok(Self { validator })
    }

    /// Parse, validate, and decode one document. `path` is used for
    /// error reporting only.
    ///
    /// # Errors
    ///
    /// Returns [`DescriptorError::Parse`], [`DescriptorError::Invalid`],
    /// [`DescriptorError::Decode`], or [`DescriptorError::MalformedTag`].
    pub fn parse(&self, path: &Path, content: &str) -> Result<SchemeDescriptor, DescriptorError> {
        let instance: Value = serde_yaml::from_str(content).map_err(|e| DescriptorError::Parse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let violations: Vec<DescriptorViolation> = self
            .validator
            .iter_errors(&instance)
            .map(|e| DescriptorViolation {
                instance_path: e.instance_path.to_string(),
                message: e.to_string(),
            })
            .collect();
        if !violations.is_empty() {
            return Err(DescriptorError::Invalid {
                path: path.to_path_buf(),
                violations,
            });
        }

        let descriptor: SchemeDescriptor =
            serde_json::from_value(instance).map_err(|e| DescriptorError::Decode {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        for ty in &descriptor.types {
            let type_name =
                TypeName::new(&ty.package, &ty.name).map_err(|e| DescriptorError::Decode {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                })?;
            for field in &ty.fields {
                field.tag.pairs().map_err(|source| DescriptorError::MalformedTag {
                    path: path.to_path_buf(),
                    type_name: type_name.clone(),
                    field: field.name.clone(),
                    source,
                })?;
            }
        }

        Ok(descriptor)
    }

    /// Read and decode one descriptor file.
    pub fn read(&self, path: &Path) -> Result<SchemeDescriptor, DescriptorError> {
        let content = std::fs::read_to_string(path).map_err(|source| DescriptorError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let descriptor = self.parse(path, &content)?;
        tracing::debug!(
            path = %path.display(),
            types = descriptor.types.len(),
            groups = descriptor.groups.len(),
            "read scheme descriptor"
        );
        Ok(descriptor)
    }

    /// Read every descriptor under `paths` and install them into a fresh
    /// scheme. Directories are searched recursively; files are processed in
    /// sorted path order.
    ///
    /// # Errors
    ///
    /// Returns the first read, validation, decode, or install error.
    pub fn load(&self, paths: &[PathBuf]) -> Result<Scheme, DescriptorError> {
        let mut files = Vec::new();
        for path in paths {
            files.extend(descriptor_files(path)?);
        }

        let mut documents = Vec::with_capacity(files.len());
        for file in files {
            let descriptor = self.read(&file)?;
            documents.push((file, descriptor));
        }

        let mut scheme = Scheme::new();
        for (path, descriptor) in &documents {
            descriptor
                .install_types(&mut scheme)
                .map_err(|source| install_error(path, source))?;
        }
        for (path, descriptor) in &documents {
            descriptor
                .install_groups(&mut scheme)
                .map_err(|source| install_error(path, source))?;
        }

        tracing::info!(
            documents = documents.len(),
            types = scheme.type_count(),
            versions = scheme.prioritized_versions_all_groups().len(),
            "installed scheme"
        );
        Ok(scheme)
    }
}

fn install_error(path: &Path, source: SchemeError) -> DescriptorError {
    DescriptorError::Install {
        path: path.to_path_buf(),
        source,
    }
}

/// Descriptor files at `path`: the file itself, or every file with a
/// descriptor extension below a directory, sorted.
///
/// # Errors
///
/// Returns [`DescriptorError::Read`] if `path` or a directory below it
/// cannot be read.
pub fn descriptor_files(path: &Path) -> Result<Vec<PathBuf>, DescriptorError> {
    let read_error = |source| DescriptorError::Read {
        path: path.to_path_buf(),
        source,
    };

    let metadata = std::fs::metadata(path).map_err(read_error)?;
    if !metadata.is_dir() {
        return Ok(vec![path.to_path_buf()]);
    }

    let mut files = Vec::new();
    for entry in std::fs::read_dir(path).map_err(read_error)? {
        let entry_path = entry.map_err(read_error)?.path();
        if entry_path.is_dir() {
            files.extend(descriptor_files(&entry_path)?);
        } else if entry_path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| DESCRIPTOR_EXTENSIONS.contains(&e))
        {
            files.push(entry_path);
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loader() -> DescriptorLoader {
        DescriptorLoader::new().expect("bundled schema compiles")
    }

    const MINIMAL: &str = r#"
types:
  - package: github.com/openshift/origin/pkg/image/apis/image
    name: DockerConfig
    fields:
      - name: Hostname
        type: string
        tag: 'json:"Hostname,omitempty"'
      - name: Labels
        type: map[string]string
  - package: github.com/openshift/origin/pkg/image/apis/image
    name: ImagePhase
    underlying: string
groups:
  - group: image.openshift.io
    versions:
      - version: __internal
        types: [github.com/openshift/origin/pkg/image/apis/image.DockerConfig]
"#;

    #[test]
    fn bundled_schema_compiles() {
        assert!(DescriptorLoader::new().is_ok());
    }

    #[test]
    fn parses_minimal_descriptor() {
        let desc = loader().parse(Path::new("minimal.yaml"), MINIMAL).unwrap();
        assert_eq!(desc.types.len(), 2);
        assert_eq!(desc.types[0].fields[0].tag.get("json"), "Hostname,omitempty");
        assert!(desc.types[0].fields[1].tag.is_empty());
        assert!(desc.types[1].underlying.is_some());
        assert_eq!(desc.groups[0].versions[0].version, "__internal");
    }

    #[test]
    fn installs_into_scheme() {
        let desc = loader().parse(Path::new("minimal.yaml"), MINIMAL).unwrap();
        let mut scheme = Scheme::new();
        desc.install(&mut scheme).unwrap();
        let internal = GroupVersion::internal("image.openshift.io");
        let roots = scheme.known_types(&internal);
        assert_eq!(roots.len(), 1);
        assert_eq!(roots[0].name.name(), "DockerConfig");
        assert!(scheme.prioritized_versions_all_groups().is_empty());
        assert!(scheme.verify().is_ok());
    }

    #[test]
    fn hand_built_descriptor_with_bad_name_fails_to_install() {
        let desc = SchemeDescriptor {
            types: vec![TypeDescriptor {
                package: "example.com/pkg/api".to_string(),
                name: "not a name".to_string(),
                fields: Vec::new(),
                underlying: None,
            }],
            groups: Vec::new(),
        };
        assert!(matches!(
            desc.install(&mut Scheme::new()),
            Err(SchemeError::InvalidDefinition { .. })
        ));
    }

    #[test]
    fn json_documents_are_accepted() {
        let json = r#"{"types": [{"package": "example.com/pkg/api", "name": "Thing", "fields": []}]}"#;
        let desc = loader().parse(Path::new("thing.json"), json).unwrap();
        assert_eq!(desc.types[0].name, "Thing");
    }

    #[test]
    fn schema_violations_are_structured() {
        let doc = r#"
types:
  - package: example.com/pkg/api
    name: 9Bad
    colour: blue
"#;
        let err = loader().parse(Path::new("bad.yaml"), doc).unwrap_err();
        match err {
            DescriptorError::Invalid { violations, .. } => {
                assert!(!violations.is_empty());
                assert!(violations.iter().all(|v| v.instance_path.starts_with("/types/0")));
            }
            other => panic!("expected Invalid, got {other:?}"),
        }
    }

    #[test]
    fn fields_and_underlying_are_exclusive() {
        let doc = r#"
types:
  - package: example.com/pkg/api
    name: Both
    underlying: string
    fields: []
"#;
        assert!(matches!(
            loader().parse(Path::new("both.yaml"), doc),
            Err(DescriptorError::Invalid { .. })
        ));
    }

    #[test]
    fn bad_type_expression_is_a_decode_error() {
        let doc = r#"
types:
  - package: example.com/pkg/api
    name: Thing
    fields:
      - name: Items
        type: "[]Strng"
"#;
        let err = loader().parse(Path::new("thing.yaml"), doc).unwrap_err();
        assert!(matches!(err, DescriptorError::Decode { .. }), "{err}");
        assert!(err.to_string().contains("[]Strng"));
    }

    #[test]
    fn malformed_tag_is_rejected() {
        let doc = r#"
types:
  - package: example.com/pkg/api
    name: Thing
    fields:
      - name: Name
        type: string
        tag: 'json:"name'
"#;
        let err = loader().parse(Path::new("thing.yaml"), doc).unwrap_err();
        match err {
            DescriptorError::MalformedTag { type_name, field, .. } => {
                assert_eq!(type_name.to_string(), "example.com/pkg/api.Thing");
                assert_eq!(field, "Name");
            }
            other => panic!("expected MalformedTag, got {other:?}"),
        }
    }

    #[test]
    fn unparseable_yaml_is_a_parse_error() {
        let err = loader().parse(Path::new("broken.yaml"), "types: [").unwrap_err();
        assert!(matches!(err, DescriptorError::Parse { .. }));
    }

    #[test]
    fn roots_may_be_defined_in_a_later_document() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("a-groups.yaml"),
            "groups:\n  - group: apps.example.com\n    versions:\n      - version: v1\n        types: [example.com/pkg/apps/v1.Deployment]\n",
        )
        .unwrap();
        std::fs::write(
            dir.path().join("b-types.yaml"),
            "types:\n  - package: example.com/pkg/apps/v1\n    name: Deployment\n",
        )
        .unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let scheme = loader().load(&[dir.path().to_path_buf()]).unwrap();
        assert_eq!(
            scheme.prioritized_versions_all_groups(),
            vec![GroupVersion::new("apps.example.com", "v1")]
        );
    }

    #[test]
    fn install_errors_name_the_document() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("groups.yaml"),
            "groups:\n  - group: apps.example.com\n    versions:\n      - version: v1\n        types: [example.com/pkg/apps/v1.Missing]\n",
        )
        .unwrap();
        let err = loader().load(&[dir.path().to_path_buf()]).unwrap_err();
        match err {
            DescriptorError::Install { path, source } => {
                assert!(path.ends_with("groups.yaml"));
                assert!(matches!(source, SchemeError::UndefinedRoot { .. }));
            }
            other => panic!("expected Install, got {other:?}"),
        }
    }

    #[test]
    fn missing_path_is_a_read_error() {
        let err = loader().load(&[PathBuf::from("/nonexistent/tagcheck")]).unwrap_err();
        assert!(matches!(err, DescriptorError::Read { .. }));
    }
}
