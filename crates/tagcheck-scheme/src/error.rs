//! # Registry and Installation Errors

use std::fmt;
use std::path::PathBuf;

use tagcheck_core::{GroupVersion, TagError, TagcheckError, TypeName};
use thiserror::Error;

/// Error raised by [`crate::Scheme`] registration or verification.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemeError {
    /// A type was added twice with different definitions.
    #[error("type {name} is already defined with a different shape")]
    ConflictingDefinition {
        /// The doubly-defined type.
        name: TypeName,
    },

    /// A root was registered before its definition was added.
    #[error("cannot register {name} under {gv}: type is not defined")]
    UndefinedRoot {
        /// Target group/version.
        gv: GroupVersion,
        /// The missing type.
        name: TypeName,
    },

    /// Only structured records can be registered as roots.
    #[error("cannot register {name} under {gv}: not a struct")]
    RootNotStruct {
        /// Target group/version.
        gv: GroupVersion,
        /// The offending type.
        name: TypeName,
    },

    /// Two different types claimed the same kind name under one group/version.
    #[error("kind {kind} under {gv} is already registered to {existing}, cannot register {attempted}")]
    KindConflict {
        /// Target group/version.
        gv: GroupVersion,
        /// Kind name (the unqualified type name).
        kind: String,
        /// Type currently registered.
        existing: TypeName,
        /// Type that was rejected.
        attempted: TypeName,
    },

    /// A type definition carries an invalid package path or name.
    #[error("invalid definition {package}.{name}: {reason}")]
    InvalidDefinition {
        /// Declared package path.
        package: String,
        /// Declared type name.
        name: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The version part of a group/version was empty.
    #[error("group {group:?} registered with an empty version")]
    EmptyVersion {
        /// The group concerned.
        group: String,
    },

    /// Field declarations mention types that are not in the table.
    #[error("{} unresolved type reference(s):\n{}", .0.len(), DanglingList(.0))]
    DanglingReferences(Vec<(TypeName, TypeName)>),
}

struct DanglingList<'a>(&'a [(TypeName, TypeName)]);

impl fmt::Display for DanglingList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (from, missing)) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "  {from} -> {missing}")?;
        }
        Ok(())
    }
}

/// A single descriptor schema violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptorViolation {
    /// JSON Pointer path to the violating node in the document.
    pub instance_path: String,
    /// Human-readable description of the violation.
    pub message: String,
}

impl fmt::Display for DescriptorViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.instance_path.is_empty() {
            write!(f, "  (root): {}", self.message)
        } else {
            write!(f, "  {}: {}", self.instance_path, self.message)
        }
    }
}

struct ViolationList<'a>(&'a [DescriptorViolation]);

impl fmt::Display for ViolationList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{v}")?;
        }
        Ok(())
    }
}

/// Error while loading or installing a scheme descriptor.
#[derive(Error, Debug)]
pub enum DescriptorError {
    /// The bundled descriptor schema failed to compile.
    #[error("descriptor schema failed to build: {0}")]
    SchemaBuild(String),

    /// The file or directory could not be read.
    #[error("cannot read {}: {source}", .path.display())]
    Read {
        /// Path that failed.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The document is not valid YAML/JSON.
    #[error("cannot parse {}: {reason}", .path.display())]
    Parse {
        /// Document path.
        path: PathBuf,
        /// Parser message.
        reason: String,
    },

    /// The document does not conform to the descriptor schema.
    #[error("{} does not conform to the scheme descriptor schema:\n{}", .path.display(), ViolationList(.violations))]
    Invalid {
        /// Document path.
        path: PathBuf,
        /// Structured list of violations.
        violations: Vec<DescriptorViolation>,
    },

    /// The document conforms structurally but a value failed to decode,
    /// e.g. a malformed type expression.
    #[error("cannot decode {}: {reason}", .path.display())]
    Decode {
        /// Document path.
        path: PathBuf,
        /// Decoder message.
        reason: String,
    },

    /// A field carries a struct tag that does not follow the tag grammar.
    #[error("{}: {type_name}.{field}: {source}", .path.display())]
    MalformedTag {
        /// Document path.
        path: PathBuf,
        /// Enclosing type.
        type_name: TypeName,
        /// Field name.
        field: String,
        /// Tag parse error.
        #[source]
        source: TagError,
    },

    /// Installing the document into the scheme failed.
    #[error("cannot install {}: {source}", .path.display())]
    Install {
        /// Document path.
        path: PathBuf,
        /// Registry error.
        #[source]
        source: SchemeError,
    },
}

impl From<SchemeError> for TagcheckError {
    fn from(e: SchemeError) -> Self {
        TagcheckError::Scheme(e.to_string())
    }
}

impl From<DescriptorError> for TagcheckError {
    fn from(e: DescriptorError) -> Self {
        TagcheckError::Descriptor(e.to_string())
    }
}
