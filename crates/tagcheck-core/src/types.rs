//! # Type Description Table Entries
//!
//! The explicit, fully materialized description of an API type that the
//! checker walks in place of runtime reflection. A [`TypeDef`] is either a
//! structured record with ordered [`Field`]s or a named type with some other
//! underlying shape (`type ResourceName string`).

use serde::Serialize;

use crate::identity::TypeName;
use crate::tag::StructTag;

/// A reference to a type from a field declaration.
///
/// Written and parsed in Go-style syntax (see [`crate::expr`]): `string`,
/// `*pkg/path.Name`, `[]pkg/path.Name`, `map[string]int32`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TypeRef {
    /// A predeclared type such as `string`, `int64` or `interface{}`.
    Builtin(String),
    /// A named type defined in the type table.
    Named(TypeName),
    /// Pointer (optional reference) to another type.
    Pointer(Box<TypeRef>),
    /// Variable-length sequence.
    Slice(Box<TypeRef>),
    /// Fixed-length sequence.
    Array {
        /// Number of elements.
        len: usize,
        /// Element type.
        elem: Box<TypeRef>,
    },
    /// Key/value mapping.
    Map {
        /// Key type.
        key: Box<TypeRef>,
        /// Value type.
        value: Box<TypeRef>,
    },
}

impl TypeRef {
    /// Reference to a named type.
    pub fn named(name: TypeName) -> Self {
        Self::Named(name)
    }

    /// Pointer to a named type.
    pub fn pointer_to(name: TypeName) -> Self {
        Self::Pointer(Box::new(Self::Named(name)))
    }

    /// The named type this refers to directly, if any.
    pub fn as_named(&self) -> Option<&TypeName> {
        match self {
            Self::Named(name) => Some(name),
            _ => None,
        }
    }

    /// The named type behind a single pointer, if any.
    pub fn pointee(&self) -> Option<&TypeName> {
        match self {
            Self::Pointer(inner) => inner.as_named(),
            _ => None,
        }
    }

    /// Every named type mentioned anywhere in this reference.
    pub fn named_types(&self) -> Vec<&TypeName> {
        let mut out = Vec::new();
        self.collect_named(&mut out);
        out
    }

    fn collect_named<'a>(&'a self, out: &mut Vec<&'a TypeName>) {
        match self {
            Self::Builtin(_) => {}
            Self::Named(name) => out.push(name),
            Self::Pointer(inner) | Self::Slice(inner) => inner.collect_named(out),
            Self::Array { elem, .. } => elem.collect_named(out),
            Self::Map { key, value } => {
                key.collect_named(out);
                value.collect_named(out);
            }
        }
    }
}

/// A field of a structured record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Field {
    /// Field name; for embedded fields, the embedded type's name.
    pub name: String,
    /// Declared type.
    #[serde(rename = "type")]
    pub ty: TypeRef,
    /// Metadata annotation.
    pub tag: StructTag,
}

impl Field {
    /// Create a field.
    pub fn new(name: impl Into<String>, ty: TypeRef, tag: impl Into<StructTag>) -> Self {
        Self {
            name: name.into(),
            ty,
            tag: tag.into(),
        }
    }
}

/// Shape of a named type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "of")]
pub enum TypeBody {
    /// Structured record with fields in declaration order.
    Struct(Vec<Field>),
    /// Any other named type, described by its underlying type.
    Underlying(TypeRef),
}

/// A named type definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeDef {
    /// Fully-qualified name.
    pub name: TypeName,
    /// Shape of the type.
    pub body: TypeBody,
}

impl TypeDef {
    /// A structured record.
    pub fn record(name: TypeName, fields: Vec<Field>) -> Self {
        Self {
            name,
            body: TypeBody::Struct(fields),
        }
    }

    /// A named type with a non-record underlying type.
    pub fn underlying(name: TypeName, ty: TypeRef) -> Self {
        Self {
            name,
            body: TypeBody::Underlying(ty),
        }
    }

    /// Whether this is a structured record.
    pub fn is_struct(&self) -> bool {
        matches!(self.body, TypeBody::Struct(_))
    }

    /// Fields in declaration order; empty for non-record types.
    pub fn fields(&self) -> &[Field] {
        match &self.body {
            TypeBody::Struct(fields) => fields,
            TypeBody::Underlying(_) => &[],
        }
    }

    /// Package path of the type.
    pub fn pkg_path(&self) -> &str {
        self.name.pkg_path()
    }

    /// Every named type this definition refers to.
    pub fn references(&self) -> Vec<&TypeName> {
        match &self.body {
            TypeBody::Struct(fields) => fields.iter().flat_map(|f| f.ty.named_types()).collect(),
            TypeBody::Underlying(ty) => ty.named_types(),
        }
    }
}
