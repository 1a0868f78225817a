//! # Type Expressions
//!
//! Parsing and printing of the Go-style type expressions used in field
//! declarations:
//!
//! | Expression | [`TypeRef`] |
//! |---|---|
//! | `string`, `int64`, `interface{}` | `Builtin` |
//! | `github.com/openshift/origin/pkg/image/apis/image.DockerImage` | `Named` |
//! | `*T` | `Pointer` |
//! | `[]T` | `Slice` |
//! | `[16]T` | `Array` |
//! | `map[K]V` | `Map` |

use std::fmt;
use std::str::FromStr;

use crate::error::TypeExprError;
use crate::identity::TypeName;
use crate::types::TypeRef;

/// Predeclared type names accepted as [`TypeRef::Builtin`].
pub const BUILTIN_TYPES: &[&str] = &[
    "bool",
    "string",
    "int",
    "int8",
    "int16",
    "int32",
    "int64",
    "uint",
    "uint8",
    "uint16",
    "uint32",
    "uint64",
    "uintptr",
    "byte",
    "rune",
    "float32",
    "float64",
    "complex64",
    "complex128",
    "error",
    "any",
    "interface{}",
];

/// Parse a type expression.
///
/// # Errors
///
/// Returns [`TypeExprError`] naming the whole expression when any part of
/// it is malformed.
pub fn parse_type_expr(expr: &str) -> Result<TypeRef, TypeExprError> {
    parse_inner(expr, expr.trim())
}

fn parse_inner(whole: &str, s: &str) -> Result<TypeRef, TypeExprError> {
    if s.is_empty() {
        return Err(TypeExprError::new(whole, "empty type"));
    }

    if let Some(rest) = s.strip_prefix('*') {
        return Ok(TypeRef::Pointer(Box::new(parse_inner(whole, rest)?)));
    }

    if let Some(rest) = s.strip_prefix("[]") {
        return Ok(TypeRef::Slice(Box::new(parse_inner(whole, rest)?)));
    }

    if let Some(rest) = s.strip_prefix("map[") {
        let close = matching_bracket(rest)
            .ok_or_else(|| TypeExprError::new(whole, "unbalanced `[` in map key"))?;
        let key = parse_inner(whole, &rest[..close])?;
        let value = parse_inner(whole, &rest[close + 1..])?;
        return Ok(TypeRef::Map {
            key: Box::new(key),
            value: Box::new(value),
        });
    }

    if let Some(rest) = s.strip_prefix('[') {
        let close = rest
            .find(']')
            .ok_or_else(|| TypeExprError::new(whole, "unbalanced `[` in array length"))?;
        let len = rest[..close]
            .trim()
            .parse::<usize>()
            .map_err(|e| TypeExprError::new(whole, format!("bad array length: {e}")))?;
        let elem = parse_inner(whole, &rest[close + 1..])?;
        return Ok(TypeRef::Array {
            len,
            elem: Box::new(elem),
        });
    }

    if BUILTIN_TYPES.contains(&s) {
        return Ok(TypeRef::Builtin(s.to_string()));
    }

    let name: TypeName = s
        .parse()
        .map_err(|e| TypeExprError::new(whole, format!("{e}")))?;
    if name.pkg_path().is_empty() {
        return Err(TypeExprError::new(
            whole,
            format!("{s:?} is neither predeclared nor package-qualified"),
        ));
    }
    Ok(TypeRef::Named(name))
}

/// Index of the `]` closing an already-consumed `[`.
fn matching_bracket(s: &str) -> Option<usize> {
    let mut depth = 1usize;
    for (i, c) in s.char_indices() {
        match c {
            '[' => depth += 1,
            ']' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Builtin(name) => f.write_str(name),
            Self::Named(name) => write!(f, "{name}"),
            Self::Pointer(inner) => write!(f, "*{inner}"),
            Self::Slice(inner) => write!(f, "[]{inner}"),
            Self::Array { len, elem } => write!(f, "[{len}]{elem}"),
            Self::Map { key, value } => write!(f, "map[{key}]{value}"),
        }
    }
}

impl FromStr for TypeRef {
    type Err = TypeExprError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_type_expr(s)
    }
}

impl TryFrom<String> for TypeRef {
    type Error = TypeExprError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        parse_type_expr(&value)
    }
}

impl From<TypeRef> for String {
    fn from(value: TypeRef) -> Self {
        value.to_string()
    }
}
