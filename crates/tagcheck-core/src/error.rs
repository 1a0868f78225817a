//! # Error Types
//!
//! Defines the error types shared across tagcheck. All errors use
//! `thiserror` for derive-based `Display` and `Error` implementations.
//!
//! Conformance violations are not errors: they are findings collected by
//! the checker. The types here cover operational failures only, such as a
//! malformed struct tag in a descriptor or an unparseable type expression.

use thiserror::Error;

/// Top-level error type for tagcheck.
#[derive(Error, Debug)]
pub enum TagcheckError {
    /// A struct tag did not follow the `key:"value"` grammar.
    #[error("malformed struct tag: {0}")]
    Tag(#[from] TagError),

    /// A type expression could not be parsed.
    #[error("invalid type expression: {0}")]
    TypeExpr(#[from] TypeExprError),

    /// A type or group/version identifier was rejected.
    #[error("invalid identifier: {0}")]
    InvalidName(String),

    /// The scheme registry rejected a registration or failed verification.
    #[error("scheme error: {0}")]
    Scheme(String),

    /// A scheme descriptor document could not be loaded.
    #[error("descriptor error: {0}")]
    Descriptor(String),
}

/// Error while parsing a struct tag.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TagError {
    /// A key was not followed by `:"`.
    #[error("key {key:?} at offset {offset} is not followed by a quoted value")]
    MissingValue {
        /// The key that was being parsed.
        key: String,
        /// Byte offset of the key within the tag.
        offset: usize,
    },

    /// A quoted value was never closed.
    #[error("unterminated value for key {key:?}")]
    Unterminated {
        /// The key whose value is unterminated.
        key: String,
    },

    /// A quoted value contained an unknown or truncated escape sequence.
    #[error("bad escape in value for key {key:?}: {reason}")]
    BadEscape {
        /// The key whose value is malformed.
        key: String,
        /// What was wrong with the escape.
        reason: String,
    },

    /// Pairs must be separated by whitespace.
    #[error("missing separator after value for key {key:?}")]
    MissingSeparator {
        /// The key preceding the missing separator.
        key: String,
    },
}

/// Error while parsing a type expression such as `*pkg/path.Name`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{expr:?}: {reason}")]
pub struct TypeExprError {
    /// The offending expression.
    pub expr: String,
    /// Why it was rejected.
    pub reason: String,
}

impl TypeExprError {
    pub(crate) fn new(expr: &str, reason: impl Into<String>) -> Self {
        Self {
            expr: expr.to_string(),
            reason: reason.into(),
        }
    }
}
