//! # tagcheck-core: Foundational Types for tagcheck
//!
//! This crate defines the vocabulary shared by the scheme registry, the
//! conformance checker, and the CLI. It depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Stable type identity.** A type is identified by its fully-qualified
//!    [`TypeName`] (`pkg/path.Name`), never by object identity. Visited sets
//!    and registry tables are keyed by it.
//!
//! 2. **Explicit type description table.** A [`TypeDef`] carries the ordered
//!    field list of a structured record; each [`Field`] carries its declared
//!    [`TypeRef`] and its [`StructTag`]. Nothing is discovered at runtime.
//!
//! 3. **Conventional struct tags.** [`StructTag`] follows the `key:"value"`
//!    grammar used by API types (`json:"name,omitempty" description:"..."`).
//!    `get()` returns the empty string for an absent key, so "empty" and
//!    "absent" are the same thing to a policy.
//!
//! 4. **Internal sentinel version.** Internal, unversioned representations
//!    register under [`INTERNAL_VERSION`].
//!
//! ## Crate Policy
//!
//! - No dependencies on other `tagcheck-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod error;
pub mod expr;
pub mod identity;
pub mod tag;
pub mod types;

pub use error::{TagError, TagcheckError, TypeExprError};
pub use identity::{GroupVersion, TypeName, INTERNAL_VERSION};
pub use tag::StructTag;
pub use types::{Field, TypeBody, TypeDef, TypeRef};
