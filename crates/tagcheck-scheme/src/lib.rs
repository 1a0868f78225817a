//! # tagcheck-scheme: Type Registry & Installation
//!
//! ## Registry (`scheme`)
//!
//! [`Scheme`] holds the fully materialized type table and, for every
//! `(group, version)`, the root types registered under it. Internal types
//! register under the sentinel version [`tagcheck_core::INTERNAL_VERSION`].
//! Key operations:
//!
//! - [`Scheme::prioritized_versions_all_groups`]: external versions in
//!   priority order; the internal version never appears.
//! - [`Scheme::known_types`]: roots registered under a group/version.
//! - [`Scheme::verify`]: every field reference resolves in the table.
//!
//! ## Installation (`descriptor`)
//!
//! [`DescriptorLoader`] reads scheme descriptor documents (YAML or JSON),
//! validates them against the bundled `scheme-descriptor.schema.json`, and
//! installs their types and registrations into a [`Scheme`].
//!
//! ## Crate Policy
//!
//! - Depends only on `tagcheck-core` internally.
//! - The checker treats a [`Scheme`] as read-only; all mutation happens
//!   during installation.

pub mod descriptor;
pub mod error;
pub mod scheme;

pub use descriptor::{DescriptorLoader, SchemeDescriptor};
pub use error::{DescriptorError, DescriptorViolation, SchemeError};
pub use scheme::Scheme;
