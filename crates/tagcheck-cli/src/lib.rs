//! # tagcheck-cli: Struct-Tag Conformance Command-Line Interface
//!
//! ## Subcommands
//!
//! - `check`: load scheme descriptors and run the conformance policies
//! - `list`: show prioritized versions, internal groups and known types
//!
//! ## Exit Codes
//!
//! | Code | Meaning |
//! |---|---|
//! | 0 | every selected policy is clean |
//! | 1 | at least one violation was found |
//! | 2 | descriptors or configuration could not be loaded |
//!
//! ## Crate Policy
//!
//! - Argument parsing is separated from the handlers.
//! - Handlers delegate to the domain crates; no checking logic here.

pub mod check;
pub mod list;
pub mod load;

/// Exit code for a clean run.
pub const EXIT_CLEAN: u8 = 0;
/// Exit code when violations were found.
pub const EXIT_VIOLATIONS: u8 = 1;
/// Exit code for operational failures.
pub const EXIT_ERROR: u8 = 2;
