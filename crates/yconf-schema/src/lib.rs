//! # yconf-schema — Structural Schema Validation
//!
//! Checks a resolved configuration tree against a declarative schema.
//!
//! ## Schema Model (`schema`)
//!
//! [`Schema`] is the typed form of a JSON schema document restricted to
//! three keywords: `type`, `properties`, and `required`. Other keywords in
//! the file are accepted and ignored. Loading runs the raw JSON through a
//! small meta-schema (via the `jsonschema` crate) so a malformed schema file
//! is rejected up front instead of producing confusing validation results.
//!
//! ## Validation (`validate`)
//!
//! [`SchemaValidator::validate`] walks the tree and the schema together and
//! stops at the first mismatch. [`SchemaValidator::validate_all`] runs
//! several independent validations and accumulates their failures in a
//! [`ValidationReport`].
//!
//! ## Crate Policy
//!
//! - Depends only on `yconf-core` internally.
//! - Validation never mutates the tree or the schema.

pub mod schema;
pub mod validate;

pub use schema::{Schema, SchemaType};
pub use validate::{SchemaValidator, ValidationFailureEntry, ValidationReport};
