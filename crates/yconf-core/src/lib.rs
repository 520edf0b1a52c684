//! # yconf-core — Foundational Types for yconf
//!
//! This crate defines the document tree every other yconf crate operates
//! on, together with the shared error hierarchy and the filesystem path
//! rules used for include identity.
//!
//! ## Key Design Principles
//!
//! 1. **One tree type.** [`Node`] is a sum type over `Undefined`, `Null`,
//!    `Scalar`, `Sequence`, and `Mapping`, plus an optional tag. Exhaustive
//!    `match` replaces runtime "is this a map?" probing.
//!
//! 2. **Ownership transfer, not aliasing.** Transformations take a `Node` by
//!    value and return a freshly owned replacement. No node is mutated while
//!    another reference to it is alive.
//!
//! 3. **Canonical paths are identities.** [`canonicalize_best_effort`] is the
//!    single place that decides what "the same file" means.
//!
//! 4. **YAML lives at the edge.** Parser events become [`Node`] trees on
//!    the way in ([`parse_documents`]), keeping scalar text and tags exactly
//!    as written. `serde_yaml` renders trees on the way out ([`emit`]).
//!    Nothing else in the workspace sees either library.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `yconf-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod error;
pub mod node;
pub mod path;
pub mod yaml;

pub use error::{LoadError, ResolveError, SchemaError, YconfError};
pub use node::{Mapping, Node, NodeKind};
pub use path::{absolute, canonicalize_best_effort};
pub use yaml::{emit, parse_documents, to_yaml, CORE_TAG_PREFIX};
