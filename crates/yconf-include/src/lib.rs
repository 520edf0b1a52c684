//! # yconf-include — Include Resolution and Config Loading
//!
//! Turns a configuration file into one fully spliced [`Node`] tree.
//!
//! ## Include Resolution (`resolver`)
//!
//! [`IncludeResolver`] walks a tree depth-first. A scalar tagged `!include`
//! names another file, relative to the directory of the file that contains
//! the directive. The target is loaded, resolved recursively against *its
//! own* directory, and replaces the directive node wholesale.
//!
//! Every target's canonical path is recorded in a [`VisitedSet`] shared by
//! the whole load, so a file reached twice (directly, transitively, or from
//! sibling branches) is rejected as a cycle instead of recursing forever.
//!
//! ## Loading (`loader`)
//!
//! [`ConfigLoader::load`] reads every top-level document in the root file,
//! resolves each against one shared [`VisitedSet`] seeded with the root
//! itself, and combines them with [`merge_documents`].
//!
//! ## Sources (`source`)
//!
//! [`TreeSource`] is the seam to the parser. [`YamlFileSource`] reads YAML
//! files from disk through [`yconf_core::parse_documents`].
//!
//! ## Crate Policy
//!
//! - Depends only on `yconf-core` internally.
//! - The visited set is created per load and passed by `&mut`; there is no
//!   process-wide state.
//!
//! [`Node`]: yconf_core::Node

pub mod loader;
pub mod resolver;
pub mod source;

pub use loader::{merge_documents, ConfigLoader, LoaderOptions};
pub use resolver::{IncludeResolver, IncludeTagPolicy, VisitedSet, INCLUDE_TAG};
pub use source::{TreeSource, YamlFileSource};
