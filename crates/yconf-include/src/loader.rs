//! # Configuration Loading
//!
//! [`ConfigLoader`] is the entry point for reading a configuration file:
//! canonicalize the root path, read every top-level document, resolve
//! includes in each, and merge the results.
//!
//! ## Merge Policy
//!
//! Applied by [`merge_documents`] after resolution:
//!
//! | documents                 | result                                      |
//! |---------------------------|---------------------------------------------|
//! | none                      | `Undefined`                                 |
//! | exactly one               | that document, unchanged                    |
//! | all mappings              | shallow merge; a later key replaces earlier |
//! | all sequences             | concatenation in file order                 |
//! | anything else             | a sequence wrapping every document          |
//!
//! The mapping merge is shallow: a colliding key's whole value is replaced,
//! nested mappings are not merged recursively.

use std::path::Path;

use tracing::{debug, info};

use yconf_core::{canonicalize_best_effort, Mapping, Node, NodeKind, ResolveError};

use crate::resolver::{IncludeResolver, IncludeTagPolicy, VisitedSet};
use crate::source::{TreeSource, YamlFileSource};

/// Loader configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoaderOptions {
    /// Which tags are treated as include directives.
    pub include_policy: IncludeTagPolicy,
}

/// Loads configuration files with includes resolved.
///
/// Stateless between calls: each [`load`](Self::load) builds its own
/// [`VisitedSet`], so one loader can serve any number of independent loads.
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader<S = YamlFileSource> {
    source: S,
    options: LoaderOptions,
}

impl ConfigLoader<YamlFileSource> {
    /// A loader reading YAML files from disk with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// A loader reading YAML files from disk with `options`.
    pub fn with_options(options: LoaderOptions) -> Self {
        Self {
            source: YamlFileSource,
            options,
        }
    }
}

impl<S: TreeSource> ConfigLoader<S> {
    /// A loader reading trees from `source`.
    pub fn with_source(source: S, options: LoaderOptions) -> Self {
        Self { source, options }
    }

    pub fn options(&self) -> LoaderOptions {
        self.options
    }

    /// Load `path` and every file it includes, returning the merged tree.
    ///
    /// # Errors
    ///
    /// - [`ResolveError::EmptyConfigPath`] if `path` is empty.
    /// - [`ResolveError::LoadFailure`] if the root file cannot be read or
    ///   parsed.
    /// - Any include error raised while resolving a document.
    pub fn load(&self, path: impl AsRef<Path>) -> Result<Node, ResolveError> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(ResolveError::EmptyConfigPath);
        }
        let root = canonicalize_best_effort(path);
        if root.as_os_str().is_empty() {
            return Err(ResolveError::EmptyConfigPath);
        }

        let mut visited = VisitedSet::with_root(root.clone());
        let documents = self.source.load_all(&root)?;
        debug!(
            path = %root.display(),
            documents = documents.len(),
            "loaded root documents"
        );

        let base_dir = root.parent().unwrap_or(&root);
        let resolver = IncludeResolver::new(&self.source, self.options.include_policy);
        let mut resolved = Vec::with_capacity(documents.len());
        for document in documents {
            resolved.push(resolver.resolve(document, base_dir, &mut visited)?);
        }

        info!(
            path = %root.display(),
            documents = resolved.len(),
            files = visited.len(),
            "configuration loaded"
        );
        Ok(merge_documents(resolved))
    }
}

/// Combine top-level documents according to the merge policy.
pub fn merge_documents(mut documents: Vec<Node>) -> Node {
    if documents.len() <= 1 {
        return documents.pop().unwrap_or_default();
    }

    if documents.iter().all(Node::is_mapping) {
        let mut merged = Mapping::new();
        for document in documents {
            if let NodeKind::Mapping(map) = document.into_kind() {
                for (key, value) in map {
                    merged.insert(key, value);
                }
            }
        }
        return Node::from(merged);
    }

    if documents.iter().all(Node::is_sequence) {
        let mut merged = Vec::new();
        for document in documents {
            if let NodeKind::Sequence(items) = document.into_kind() {
                merged.extend(items);
            }
        }
        return Node::sequence(merged);
    }

    Node::sequence(documents)
}
