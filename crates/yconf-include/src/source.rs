//! # Tree Sources
//!
//! The resolver never parses text itself. It asks a [`TreeSource`] for the
//! tree stored at a path. Tests and embedders can substitute their own
//! source; the CLI uses [`YamlFileSource`].

use std::path::Path;

use yconf_core::{parse_documents, LoadError, Node};

/// Loads document trees from paths.
pub trait TreeSource {
    /// Load the single document stored at `path`.
    ///
    /// An empty file yields a null node. A file holding more than one
    /// document is an error rather than silently keeping the first.
    fn load_one(&self, path: &Path) -> Result<Node, LoadError> {
        let mut documents = self.load_all(path)?;
        match documents.len() {
            0 => Ok(Node::null()),
            1 => Ok(documents.remove(0)),
            count => Err(LoadError::MultipleDocuments {
                path: path.display().to_string(),
                count,
            }),
        }
    }

    /// Load every top-level document stored at `path`, in file order.
    fn load_all(&self, path: &Path) -> Result<Vec<Node>, LoadError>;
}

/// Reads YAML files from the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlFileSource;

impl TreeSource for YamlFileSource {
    fn load_all(&self, path: &Path) -> Result<Vec<Node>, LoadError> {
        let text = std::fs::read_to_string(path).map_err(|source| LoadError::Read {
            path: path.display().to_string(),
            source,
        })?;
        parse_documents(&text, &path.display().to_string())
    }
}

impl<S: TreeSource + ?Sized> TreeSource for &S {
    fn load_one(&self, path: &Path) -> Result<Node, LoadError> {
        (**self).load_one(path)
    }

    fn load_all(&self, path: &Path) -> Result<Vec<Node>, LoadError> {
        (**self).load_all(path)
    }
}
