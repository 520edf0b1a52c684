//! # Error Hierarchy
//!
//! Structured error types for yconf, built with `thiserror`.
//! No `Box<dyn Error>`, no `.unwrap()` outside tests.
//!
//! Each stage of the pipeline owns one error enum:
//!
//! - [`LoadError`]: a file could not be read or parsed into a tree.
//! - [`ResolveError`]: include resolution or root loading failed.
//! - [`SchemaError`]: a schema could not be loaded, or a tree did not
//!   conform to it.
//!
//! [`YconfError`] aggregates all of them for callers that drive the whole
//! pipeline.

use thiserror::Error;

/// Top-level error type for yconf.
#[derive(Error, Debug)]
pub enum YconfError {
    /// A document could not be loaded.
    #[error("load error: {0}")]
    Load(#[from] LoadError),

    /// Include resolution failed.
    #[error("include resolution error: {0}")]
    Resolve(#[from] ResolveError),

    /// Schema loading or validation failed.
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    /// A resolved tree could not be rendered back to YAML.
    #[error("emit error: {0}")]
    Emit(#[from] serde_yaml::Error),
}

/// Errors raised while turning a file into a document tree.
#[derive(Error, Debug)]
pub enum LoadError {
    /// The file could not be read.
    #[error("cannot read {path}: {source}")]
    Read {
        /// Path that was being read.
        path: String,
        /// Underlying I/O failure.
        source: std::io::Error,
    },

    /// The file is not valid YAML.
    #[error("invalid YAML in {path}: {reason}")]
    Parse {
        /// Path of the malformed file.
        path: String,
        /// Parser diagnostic.
        reason: String,
    },

    /// A mapping key is a sequence or mapping, which the tree cannot represent.
    #[error("unsupported mapping key in {path}: {key}")]
    UnsupportedKey {
        /// Path of the offending file.
        path: String,
        /// Debug rendering of the key.
        key: String,
    },

    /// A file expected to hold one document holds several.
    #[error("{path} contains {count} documents; expected a single document")]
    MultipleDocuments {
        /// Path of the offending file.
        path: String,
        /// Number of documents found.
        count: usize,
    },
}

/// Errors raised by include resolution and root configuration loading.
///
/// Every variant is terminal: resolution unwinds on the first error.
#[derive(Error, Debug)]
pub enum ResolveError {
    /// The include tag was applied to a node that is not a scalar filename.
    #[error("include must be applied to a scalar filename (found {found} under {base_dir})")]
    MalformedInclude {
        /// Kind of the offending node.
        found: &'static str,
        /// Directory of the file containing the directive.
        base_dir: String,
    },

    /// The include directive named an empty path.
    #[error("empty include path under {base_dir}")]
    EmptyIncludePath {
        /// Directory of the file containing the directive.
        base_dir: String,
    },

    /// The root configuration path is empty.
    #[error("empty config path")]
    EmptyConfigPath,

    /// The include target was already visited during this load.
    #[error("include cycle detected: {path}")]
    IncludeCycle {
        /// Canonical path that was visited twice.
        path: String,
    },

    /// The include target does not exist.
    #[error("included file not found: {path}")]
    IncludeNotFound {
        /// Resolved absolute path of the missing file.
        path: String,
    },

    /// The root file or an included file could not be loaded.
    #[error("{0}")]
    LoadFailure(#[from] LoadError),
}

/// Errors raised by schema loading and structural validation.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// The schema file is unreadable or is not a valid schema document.
    #[error("failed to load schema {path}: {reason}")]
    SchemaLoadFailure {
        /// Path of the schema file.
        path: String,
        /// Human-readable reason for the failure.
        reason: String,
    },

    /// The document does not conform to the schema.
    #[error("validation failed: {}", .messages.join("; "))]
    ValidationFailure {
        /// Messages in order of discovery.
        messages: Vec<String>,
    },
}

impl SchemaError {
    /// Messages carried by a validation failure; empty for load failures.
    pub fn messages(&self) -> &[String] {
        match self {
            SchemaError::ValidationFailure { messages } => messages,
            SchemaError::SchemaLoadFailure { .. } => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_error_cycle_names_path() {
        let err = ResolveError::IncludeCycle {
            path: "/etc/app/a.yaml".to_string(),
        };
        let msg = format!("{err}");
        assert!(msg.contains("include cycle detected"));
        assert!(msg.contains("/etc/app/a.yaml"));
    }

    #[test]
    fn resolve_error_not_found_names_path() {
        let err = ResolveError::IncludeNotFound {
            path: "/srv/conf/missing.yaml".to_string(),
        };
        assert!(format!("{err}").contains("/srv/conf/missing.yaml"));
    }

    #[test]
    fn resolve_error_malformed_include_mentions_scalar() {
        let err = ResolveError::MalformedInclude {
            found: "mapping",
            base_dir: "/srv".to_string(),
        };
        let msg = format!("{err}");
        assert!(msg.contains("scalar filename"));
        assert!(msg.contains("mapping"));
    }

    #[test]
    fn resolve_error_wraps_load_error() {
        let inner = LoadError::Parse {
            path: "x.yaml".to_string(),
            reason: "did not find expected key".to_string(),
        };
        let err: ResolveError = inner.into();
        assert!(matches!(err, ResolveError::LoadFailure(_)));
        assert!(format!("{err}").contains("x.yaml"));
    }

    #[test]
    fn load_error_read_display() {
        let err = LoadError::Read {
            path: "nope.yaml".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        };
        let msg = format!("{err}");
        assert!(msg.contains("nope.yaml"));
        assert!(msg.contains("no such file"));
    }

    #[test]
    fn load_error_multiple_documents_display() {
        let err = LoadError::MultipleDocuments {
            path: "multi.yaml".to_string(),
            count: 3,
        };
        assert!(format!("{err}").contains("3 documents"));
    }

    #[test]
    fn schema_error_validation_joins_messages() {
        let err = SchemaError::ValidationFailure {
            messages: vec![
                "Expected object type".to_string(),
                "Missing required property: name".to_string(),
            ],
        };
        let msg = format!("{err}");
        assert!(msg.contains("Expected object type; Missing required property: name"));
        assert_eq!(err.messages().len(), 2);
    }

    #[test]
    fn schema_error_load_failure_has_no_messages() {
        let err = SchemaError::SchemaLoadFailure {
            path: "schema.json".to_string(),
            reason: "expected value at line 1".to_string(),
        };
        assert!(err.messages().is_empty());
        assert!(format!("{err}").contains("schema.json"));
    }

    #[test]
    fn yconf_error_from_each_stage() {
        let e1: YconfError = ResolveError::EmptyConfigPath.into();
        let e2: YconfError = SchemaError::ValidationFailure { messages: vec![] }.into();
        let e3: YconfError = LoadError::MultipleDocuments {
            path: "a".to_string(),
            count: 2,
        }
        .into();
        assert!(format!("{e1}").contains("empty config path"));
        assert!(format!("{e2}").starts_with("schema error"));
        assert!(format!("{e3}").starts_with("load error"));
    }
}
