//! # Structural Validation
//!
//! Walks a configuration tree and a [`Schema`] together.
//!
//! ## Rules
//!
//! - `type: object` requires a mapping, `type: array` a sequence, and
//!   `type: string` / `type: number` a scalar. Any other type name is
//!   accepted without constraint.
//! - For a mapping with declared `properties`, each property is checked in
//!   declaration order. A present and defined value is validated against its
//!   property schema. A missing property fails only if it is `required`.
//! - Undeclared properties are ignored.
//!
//! The first mismatch ends the walk. One call yields at most one message.

use std::fmt;

use tracing::debug;

use yconf_core::{Node, SchemaError};

use crate::schema::{Schema, SchemaType};

/// Message for a validation call that received no tree at all.
pub const NO_CONFIGURATION: &str = "No configuration provided";

/// Validates configuration trees against a fixed schema.
#[derive(Debug, Clone)]
pub struct SchemaValidator {
    schema: Schema,
}

impl SchemaValidator {
    pub fn new(schema: Schema) -> Self {
        Self { schema }
    }

    /// Load the schema at `path` and build a validator for it.
    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self, SchemaError> {
        Schema::load(path).map(Self::new)
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Check `node` against the schema.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::ValidationFailure`] carrying a single message
    /// describing the first mismatch found.
    pub fn validate(&self, node: &Node) -> Result<(), SchemaError> {
        if !node.is_defined() {
            return Err(failure(NO_CONFIGURATION.to_string()));
        }
        check(node, &self.schema).map_err(failure)
    }

    /// Validate several labelled trees independently and collect the results.
    pub fn validate_all<'a, L, I>(&self, documents: I) -> ValidationReport
    where
        L: Into<String>,
        I: IntoIterator<Item = (L, &'a Node)>,
    {
        let mut report = ValidationReport::default();
        for (label, node) in documents {
            report.record(label, self.validate(node));
        }
        report
    }
}

fn failure(message: String) -> SchemaError {
    SchemaError::ValidationFailure {
        messages: vec![message],
    }
}

fn check(node: &Node, schema: &Schema) -> Result<(), String> {
    if let Some(expected) = &schema.schema_type {
        let matches = match expected {
            SchemaType::Object => node.is_mapping(),
            SchemaType::Array => node.is_sequence(),
            SchemaType::String | SchemaType::Number => node.is_scalar(),
            SchemaType::Other(name) => {
                debug!(schema_type = %name, "schema type imposes no constraint");
                true
            }
        };
        if !matches {
            return Err(format!("Expected {expected} type"));
        }
    }

    let (Some(map), Some(properties)) = (node.as_mapping(), &schema.properties) else {
        return Ok(());
    };

    for (name, property) in properties {
        match map.get(name) {
            Some(value) if value.is_defined() => check(value, property)?,
            _ if schema.is_required(name) => {
                return Err(format!("Missing required property: {name}"));
            }
            _ => {}
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// One failed validation in a [`ValidationReport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationFailureEntry {
    /// Caller-supplied name of the validated tree, usually a file path.
    pub label: String,
    /// Failure messages in order of discovery.
    pub messages: Vec<String>,
}

/// Accumulated results of several independent validations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    /// Number of validations recorded.
    pub total: usize,
    /// Number that passed.
    pub passed: usize,
    /// Number that failed.
    pub failed: usize,
    /// Details for each failure, in recording order.
    pub failures: Vec<ValidationFailureEntry>,
}

impl ValidationReport {
    /// Record the outcome of one validation.
    pub fn record(&mut self, label: impl Into<String>, result: Result<(), SchemaError>) {
        self.total += 1;
        match result {
            Ok(()) => self.passed += 1,
            Err(err) => {
                self.failed += 1;
                let messages = match err {
                    SchemaError::ValidationFailure { messages } => messages,
                    other @ SchemaError::SchemaLoadFailure { .. } => vec![other.to_string()],
                };
                self.failures.push(ValidationFailureEntry {
                    label: label.into(),
                    messages,
                });
            }
        }
    }

    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    /// Every failure message across all entries, in recording order.
    pub fn messages(&self) -> impl Iterator<Item = &str> {
        self.failures
            .iter()
            .flat_map(|f| f.messages.iter().map(String::as_str))
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} validated, {} passed, {} failed",
            self.total, self.passed, self.failed
        )?;
        for failure in &self.failures {
            for message in &failure.messages {
                writeln!(f, "- {}: {}", failure.label, message)?;
            }
        }
        Ok(())
    }
}
