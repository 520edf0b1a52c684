//! # Schema Model
//!
//! Typed view of a JSON schema document, limited to the keywords yconf
//! enforces:
//!
//! - `type`: one of `object`, `array`, `string`, `number`. Any other name
//!   is kept as [`SchemaType::Other`] and imposes no constraint.
//! - `properties`: nested schemas, kept in **declaration order** so that
//!   validation reports mismatches in the order the schema author wrote them.
//! - `required`: property names that must be present.
//!
//! ## Loading
//!
//! [`Schema::load`] reads the file with `serde_json`, checks the raw value
//! against a meta-schema with `jsonschema`, and only then deserializes it.
//! Every failure on this path is a [`SchemaError::SchemaLoadFailure`].

use std::fmt;
use std::path::Path;

use serde::de::{Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use serde_json::{json, Value};

use yconf_core::SchemaError;

/// The `type` keyword.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum SchemaType {
    /// Requires a mapping.
    Object,
    /// Requires a sequence.
    Array,
    /// Requires a scalar.
    String,
    /// Requires a scalar. Numeric format is not checked.
    Number,
    /// Unrecognized type name.
    Other(String),
}

impl SchemaType {
    pub fn as_str(&self) -> &str {
        match self {
            SchemaType::Object => "object",
            SchemaType::Array => "array",
            SchemaType::String => "string",
            SchemaType::Number => "number",
            SchemaType::Other(name) => name,
        }
    }
}

impl From<String> for SchemaType {
    fn from(name: String) -> Self {
        match name.as_str() {
            "object" => SchemaType::Object,
            "array" => SchemaType::Array,
            "string" => SchemaType::String,
            "number" => SchemaType::Number,
            _ => SchemaType::Other(name),
        }
    }
}

impl fmt::Display for SchemaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A schema node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Schema {
    /// Expected node kind.
    #[serde(rename = "type", default)]
    pub schema_type: Option<SchemaType>,

    /// Declared properties, in declaration order.
    #[serde(default, deserialize_with = "ordered_properties")]
    pub properties: Option<Vec<(String, Schema)>>,

    /// Names of required properties.
    #[serde(default)]
    pub required: Vec<String>,
}

impl Schema {
    /// A schema with only a `type`.
    pub fn of_type(schema_type: SchemaType) -> Self {
        Self {
            schema_type: Some(schema_type),
            ..Self::default()
        }
    }

    /// Append a declared property.
    pub fn property(mut self, name: impl Into<String>, schema: Schema) -> Self {
        self.properties
            .get_or_insert_with(Vec::new)
            .push((name.into(), schema));
        self
    }

    /// Mark `name` as required.
    pub fn require(mut self, name: impl Into<String>) -> Self {
        self.required.push(name.into());
        self
    }

    pub fn is_required(&self, name: &str) -> bool {
        self.required.iter().any(|r| r == name)
    }

    /// Look up a declared property schema.
    pub fn get_property(&self, name: &str) -> Option<&Schema> {
        self.properties
            .as_ref()?
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, s)| s)
    }

    /// Load a schema from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::SchemaLoadFailure`] if the file cannot be
    /// read, is not JSON, or is not a well-formed schema.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SchemaError> {
        let path = path.as_ref();
        let origin = path.display().to_string();
        let text = std::fs::read_to_string(path).map_err(|e| SchemaError::SchemaLoadFailure {
            path: origin.clone(),
            reason: format!("cannot read file: {e}"),
        })?;
        Self::from_json_str(&text, &origin)
    }

    /// Parse a schema from JSON text. `origin` names the source in errors.
    pub fn from_json_str(text: &str, origin: &str) -> Result<Self, SchemaError> {
        let value: Value = serde_json::from_str(text).map_err(|e| SchemaError::SchemaLoadFailure {
            path: origin.to_string(),
            reason: format!("invalid JSON: {e}"),
        })?;
        Self::from_value(&value, origin)
    }

    /// Build a schema from an already parsed JSON value.
    pub fn from_value(value: &Value, origin: &str) -> Result<Self, SchemaError> {
        check_shape(value, origin)?;
        Schema::deserialize(value).map_err(|e| SchemaError::SchemaLoadFailure {
            path: origin.to_string(),
            reason: e.to_string(),
        })
    }
}

/// The shape every schema node must have. `properties` values recurse.
fn meta_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "type": { "type": "string" },
            "properties": {
                "type": "object",
                "additionalProperties": { "$ref": "#" }
            },
            "required": {
                "type": "array",
                "items": { "type": "string" }
            }
        }
    })
}

fn check_shape(value: &Value, origin: &str) -> Result<(), SchemaError> {
    let validator = jsonschema::options()
        .with_draft(jsonschema::Draft::Draft202012)
        .build(&meta_schema())
        .map_err(|e| SchemaError::SchemaLoadFailure {
            path: origin.to_string(),
            reason: format!("meta-schema did not compile: {e}"),
        })?;

    let problems: Vec<String> = validator
        .iter_errors(value)
        .map(|e| {
            let at = e.instance_path.to_string();
            if at.is_empty() {
                format!("(root): {e}")
            } else {
                format!("{at}: {e}")
            }
        })
        .collect();

    if problems.is_empty() {
        Ok(())
    } else {
        Err(SchemaError::SchemaLoadFailure {
            path: origin.to_string(),
            reason: problems.join("; "),
        })
    }
}

/// Deserialize `properties` into a list, keeping the order in which the
/// input yields entries.
fn ordered_properties<'de, D>(deserializer: D) -> Result<Option<Vec<(String, Schema)>>, D::Error>
where
    D: Deserializer<'de>,
{
    struct PropertiesVisitor;

    impl<'de> Visitor<'de> for PropertiesVisitor {
        type Value = Vec<(String, Schema)>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a map of property names to schemas")
        }

        fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut properties = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some((name, schema)) = map.next_entry::<String, Schema>()? {
                properties.push((name, schema));
            }
            Ok(properties)
        }
    }

    deserializer.deserialize_map(PropertiesVisitor).map(Some)
}
