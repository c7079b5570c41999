//! Tool input schemas and argument validation.
//!
//! Schemas are flat parameter lists: name, type, required flag,
//! description. Validation happens in the registry before any tool code
//! runs; unknown keys and type mismatches are rejected outright.

use crate::error::ToolError;
use serde_json::{Value, json};

/// Parameter types a tool may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    /// UTF-8 string.
    String,
    /// Integer (i64/u64).
    Integer,
    /// Any JSON number.
    Number,
    /// Boolean.
    Boolean,
}

impl ParamKind {
    /// Returns the JSON-facing type name.
    #[must_use]
    pub const fn type_name(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Boolean => "boolean",
        }
    }

    /// Checks whether a JSON value matches this kind.
    #[must_use]
    pub fn matches(self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Integer => value.is_i64() || value.is_u64(),
            Self::Number => value.is_number(),
            Self::Boolean => value.is_boolean(),
        }
    }
}

/// One declared parameter.
#[derive(Debug, Clone)]
pub struct ParamSpec {
    /// Parameter name.
    pub name: String,
    /// Expected type.
    pub kind: ParamKind,
    /// Whether the parameter must be present.
    pub required: bool,
    /// Human/model-facing description.
    pub description: String,
}

/// A tool's input schema: a flat list of typed parameters.
///
/// # Examples
///
/// ```
/// use dexa_rs::tools::{ParamKind, ToolSchema};
/// use serde_json::json;
///
/// let schema = ToolSchema::new()
///     .required("column", ParamKind::String, "Column to analyze")
///     .optional("bins", ParamKind::Integer, "Number of bins");
///
/// assert!(schema.validate("histogram", &json!({"column": "Glucose"})).is_ok());
/// assert!(schema.validate("histogram", &json!({"bins": 10})).is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct ToolSchema {
    params: Vec<ParamSpec>,
}

impl ToolSchema {
    /// Creates an empty schema (a tool taking no arguments).
    #[must_use]
    pub const fn new() -> Self {
        Self { params: Vec::new() }
    }

    /// Adds a required parameter.
    #[must_use]
    pub fn required(mut self, name: &str, kind: ParamKind, description: &str) -> Self {
        self.params.push(ParamSpec {
            name: name.to_string(),
            kind,
            required: true,
            description: description.to_string(),
        });
        self
    }

    /// Adds an optional parameter.
    #[must_use]
    pub fn optional(mut self, name: &str, kind: ParamKind, description: &str) -> Self {
        self.params.push(ParamSpec {
            name: name.to_string(),
            kind,
            required: false,
            description: description.to_string(),
        });
        self
    }

    /// Returns the declared parameters.
    #[must_use]
    pub fn params(&self) -> &[ParamSpec] {
        &self.params
    }

    /// Validates JSON arguments against this schema.
    ///
    /// Accepts `null` or `{}` when no parameter is required. Rejects
    /// non-object arguments, missing required parameters, unknown keys,
    /// and type mismatches.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::SchemaValidation`] describing the first
    /// mismatch found.
    pub fn validate(&self, tool: &str, args: &Value) -> Result<(), ToolError> {
        let reject = |reason: String| ToolError::SchemaValidation {
            tool: tool.to_string(),
            reason,
        };

        let map = match args {
            Value::Null => {
                if let Some(missing) = self.params.iter().find(|p| p.required) {
                    return Err(reject(format!(
                        "missing required parameter: {}",
                        missing.name
                    )));
                }
                return Ok(());
            }
            Value::Object(map) => map,
            other => {
                return Err(reject(format!(
                    "arguments must be an object, got {}",
                    json_type_name(other)
                )));
            }
        };

        for param in &self.params {
            match map.get(&param.name) {
                Some(value) => {
                    if !param.kind.matches(value) {
                        return Err(reject(format!(
                            "parameter {} must be {}, got {}",
                            param.name,
                            param.kind.type_name(),
                            json_type_name(value)
                        )));
                    }
                }
                None if param.required => {
                    return Err(reject(format!(
                        "missing required parameter: {}",
                        param.name
                    )));
                }
                None => {}
            }
        }

        for key in map.keys() {
            if !self.params.iter().any(|p| &p.name == key) {
                return Err(reject(format!("unknown parameter: {key}")));
            }
        }

        Ok(())
    }

    /// Renders the schema as a JSON object for the tool catalog.
    #[must_use]
    pub fn to_json(&self) -> Value {
        let properties: serde_json::Map<String, Value> = self
            .params
            .iter()
            .map(|p| {
                (
                    p.name.clone(),
                    json!({
                        "type": p.kind.type_name(),
                        "description": p.description,
                    }),
                )
            })
            .collect();

        let required: Vec<&str> = self
            .params
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name.as_str())
            .collect();

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }
}

/// Returns a short name for a JSON value's type.
fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
