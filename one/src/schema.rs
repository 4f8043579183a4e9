//! JSON schemas for structured output.
//!
//! A [`JsonSchemaSpec`] is built from any Rust type deriving
//! [`schemars::JsonSchema`]. It drives both sides of a structured call: the
//! backend uses it to steer the model (natively for `OpenAI`, through the
//! system prompt for Anthropic), and [`parse_structured`] uses it to validate
//! and deserialize whatever text comes back.
//!
//! ```rust,ignore
//! use schemars::JsonSchema;
//! use serde::Deserialize;
//!
//! #[derive(Deserialize, JsonSchema)]
//! struct Person { name: String, age: u32 }
//!
//! let spec = JsonSchemaSpec::from_type::<Person>();
//! let person: Person = parse_structured(r#"{"name":"John","age":30}"#, &spec)?;
//! ```

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// Maximum number of schema violations reported in one validation error.
const MAX_REPORTED_VIOLATIONS: usize = 3;

/// JSON schema specification for structured outputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonSchemaSpec {
    /// Schema name.
    pub name: String,
    /// JSON Schema definition.
    pub schema: Value,
    /// Whether the provider should enforce the schema strictly.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strict: Option<bool>,
}

impl JsonSchemaSpec {
    /// Creates a strict spec from a hand-written schema.
    #[must_use]
    pub fn new(name: impl Into<String>, schema: Value) -> Self {
        Self {
            name: name.into(),
            schema,
            strict: Some(true),
        }
    }

    /// Generates the spec from a Rust type.
    ///
    /// The `$schema` meta field is dropped since the vendor APIs do not want it.
    #[must_use]
    pub fn from_type<T: schemars::JsonSchema>() -> Self {
        let mut schema = Value::from(schemars::schema_for!(T));
        if let Value::Object(ref mut map) = schema {
            map.remove("$schema");
        }
        Self::new(T::schema_name(), schema)
    }

    /// Sets strict enforcement.
    #[must_use]
    pub const fn with_strict(mut self, strict: bool) -> Self {
        self.strict = Some(strict);
        self
    }

    /// Returns `true` if strict enforcement is requested.
    #[must_use]
    pub fn is_strict(&self) -> bool {
        self.strict.unwrap_or(false)
    }

    /// Returns the schema in the shape strict structured outputs accept.
    ///
    /// Every object schema closes `additionalProperties` (unless it sets it
    /// itself) and lists all of its properties as required; optional fields
    /// stay expressible because their schemas already admit `null`.
    #[must_use]
    pub fn strict_schema(&self) -> Value {
        let mut schema = self.schema.clone();
        seal(&mut schema);
        schema
    }

    /// Builds the instruction that asks a model for JSON matching this schema.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] if the schema cannot be pretty-printed.
    pub fn to_prompt(&self) -> Result<String> {
        let pretty = serde_json::to_string_pretty(&self.schema)?;
        Ok(format!(
            "You must respond with valid JSON that matches this schema:\n{pretty}\n\n\
             Only return the JSON object, no other text."
        ))
    }

    /// Validates a JSON value against the schema.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] listing the first few violations, or if
    /// the schema itself does not compile.
    pub fn validate(&self, instance: &Value) -> Result<()> {
        let validator = jsonschema::validator_for(&self.schema)
            .map_err(|e| Error::validation(&self.name, format!("invalid JSON Schema: {e}")))?;

        if validator.is_valid(instance) {
            return Ok(());
        }

        let violations: Vec<String> = validator
            .iter_errors(instance)
            .take(MAX_REPORTED_VIOLATIONS)
            .map(|err| format!("{err} at '{}'", err.instance_path))
            .collect();
        Err(Error::validation(&self.name, violations.join("; ")))
    }
}

/// Parses model output into `T`, validating it against `spec` first.
///
/// Surrounding whitespace and a Markdown code fence around the JSON are
/// tolerated; anything else that is not the JSON object is rejected.
///
/// # Errors
///
/// Returns [`Error::Validation`] if the text is not JSON, violates the
/// schema, or cannot be deserialized into `T`.
pub fn parse_structured<T: DeserializeOwned>(text: &str, spec: &JsonSchemaSpec) -> Result<T> {
    let json = strip_code_fence(text);
    let value: Value = serde_json::from_str(json)
        .map_err(|e| Error::validation(&spec.name, format!("response is not valid JSON: {e}")))?;

    spec.validate(&value)?;

    serde_json::from_value(value).map_err(|e| Error::validation(&spec.name, e.to_string()))
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Skip the info string ("json") on the opening fence line.
    let body = match rest.split_once('\n') {
        Some((_, body)) => body,
        None => rest.trim_start_matches(|c: char| c.is_ascii_alphabetic()),
    };
    body.strip_suffix("```").unwrap_or(body).trim()
}

fn seal(schema: &mut Value) {
    let Value::Object(map) = schema else {
        return;
    };

    if let Some(Value::Object(properties)) = map.get_mut("properties") {
        properties.values_mut().for_each(seal);
    }
    for key in ["$defs", "definitions"] {
        if let Some(Value::Object(defs)) = map.get_mut(key) {
            defs.values_mut().for_each(seal);
        }
    }
    for key in ["anyOf", "oneOf", "allOf", "prefixItems"] {
        if let Some(Value::Array(variants)) = map.get_mut(key) {
            variants.iter_mut().for_each(seal);
        }
    }
    for key in ["items", "additionalProperties"] {
        if let Some(inner) = map.get_mut(key) {
            seal(inner);
        }
    }

    if is_object_schema(map) {
        let required: Vec<Value> = map
            .get("properties")
            .and_then(Value::as_object)
            .map(|props| props.keys().cloned().map(Value::String).collect())
            .unwrap_or_default();
        map.insert("required".to_owned(), Value::Array(required));
        map.entry("additionalProperties")
            .or_insert(Value::Bool(false));
    }
}

fn is_object_schema(map: &Map<String, Value>) -> bool {
    map.contains_key("properties")
        || match map.get("type") {
            Some(Value::String(t)) => t == "object",
            Some(Value::Array(types)) => types.iter().any(|t| t == "object"),
            _ => false,
        }
}
