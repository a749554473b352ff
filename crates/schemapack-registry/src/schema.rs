//! Schema-language policy.
//!
//! A schema text is a JSON document. Primitive schemas are canonical JSON
//! strings naming the primitive type; structured schemas are JSON Schema
//! documents. The kind derived from a text decides how payload bytes are
//! produced and consumed.

use serde_json::Value;

use crate::error::{RegistryError, Result};

/// Canonical schema text for raw byte-sequence payloads.
pub const BYTES_SCHEMA: &str = "\"bytes\"";

/// Canonical schema text for UTF-8 text payloads.
pub const STRING_SCHEMA: &str = "\"string\"";

/// Canonical schema text for boolean values.
pub const BOOLEAN_SCHEMA: &str = "\"boolean\"";

/// Canonical schema text for 64-bit integer values.
pub const LONG_SCHEMA: &str = "\"long\"";

/// Canonical schema text for double-precision float values.
pub const DOUBLE_SCHEMA: &str = "\"double\"";

/// Canonical schema text for null values.
pub const NULL_SCHEMA: &str = "\"null\"";

const PRIMITIVE_NAMES: [&str; 6] = ["bytes", "string", "boolean", "long", "double", "null"];

/// The payload strategy a schema selects.
///
/// Decided once per serialize/deserialize call; strategies are never
/// mixed within one call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaKind {
    /// Payload bytes are the value's raw bytes, unmodified.
    Bytes,
    /// Payload bytes are the UTF-8 encoding of the text value.
    Text,
    /// Payload bytes come from the structured codec, driven by the schema.
    Structured,
}

/// Derive the payload kind from a schema text.
///
/// Only the two byte/text canonical primitives bypass the structured
/// codec; every other schema (remaining primitives included) is handled
/// by it.
pub fn schema_kind(schema_text: &str) -> SchemaKind {
    match schema_text.trim() {
        t if t == BYTES_SCHEMA => SchemaKind::Bytes,
        t if t == STRING_SCHEMA => SchemaKind::Text,
        _ => SchemaKind::Structured,
    }
}

/// Validate a schema text.
///
/// A valid text is either a canonical primitive name or a JSON Schema
/// document that compiles. Anything else is `InvalidSchema`.
pub fn validate_schema_text(schema_text: &str) -> Result<()> {
    let value: Value = serde_json::from_str(schema_text)
        .map_err(|err| RegistryError::InvalidSchema(format!("not valid JSON: {err}")))?;

    match &value {
        Value::String(name) => {
            if PRIMITIVE_NAMES.contains(&name.as_str()) {
                Ok(())
            } else {
                Err(RegistryError::InvalidSchema(format!(
                    "unknown primitive schema \"{name}\""
                )))
            }
        }
        _ => {
            jsonschema::validator_for(&value)
                .map_err(|err| RegistryError::InvalidSchema(err.to_string()))?;
            Ok(())
        }
    }
}
