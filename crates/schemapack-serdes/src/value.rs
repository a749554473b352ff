use bytes::Bytes;
use schemapack_registry::schema::{
    BOOLEAN_SCHEMA, BYTES_SCHEMA, DOUBLE_SCHEMA, LONG_SCHEMA, NULL_SCHEMA, STRING_SCHEMA,
};

use crate::error::{Result, SerdesError};

/// Whether a structured value conforms to a fixed, pre-registered shape.
///
/// `Specific` values are encoded/decoded against the schema strictly;
/// `Generic` values are schema-driven but unchecked. Chosen by the
/// producer on encode and by the consumer (as a target hint) on decode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Shape {
    /// The value declares conformance to the schema.
    Specific,
    /// Schema-driven, shape not asserted.
    #[default]
    Generic,
}

/// A structured in-memory value handed to the structured codec.
#[derive(Debug, Clone, PartialEq)]
pub struct StructuredValue {
    /// Schema text this value carries. `None` means the schema is derived
    /// from the data, which only works for primitive data.
    pub schema: Option<String>,
    /// Declared shape conformance.
    pub shape: Shape,
    /// The data itself.
    pub data: serde_json::Value,
}

impl StructuredValue {
    /// A value declaring conformance to `schema`.
    pub fn specific(schema: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            schema: Some(schema.into()),
            shape: Shape::Specific,
            data,
        }
    }

    /// A schema-carrying value without a shape assertion.
    pub fn generic(schema: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            schema: Some(schema.into()),
            shape: Shape::Generic,
            data,
        }
    }

    /// A value whose schema must be derived from the data.
    pub fn schemaless(data: serde_json::Value) -> Self {
        Self {
            schema: None,
            shape: Shape::Generic,
            data,
        }
    }
}

/// A typed payload accepted by the serializer.
///
/// Closed enumeration: the payload strategy is picked by variant, never
/// by inspecting runtime types.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Raw byte sequence, transferred unmodified.
    Bytes(Bytes),
    /// Text, transferred as its UTF-8 encoding.
    Text(String),
    /// Structured value, transferred through the structured codec.
    Structured(StructuredValue),
}

impl Value {
    /// A raw bytes value.
    pub fn bytes(bytes: impl Into<Bytes>) -> Self {
        Value::Bytes(bytes.into())
    }

    /// A text value.
    pub fn text(text: impl Into<String>) -> Self {
        Value::Text(text.into())
    }
}

impl From<StructuredValue> for Value {
    fn from(value: StructuredValue) -> Self {
        Value::Structured(value)
    }
}

/// Compute the schema text for a value.
///
/// Deterministic in the value's shape: byte and text values map to their
/// canonical primitive schemas; structured values carry their own schema
/// or, for primitive data, derive a canonical one. Schemaless composite
/// data has no policy and fails with `UnsupportedValueType`.
pub fn schema_text_for(value: &Value) -> Result<String> {
    match value {
        Value::Bytes(_) => Ok(BYTES_SCHEMA.to_string()),
        Value::Text(_) => Ok(STRING_SCHEMA.to_string()),
        Value::Structured(structured) => match &structured.schema {
            Some(schema) => Ok(schema.clone()),
            None => derive_primitive_schema(&structured.data),
        },
    }
}

fn derive_primitive_schema(data: &serde_json::Value) -> Result<String> {
    use serde_json::Value as Json;

    match data {
        Json::Null => Ok(NULL_SCHEMA.to_string()),
        Json::Bool(_) => Ok(BOOLEAN_SCHEMA.to_string()),
        Json::Number(n) if n.is_i64() || n.is_u64() => Ok(LONG_SCHEMA.to_string()),
        Json::Number(_) => Ok(DOUBLE_SCHEMA.to_string()),
        Json::String(_) | Json::Array(_) | Json::Object(_) => {
            Err(SerdesError::UnsupportedValueType(format!(
                "schemaless structured value of kind {}",
                json_kind(data)
            )))
        }
    }
}

fn json_kind(data: &serde_json::Value) -> &'static str {
    use serde_json::Value as Json;

    match data {
        Json::Null => "null",
        Json::Bool(_) => "boolean",
        Json::Number(_) => "number",
        Json::String(_) => "string",
        Json::Array(_) => "array",
        Json::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn bytes_and_text_map_to_canonical_schemas() {
        assert_eq!(
            schema_text_for(&Value::bytes(vec![1u8, 2, 3])).unwrap(),
            BYTES_SCHEMA
        );
        assert_eq!(schema_text_for(&Value::text("hello")).unwrap(), STRING_SCHEMA);
    }

    #[test]
    fn structured_value_carries_its_schema() {
        let schema = r#"{"type":"object"}"#;
        let value = Value::from(StructuredValue::specific(schema, json!({"id": 1})));
        assert_eq!(schema_text_for(&value).unwrap(), schema);
    }

    #[test]
    fn schemaless_primitives_derive_canonical_schemas() {
        let cases = [
            (json!(null), NULL_SCHEMA),
            (json!(true), BOOLEAN_SCHEMA),
            (json!(42), LONG_SCHEMA),
            (json!(2.5), DOUBLE_SCHEMA),
        ];
        for (data, expected) in cases {
            let value = Value::from(StructuredValue::schemaless(data));
            assert_eq!(schema_text_for(&value).unwrap(), expected);
        }
    }

    #[test]
    fn schemaless_composites_are_unsupported() {
        for data in [json!({"a": 1}), json!([1, 2]), json!("stray")] {
            let value = Value::from(StructuredValue::schemaless(data));
            let err = schema_text_for(&value).unwrap_err();
            assert!(matches!(err, SerdesError::UnsupportedValueType(_)));
        }
    }

    #[test]
    fn shape_defaults_to_generic() {
        assert_eq!(Shape::default(), Shape::Generic);
        assert_eq!(
            StructuredValue::schemaless(json!(null)).shape,
            Shape::Generic
        );
    }
}
