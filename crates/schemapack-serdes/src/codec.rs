use serde_json::Value as Json;

use crate::value::Shape;

/// Boxed error produced by a structured payload codec.
pub type CodecError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// External structured payload codec.
///
/// Converts a structured in-memory value to/from payload bytes, driven
/// by a schema text. The serializer/deserializer selects the shape
/// strategy; the codec executes it. Errors are wrapped by the caller as
/// encoding/decoding failures and are non-retriable.
pub trait StructuredCodec {
    /// Encode `data` under `schema_text`, appending payload bytes to `sink`.
    fn encode(
        &self,
        data: &Json,
        schema_text: &str,
        shape: Shape,
        sink: &mut Vec<u8>,
    ) -> std::result::Result<(), CodecError>;

    /// Decode payload bytes under `schema_text` into a structured value.
    fn decode(
        &self,
        payload: &[u8],
        schema_text: &str,
        shape: Shape,
    ) -> std::result::Result<Json, CodecError>;
}

/// JSON-backed structured codec.
///
/// Payload bytes are compact JSON. Under [`Shape::Specific`] the data is
/// checked against the schema (compiled JSON Schema for document
/// schemas, a type check for canonical primitive schemas) on both encode
/// and decode; [`Shape::Generic`] skips the check.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonStructuredCodec;

impl JsonStructuredCodec {
    /// Create the codec.
    pub fn new() -> Self {
        Self
    }

    fn check_conformance(schema_text: &str, data: &Json) -> std::result::Result<(), CodecError> {
        let schema: Json = serde_json::from_str(schema_text)?;

        match &schema {
            Json::String(primitive) => check_primitive(primitive, data),
            _ => {
                let validator = jsonschema::validator_for(&schema)
                    .map_err(|err| CodecError::from(err.to_string()))?;

                let mut errors = validator.iter_errors(data);
                if let Some(first) = errors.next() {
                    let mut message = first.to_string();
                    for err in errors.take(3) {
                        message.push_str("; ");
                        message.push_str(&err.to_string());
                    }
                    return Err(CodecError::from(message));
                }
                Ok(())
            }
        }
    }
}

fn check_primitive(primitive: &str, data: &Json) -> std::result::Result<(), CodecError> {
    let conforms = match primitive {
        "null" => data.is_null(),
        "boolean" => data.is_boolean(),
        "long" => data.as_i64().is_some() || data.as_u64().is_some(),
        "double" => data.is_number(),
        _ => false,
    };

    if conforms {
        Ok(())
    } else {
        Err(CodecError::from(format!(
            "value does not conform to primitive schema \"{primitive}\""
        )))
    }
}

impl StructuredCodec for JsonStructuredCodec {
    fn encode(
        &self,
        data: &Json,
        schema_text: &str,
        shape: Shape,
        sink: &mut Vec<u8>,
    ) -> std::result::Result<(), CodecError> {
        if shape == Shape::Specific {
            Self::check_conformance(schema_text, data)?;
        }
        serde_json::to_writer(&mut *sink, data)?;
        Ok(())
    }

    fn decode(
        &self,
        payload: &[u8],
        schema_text: &str,
        shape: Shape,
    ) -> std::result::Result<Json, CodecError> {
        let data: Json = serde_json::from_slice(payload)?;
        if shape == Shape::Specific {
            Self::check_conformance(schema_text, &data)?;
        }
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    const RECORD_SCHEMA: &str = r#"{
        "type": "object",
        "properties": {
            "id": { "type": "integer" },
            "name": { "type": "string" }
        },
        "required": ["id", "name"]
    }"#;

    #[test]
    fn generic_roundtrip() {
        let codec = JsonStructuredCodec::new();
        let data = json!({"id": 1, "name": "a"});

        let mut payload = Vec::new();
        codec
            .encode(&data, RECORD_SCHEMA, Shape::Generic, &mut payload)
            .unwrap();
        let decoded = codec
            .decode(&payload, RECORD_SCHEMA, Shape::Generic)
            .unwrap();

        assert_eq!(decoded, data);
    }

    #[test]
    fn specific_encode_checks_schema() {
        let codec = JsonStructuredCodec::new();
        let bad = json!({"id": "not-an-integer", "name": "a"});

        let mut payload = Vec::new();
        let err = codec.encode(&bad, RECORD_SCHEMA, Shape::Specific, &mut payload);
        assert!(err.is_err());
        assert!(payload.is_empty());
    }

    #[test]
    fn generic_encode_skips_schema_check() {
        let codec = JsonStructuredCodec::new();
        let bad = json!({"id": "not-an-integer"});

        let mut payload = Vec::new();
        codec
            .encode(&bad, RECORD_SCHEMA, Shape::Generic, &mut payload)
            .unwrap();
        assert!(!payload.is_empty());
    }

    #[test]
    fn specific_decode_checks_schema() {
        let codec = JsonStructuredCodec::new();
        let payload = serde_json::to_vec(&json!({"wrong": true})).unwrap();

        let err = codec.decode(&payload, RECORD_SCHEMA, Shape::Specific);
        assert!(err.is_err());
    }

    #[test]
    fn decode_rejects_non_json_payload() {
        let codec = JsonStructuredCodec::new();
        let err = codec.decode(b"\xFF\xFE", RECORD_SCHEMA, Shape::Generic);
        assert!(err.is_err());
    }

    #[test]
    fn primitive_schema_conformance() {
        let codec = JsonStructuredCodec::new();

        let mut payload = Vec::new();
        codec
            .encode(&json!(42), "\"long\"", Shape::Specific, &mut payload)
            .unwrap();
        assert_eq!(
            codec.decode(&payload, "\"long\"", Shape::Specific).unwrap(),
            json!(42)
        );

        let mut payload = Vec::new();
        let err = codec.encode(&json!("nope"), "\"long\"", Shape::Specific, &mut payload);
        assert!(err.is_err());
    }

    #[test]
    fn double_accepts_integral_numbers() {
        let codec = JsonStructuredCodec::new();
        let mut payload = Vec::new();
        codec
            .encode(&json!(3), "\"double\"", Shape::Specific, &mut payload)
            .unwrap();
    }
}
