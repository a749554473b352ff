use std::io::Read;

use bytes::Bytes;
use schemapack_envelope::{decode_header, EnvelopeReader, HEADER_SIZE, PROTOCOL_MARKER};
use schemapack_registry::schema::{schema_kind, SchemaKind};
use schemapack_registry::{SchemaRegistryClient, SchemaResolver};
use tracing::debug;

use crate::codec::StructuredCodec;
use crate::error::{Result, SerdesError};
use crate::value::{Shape, StructuredValue, Value};

/// Generic deserializer: envelope decoding plus cache-first schema
/// resolution.
///
/// Owns a [`SchemaResolver`] (and through it the registry client handle
/// and schema cache). The handle is released with
/// [`close`](Deserializer::close).
pub struct Deserializer<R, C> {
    resolver: SchemaResolver<R>,
    codec: C,
    marker: u8,
}

impl<R: SchemaRegistryClient, C: StructuredCodec> Deserializer<R, C> {
    /// Create a deserializer with its own schema cache.
    pub fn new(client: R, codec: C) -> Self {
        Self::with_resolver(SchemaResolver::new(client), codec)
    }

    /// Create a deserializer over an existing resolver (shared cache).
    pub fn with_resolver(resolver: SchemaResolver<R>, codec: C) -> Self {
        Self {
            resolver,
            codec,
            marker: PROTOCOL_MARKER,
        }
    }

    /// Create a deserializer accepting an explicit protocol marker,
    /// matching [`Serializer::with_marker`](crate::Serializer::with_marker).
    pub fn with_marker(client: R, codec: C, marker: u8) -> Self {
        Self {
            resolver: SchemaResolver::new(client),
            codec,
            marker,
        }
    }

    /// Deserialize a byte sequence produced by a serializer.
    ///
    /// `shape` is the caller's target-shape hint for structured payloads;
    /// primitive payloads ignore it. Fails with `UnsupportedProtocol` on
    /// a marker this version does not read, before touching anything
    /// else.
    pub fn deserialize(&self, bytes: &[u8], shape: Shape) -> Result<Value> {
        let (marker, schema_ref) = decode_header(bytes)?;
        if marker != self.marker {
            return Err(SerdesError::UnsupportedProtocol { marker });
        }

        let schema_text = self
            .resolver
            .resolve(schema_ref)
            .map_err(SerdesError::Resolution)?;
        debug!(%schema_ref, "deserializing under resolved schema");

        self.decode_payload(&bytes[HEADER_SIZE..], &schema_text, shape)
    }

    /// Deserialize one envelope from a `Read` stream.
    pub fn deserialize_from(&self, source: impl Read, shape: Shape) -> Result<Value> {
        let mut reader = EnvelopeReader::new(source);
        let envelope = reader.read_envelope()?;
        if envelope.marker != self.marker {
            return Err(SerdesError::UnsupportedProtocol {
                marker: envelope.marker,
            });
        }

        let schema_text = self
            .resolver
            .resolve(envelope.schema_ref)
            .map_err(SerdesError::Resolution)?;

        self.decode_payload(&envelope.payload, &schema_text, shape)
    }

    fn decode_payload(&self, payload: &[u8], schema_text: &str, shape: Shape) -> Result<Value> {
        match schema_kind(schema_text) {
            SchemaKind::Bytes => Ok(Value::Bytes(Bytes::copy_from_slice(payload))),
            SchemaKind::Text => String::from_utf8(payload.to_vec())
                .map(Value::Text)
                .map_err(|err| SerdesError::Decoding(Box::new(err))),
            SchemaKind::Structured => {
                let data = self
                    .codec
                    .decode(payload, schema_text, shape)
                    .map_err(SerdesError::Decoding)?;
                Ok(Value::Structured(StructuredValue {
                    schema: Some(schema_text.to_string()),
                    shape,
                    data,
                }))
            }
        }
    }

    /// The resolver backing this deserializer.
    pub fn resolver(&self) -> &SchemaResolver<R> {
        &self.resolver
    }

    /// Release the registry client handle.
    pub fn close(self) -> schemapack_registry::Result<()> {
        self.resolver.close()
    }
}

#[cfg(test)]
mod tests {
    use bytes::BytesMut;
    use schemapack_envelope::{encode_envelope, EnvelopeError, SchemaRef};
    use schemapack_registry::{InMemoryRegistry, RegistryError, SchemaMetadata};
    use serde_json::json;
    use std::sync::Arc;

    use super::*;
    use crate::codec::JsonStructuredCodec;
    use crate::serializer::Serializer;

    fn shared_pair() -> (
        Serializer<Arc<InMemoryRegistry>, JsonStructuredCodec>,
        Deserializer<Arc<InMemoryRegistry>, JsonStructuredCodec>,
    ) {
        let registry = Arc::new(InMemoryRegistry::new());
        let serializer = Serializer::new(Arc::clone(&registry), JsonStructuredCodec::new());
        let deserializer = Deserializer::new(registry, JsonStructuredCodec::new());
        (serializer, deserializer)
    }

    #[test]
    fn bytes_roundtrip() {
        let (serializer, deserializer) = shared_pair();
        let metadata = SchemaMetadata::new("raw-key");
        let value = Value::bytes(vec![0x01, 0x02, 0x03]);

        let wire = serializer.serialize(&value, &metadata).unwrap();
        let decoded = deserializer.deserialize(&wire, Shape::Generic).unwrap();

        assert_eq!(decoded, value);
    }

    #[test]
    fn text_roundtrip() {
        let (serializer, deserializer) = shared_pair();
        let metadata = SchemaMetadata::new("text-value");

        let wire = serializer
            .serialize(&Value::text("hello"), &metadata)
            .unwrap();
        let decoded = deserializer.deserialize(&wire, Shape::Generic).unwrap();

        assert_eq!(decoded, Value::text("hello"));
    }

    #[test]
    fn structured_roundtrip() {
        let (serializer, deserializer) = shared_pair();
        let metadata = SchemaMetadata::new("events");
        let schema = r#"{"type":"object","required":["id"]}"#;
        let value = Value::from(StructuredValue::specific(schema, json!({"id": 1})));

        let wire = serializer.serialize(&value, &metadata).unwrap();
        let decoded = deserializer.deserialize(&wire, Shape::Specific).unwrap();

        assert_eq!(decoded, value);
    }

    #[test]
    fn short_input_fails_without_partial_decode() {
        let (_, deserializer) = shared_pair();

        for len in 0..HEADER_SIZE {
            let bytes = vec![0u8; len];
            let err = deserializer.deserialize(&bytes, Shape::Generic).unwrap_err();
            assert!(matches!(
                err,
                SerdesError::Envelope(EnvelopeError::TruncatedHeader { .. })
            ));
        }
    }

    #[test]
    fn unknown_marker_is_rejected_before_resolution() {
        let (serializer, deserializer) = shared_pair();
        let metadata = SchemaMetadata::new("raw-key");
        let mut wire = serializer
            .serialize(&Value::bytes(vec![1]), &metadata)
            .unwrap()
            .to_vec();
        wire[0] = 0x7F;

        let err = deserializer.deserialize(&wire, Shape::Generic).unwrap_err();
        assert!(matches!(
            err,
            SerdesError::UnsupportedProtocol { marker: 0x7F }
        ));
    }

    #[test]
    fn unresolvable_reference_is_resolution_failure() {
        let (_, deserializer) = shared_pair();

        let mut wire = BytesMut::new();
        encode_envelope(PROTOCOL_MARKER, SchemaRef::new(99, 1), b"", &mut wire);

        let err = deserializer.deserialize(&wire, Shape::Generic).unwrap_err();
        assert!(matches!(
            err,
            SerdesError::Resolution(RegistryError::SchemaNotFound(_))
        ));
    }

    #[test]
    fn text_payload_with_invalid_utf8_is_decoding_failure() {
        let registry = Arc::new(InMemoryRegistry::new());
        let schema_ref = registry
            .register_schema(&SchemaMetadata::new("text-value"), "\"string\"")
            .unwrap();
        let deserializer = Deserializer::new(registry, JsonStructuredCodec::new());

        let mut wire = BytesMut::new();
        encode_envelope(PROTOCOL_MARKER, schema_ref, &[0xFF, 0xFE], &mut wire);

        let err = deserializer.deserialize(&wire, Shape::Generic).unwrap_err();
        assert!(matches!(err, SerdesError::Decoding(_)));
    }

    #[test]
    fn malformed_structured_payload_is_decoding_failure() {
        let registry = Arc::new(InMemoryRegistry::new());
        let schema_ref = registry
            .register_schema(&SchemaMetadata::new("events"), r#"{"type":"object"}"#)
            .unwrap();
        let deserializer = Deserializer::new(registry, JsonStructuredCodec::new());

        let mut wire = BytesMut::new();
        encode_envelope(PROTOCOL_MARKER, schema_ref, b"not json", &mut wire);

        let err = deserializer.deserialize(&wire, Shape::Generic).unwrap_err();
        assert!(matches!(err, SerdesError::Decoding(_)));
    }

    #[test]
    fn deserialize_from_reader() {
        let (serializer, deserializer) = shared_pair();
        let metadata = SchemaMetadata::new("raw-key");
        let value = Value::bytes(vec![4, 5, 6]);

        let mut wire = Vec::new();
        serializer
            .serialize_into(&value, &metadata, &mut wire)
            .unwrap();

        let decoded = deserializer
            .deserialize_from(std::io::Cursor::new(wire), Shape::Generic)
            .unwrap();
        assert_eq!(decoded, value);
    }

    #[test]
    fn repeated_deserialize_populates_cache_once() {
        let (serializer, deserializer) = shared_pair();
        let metadata = SchemaMetadata::new("raw-key");

        let wire = serializer
            .serialize(&Value::bytes(vec![1]), &metadata)
            .unwrap();

        deserializer.deserialize(&wire, Shape::Generic).unwrap();
        deserializer.deserialize(&wire, Shape::Generic).unwrap();
        assert_eq!(deserializer.resolver().cache().len(), 1);
    }

    #[test]
    fn alternate_marker_roundtrip() {
        let registry = Arc::new(InMemoryRegistry::new());
        let serializer =
            Serializer::with_marker(Arc::clone(&registry), JsonStructuredCodec::new(), 0x02);
        let metadata = SchemaMetadata::new("raw-key");
        let value = Value::bytes(vec![1, 2]);

        let wire = serializer.serialize(&value, &metadata).unwrap();

        // A deserializer configured for the alternate marker reads it;
        // the default one rejects it.
        let matching =
            Deserializer::with_marker(Arc::clone(&registry), JsonStructuredCodec::new(), 0x02);
        assert_eq!(matching.deserialize(&wire, Shape::Generic).unwrap(), value);

        let default = Deserializer::new(registry, JsonStructuredCodec::new());
        assert!(matches!(
            default.deserialize(&wire, Shape::Generic).unwrap_err(),
            SerdesError::UnsupportedProtocol { marker: 0x02 }
        ));
    }

    #[test]
    fn close_releases_registry_handle() {
        let registry = Arc::new(InMemoryRegistry::new());
        let deserializer = Deserializer::new(Arc::clone(&registry), JsonStructuredCodec::new());

        deserializer.close().unwrap();
        assert!(matches!(
            registry.fetch_schema(SchemaRef::new(1, 1)),
            Err(RegistryError::Closed)
        ));
    }
}
