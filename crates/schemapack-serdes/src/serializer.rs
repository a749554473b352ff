use std::io::Write;

use bytes::{BufMut, Bytes, BytesMut};
use schemapack_envelope::{encode_header, EnvelopeWriter, PROTOCOL_MARKER};
use schemapack_registry::{SchemaMetadata, SchemaRegistryClient};
use tracing::debug;

use crate::codec::StructuredCodec;
use crate::error::{Result, SerdesError};
use crate::value::{schema_text_for, Value};

/// Generic serializer: registry registration plus envelope encoding.
///
/// Owns the registry client handle it was configured with; the handle is
/// reused across calls and released with [`close`](Serializer::close).
pub struct Serializer<R, C> {
    registry: R,
    codec: C,
    marker: u8,
}

impl<R: SchemaRegistryClient, C: StructuredCodec> Serializer<R, C> {
    /// Create a serializer writing the current protocol marker.
    pub fn new(registry: R, codec: C) -> Self {
        Self::with_marker(registry, codec, PROTOCOL_MARKER)
    }

    /// Create a serializer writing an explicit protocol marker.
    pub fn with_marker(registry: R, codec: C, marker: u8) -> Self {
        Self {
            registry,
            codec,
            marker,
        }
    }

    /// Serialize a value under the given schema metadata.
    ///
    /// Registers the value's schema text with the registry (a no-op when
    /// the text is already the stored version) and packs the returned
    /// reference ahead of the payload bytes. A registration rejected by
    /// the registry surfaces as [`SerdesError::Registration`] and
    /// produces no output bytes.
    pub fn serialize(&self, value: &Value, metadata: &SchemaMetadata) -> Result<Bytes> {
        let schema_text = schema_text_for(value)?;
        let schema_ref = self
            .registry
            .register_schema(metadata, &schema_text)
            .map_err(SerdesError::Registration)?;
        debug!(%schema_ref, name = %metadata.name, "serializing under schema reference");

        let mut buf = BytesMut::new();
        encode_header(self.marker, schema_ref, &mut buf);
        self.encode_payload(value, &schema_text, &mut buf)?;
        Ok(buf.freeze())
    }

    /// Serialize a value directly into a `Write` stream.
    pub fn serialize_into(
        &self,
        value: &Value,
        metadata: &SchemaMetadata,
        sink: impl Write,
    ) -> Result<()> {
        let schema_text = schema_text_for(value)?;
        let schema_ref = self
            .registry
            .register_schema(metadata, &schema_text)
            .map_err(SerdesError::Registration)?;

        let mut buf = BytesMut::new();
        self.encode_payload(value, &schema_text, &mut buf)?;

        let mut writer = EnvelopeWriter::new(sink);
        writer.send(self.marker, schema_ref, &buf)?;
        Ok(())
    }

    fn encode_payload(&self, value: &Value, schema_text: &str, buf: &mut BytesMut) -> Result<()> {
        match value {
            // Raw bytes and text are already in final form; no codec framing.
            Value::Bytes(bytes) => buf.put_slice(bytes),
            Value::Text(text) => buf.put_slice(text.as_bytes()),
            Value::Structured(structured) => {
                let mut sink = Vec::new();
                self.codec
                    .encode(&structured.data, schema_text, structured.shape, &mut sink)
                    .map_err(SerdesError::Encoding)?;
                buf.put_slice(&sink);
            }
        }
        Ok(())
    }

    /// Borrow the registry client handle.
    pub fn registry(&self) -> &R {
        &self.registry
    }

    /// Release the registry client handle.
    ///
    /// Safe to call after failed serialize calls; the handle is released
    /// regardless of prior errors.
    pub fn close(self) -> schemapack_registry::Result<()> {
        self.registry.close()
    }
}
