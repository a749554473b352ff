use bytes::{Buf, BufMut, Bytes, BytesMut};
use serde::{Deserialize, Serialize};

use crate::error::{EnvelopeError, Result};

/// Envelope header: marker (1) + schema id (8) + version (4) = 13 bytes.
pub const HEADER_SIZE: usize = 13;

/// Protocol marker for the current header layout.
///
/// Reserved so a future alternate layout can use a different first byte
/// without breaking readers that check the marker before anything else.
pub const PROTOCOL_MARKER: u8 = 0x01;

/// Reference to one exact schema revision held by a registry.
///
/// Immutable once constructed; a given reference always resolves to the
/// same schema text and is never reused for a different one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SchemaRef {
    /// Registry-assigned schema id.
    pub id: u64,
    /// Version number under that id.
    pub version: u32,
}

impl SchemaRef {
    /// Create a new schema reference.
    pub fn new(id: u64, version: u32) -> Self {
        Self { id, version }
    }
}

impl std::fmt::Display for SchemaRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}v{}", self.id, self.version)
    }
}

/// A decoded envelope: header fields plus the opaque payload remainder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    /// Protocol marker byte. Validated by the caller, not the codec.
    pub marker: u8,
    /// Schema reference carried in the header.
    pub schema_ref: SchemaRef,
    /// Opaque payload bytes (everything after the header).
    pub payload: Bytes,
}

impl Envelope {
    /// Create a new envelope with the current protocol marker.
    pub fn new(schema_ref: SchemaRef, payload: impl Into<Bytes>) -> Self {
        Self {
            marker: PROTOCOL_MARKER,
            schema_ref,
            payload: payload.into(),
        }
    }

    /// The total wire size of this envelope (header + payload).
    pub fn wire_size(&self) -> usize {
        HEADER_SIZE + self.payload.len()
    }
}

/// Encode an envelope header into `dst`.
///
/// Wire format:
/// ```text
/// ┌─────────────┬──────────────────┬─────────────────┬──────────────────┐
/// │ Marker (1B) │ Schema id        │ Version         │ Payload          │
/// │             │ (8B BE unsigned) │ (4B BE unsigned)│ (to end of msg)  │
/// └─────────────┴──────────────────┴─────────────────┴──────────────────┘
/// ```
pub fn encode_header(marker: u8, schema_ref: SchemaRef, dst: &mut BytesMut) {
    dst.reserve(HEADER_SIZE);
    dst.put_u8(marker);
    dst.put_u64(schema_ref.id);
    dst.put_u32(schema_ref.version);
}

/// Decode an envelope header from the front of `src`.
///
/// Returns the marker as found — recognizing it is the caller's policy.
/// Fails with `TruncatedHeader` if fewer than 13 bytes are available;
/// a short header is never partially decoded.
pub fn decode_header(src: &[u8]) -> Result<(u8, SchemaRef)> {
    if src.len() < HEADER_SIZE {
        return Err(EnvelopeError::TruncatedHeader { len: src.len() });
    }

    let mut buf = src;
    let marker = buf.get_u8();
    let id = buf.get_u64();
    let version = buf.get_u32();

    Ok((marker, SchemaRef { id, version }))
}

/// Encode a complete envelope (header + payload) into `dst`.
pub fn encode_envelope(marker: u8, schema_ref: SchemaRef, payload: &[u8], dst: &mut BytesMut) {
    dst.reserve(HEADER_SIZE + payload.len());
    encode_header(marker, schema_ref, dst);
    dst.put_slice(payload);
}

/// Decode a complete envelope from a byte sequence.
///
/// The payload has no length prefix: everything after the header belongs
/// to it, including the empty remainder.
pub fn decode_envelope(src: impl Into<Bytes>) -> Result<Envelope> {
    let mut src = src.into();
    let (marker, schema_ref) = decode_header(&src)?;
    let payload = src.split_off(HEADER_SIZE);

    Ok(Envelope {
        marker,
        schema_ref,
        payload,
    })
}
