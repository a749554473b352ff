//! Fixed-layout binary envelope carrying a schema reference ahead of an
//! opaque payload.
//!
//! Every serialized message starts with a 13-byte header:
//! - A 1-byte protocol marker
//! - An 8-byte big-endian schema id
//! - A 4-byte big-endian schema version
//!
//! The payload follows with no length prefix — it runs to the end of the
//! enclosing message. The codec never interprets payload bytes.

pub mod codec;
pub mod error;
pub mod reader;
pub mod writer;

pub use codec::{
    decode_envelope, decode_header, encode_envelope, encode_header, Envelope, SchemaRef,
    HEADER_SIZE, PROTOCOL_MARKER,
};
pub use error::{EnvelopeError, Result};
pub use reader::EnvelopeReader;
pub use writer::EnvelopeWriter;
