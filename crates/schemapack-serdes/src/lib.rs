//! Generic serializer/deserializer over a schema registry.
//!
//! The serialize path: compute the value's schema text, register it with
//! the registry (yielding a [`SchemaRef`](schemapack_envelope::SchemaRef)),
//! write the envelope header, append the payload bytes. Deserialize is
//! the mirror: read the header, resolve the reference (cache-first),
//! decode the remainder under the schema's kind.
//!
//! Payload strategy is a closed three-way dispatch — raw bytes, UTF-8
//! text, or a pluggable structured codec — selected once per call from
//! the schema, never by open-ended type inspection.

pub mod codec;
pub mod deserializer;
pub mod error;
pub mod serializer;
pub mod value;

pub use codec::{CodecError, JsonStructuredCodec, StructuredCodec};
pub use deserializer::Deserializer;
pub use error::{Result, SerdesError};
pub use serializer::Serializer;
pub use value::{schema_text_for, Shape, StructuredValue, Value};
