//! Registry-backed serialization: schema references packed ahead of
//! encoded payloads.
//!
//! schemapack lets a producer serialize a typed payload together with a
//! reference to a centrally registered schema, and lets a consumer
//! recover both the schema and the decoded payload from the resulting
//! byte sequence, without re-sending the schema per message.
//!
//! # Crate Structure
//!
//! - [`envelope`] — Fixed 13-byte header codec (marker + schema id +
//!   version) around an opaque payload
//! - [`registry`] — Registry client interface, cache-first resolution,
//!   in-memory reference registry
//! - [`serdes`] — Generic serializer/deserializer and payload codec
//!   strategies
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use schemapack::registry::{InMemoryRegistry, SchemaMetadata};
//! use schemapack::serdes::{Deserializer, JsonStructuredCodec, Serializer, Shape, Value};
//!
//! let registry = Arc::new(InMemoryRegistry::new());
//! let serializer = Serializer::new(Arc::clone(&registry), JsonStructuredCodec::new());
//! let deserializer = Deserializer::new(registry, JsonStructuredCodec::new());
//!
//! let metadata = SchemaMetadata::new("greeting");
//! let wire = serializer.serialize(&Value::text("hello"), &metadata).unwrap();
//! let value = deserializer.deserialize(&wire, Shape::Generic).unwrap();
//! assert_eq!(value, Value::text("hello"));
//! ```

/// Re-export envelope types.
pub mod envelope {
    pub use schemapack_envelope::*;
}

/// Re-export registry types.
pub mod registry {
    pub use schemapack_registry::*;
}

/// Re-export serdes types.
pub mod serdes {
    pub use schemapack_serdes::*;
}
