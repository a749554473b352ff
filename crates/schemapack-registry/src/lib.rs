//! Schema registry collaborator: the client interface consumed by the
//! serializer/deserializer, cache-first schema resolution, and an
//! in-memory reference registry.
//!
//! The registry service itself (storage, compatibility evaluation,
//! versioning API) lives elsewhere. This crate only defines the narrow
//! surface the serdes layer needs: register a schema text under some
//! metadata, fetch a schema text by reference, close the handle.

pub mod cache;
pub mod client;
pub mod error;
pub mod memory;
pub mod resolver;
pub mod schema;

pub use cache::SchemaCache;
pub use client::{Compatibility, SchemaMetadata, SchemaRegistryClient};
pub use error::{RegistryError, Result};
pub use memory::{InMemoryRegistry, MemoryRegistryConfig};
pub use resolver::SchemaResolver;
pub use schema::{schema_kind, SchemaKind, BYTES_SCHEMA, STRING_SCHEMA};
