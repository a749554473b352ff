use std::sync::Arc;

use schemapack_envelope::SchemaRef;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Compatibility policy attached to schema metadata.
///
/// Evaluation happens inside the registry when a new schema version is
/// registered; this layer only carries the declared policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Compatibility {
    /// Any schema text is accepted as a new version.
    None,
    /// New versions must be readable with old schemas.
    #[default]
    Backward,
    /// Old versions must be readable with new schemas.
    Forward,
    /// Both backward and forward.
    Full,
}

/// Metadata under which schema versions are registered.
///
/// The registry groups versions by `name`; the compatibility policy
/// governs which new texts it accepts under that name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaMetadata {
    /// Registry-wide unique name (subject) for this schema lineage.
    pub name: String,
    /// Optional human-readable description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Compatibility policy for new versions.
    #[serde(default)]
    pub compatibility: Compatibility,
}

impl SchemaMetadata {
    /// Create metadata with the default (backward) compatibility policy.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            compatibility: Compatibility::default(),
        }
    }

    /// Set the compatibility policy.
    pub fn with_compatibility(mut self, compatibility: Compatibility) -> Self {
        self.compatibility = compatibility;
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Client handle to a schema registry.
///
/// Implementations use interior mutability: one handle is opened once and
/// shared across calls and threads. A blocked call has no timeout or
/// retry at this layer; that policy belongs to the transport underneath.
pub trait SchemaRegistryClient {
    /// Register `schema_text` as a version under `metadata`.
    ///
    /// Returns the reference for the stored version. Re-registering a
    /// text already stored under the same metadata returns the existing
    /// reference without creating a new version.
    fn register_schema(&self, metadata: &SchemaMetadata, schema_text: &str) -> Result<SchemaRef>;

    /// Fetch the schema text for a previously assigned reference.
    fn fetch_schema(&self, schema_ref: SchemaRef) -> Result<String>;

    /// Release the handle. Further calls fail; closing twice is a no-op.
    fn close(&self) -> Result<()>;
}

impl<T: SchemaRegistryClient + ?Sized> SchemaRegistryClient for Arc<T> {
    fn register_schema(&self, metadata: &SchemaMetadata, schema_text: &str) -> Result<SchemaRef> {
        (**self).register_schema(metadata, schema_text)
    }

    fn fetch_schema(&self, schema_ref: SchemaRef) -> Result<String> {
        (**self).fetch_schema(schema_ref)
    }

    fn close(&self) -> Result<()> {
        (**self).close()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metadata_builder() {
        let metadata = SchemaMetadata::new("device-events")
            .with_description("telemetry event schema")
            .with_compatibility(Compatibility::None);

        assert_eq!(metadata.name, "device-events");
        assert_eq!(metadata.description.as_deref(), Some("telemetry event schema"));
        assert_eq!(metadata.compatibility, Compatibility::None);
    }

    #[test]
    fn metadata_defaults_to_backward() {
        assert_eq!(
            SchemaMetadata::new("x").compatibility,
            Compatibility::Backward
        );
    }

    #[test]
    fn compatibility_serde_names() {
        let json = serde_json::to_string(&Compatibility::Backward).unwrap();
        assert_eq!(json, r#""BACKWARD""#);
        let back: Compatibility = serde_json::from_str(r#""FULL""#).unwrap();
        assert_eq!(back, Compatibility::Full);
    }
}
