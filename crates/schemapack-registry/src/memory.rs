use std::collections::HashMap;
use std::sync::Mutex;

use schemapack_envelope::SchemaRef;
use tracing::debug;

use crate::client::{Compatibility, SchemaMetadata, SchemaRegistryClient};
use crate::error::{RegistryError, Result};
use crate::schema::validate_schema_text;

/// Controls in-memory registry behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryRegistryConfig {
    /// When true, registering under an unknown metadata name creates it.
    /// When false, such a registration fails with `MetadataNotFound`.
    pub auto_register_metadata: bool,
    /// Maximum bytes allowed per schema text.
    pub max_schema_text_size: usize,
}

impl Default for MemoryRegistryConfig {
    fn default() -> Self {
        Self {
            auto_register_metadata: true,
            max_schema_text_size: 256 * 1024,
        }
    }
}

/// One schema lineage: metadata plus its ordered versions.
struct Lineage {
    metadata: SchemaMetadata,
    /// Version `n` is stored at index `n - 1`.
    versions: Vec<String>,
}

struct State {
    closed: bool,
    next_id: u64,
    ids_by_name: HashMap<String, u64>,
    lineages: HashMap<u64, Lineage>,
}

/// In-memory schema registry.
///
/// Reference implementation of [`SchemaRegistryClient`] for tests and for
/// embedders that do not run a remote registry. Versions are grouped by
/// metadata name; ids are assigned per name, versions start at 1.
///
/// This registry ships no compatibility evaluator. Under
/// [`Compatibility::None`] any valid text becomes a new version; under
/// every other policy a changed text is rejected as incompatible, while
/// re-registering the current text is an idempotent no-op.
pub struct InMemoryRegistry {
    state: Mutex<State>,
    config: MemoryRegistryConfig,
}

impl InMemoryRegistry {
    /// Create an empty registry with default config.
    pub fn new() -> Self {
        Self::with_config(MemoryRegistryConfig::default())
    }

    /// Create an empty registry with explicit config.
    pub fn with_config(config: MemoryRegistryConfig) -> Self {
        Self {
            state: Mutex::new(State {
                closed: false,
                next_id: 1,
                ids_by_name: HashMap::new(),
                lineages: HashMap::new(),
            }),
            config,
        }
    }

    /// Pre-register metadata without adding a version.
    ///
    /// Useful with `auto_register_metadata` disabled, where only known
    /// names may receive versions.
    pub fn register_metadata(&self, metadata: &SchemaMetadata) -> Result<u64> {
        let mut state = self.lock()?;
        Ok(Self::metadata_id(&mut state, metadata))
    }

    /// Registry configuration.
    pub fn config(&self) -> &MemoryRegistryConfig {
        &self.config
    }

    /// Number of versions stored under a metadata name.
    pub fn version_count(&self, name: &str) -> usize {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state
            .ids_by_name
            .get(name)
            .and_then(|id| state.lineages.get(id))
            .map(|lineage| lineage.versions.len())
            .unwrap_or(0)
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, State>> {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if state.closed {
            return Err(RegistryError::Closed);
        }
        Ok(state)
    }

    fn metadata_id(state: &mut State, metadata: &SchemaMetadata) -> u64 {
        if let Some(id) = state.ids_by_name.get(&metadata.name) {
            return *id;
        }

        let id = state.next_id;
        state.next_id += 1;
        state.ids_by_name.insert(metadata.name.clone(), id);
        state.lineages.insert(
            id,
            Lineage {
                metadata: metadata.clone(),
                versions: Vec::new(),
            },
        );
        debug!(name = %metadata.name, id, "registered schema metadata");
        id
    }
}

impl Default for InMemoryRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaRegistryClient for InMemoryRegistry {
    fn register_schema(&self, metadata: &SchemaMetadata, schema_text: &str) -> Result<SchemaRef> {
        // A closed handle fails uniformly, before any input validation.
        let mut state = self.lock()?;

        if schema_text.len() > self.config.max_schema_text_size {
            return Err(RegistryError::InvalidSchema(format!(
                "schema text too large ({} bytes, max {})",
                schema_text.len(),
                self.config.max_schema_text_size
            )));
        }
        validate_schema_text(schema_text)?;

        let id = match state.ids_by_name.get(&metadata.name) {
            Some(id) => *id,
            None if self.config.auto_register_metadata => Self::metadata_id(&mut state, metadata),
            None => return Err(RegistryError::MetadataNotFound(metadata.name.clone())),
        };

        let lineage = state
            .lineages
            .get_mut(&id)
            .ok_or_else(|| RegistryError::MetadataNotFound(metadata.name.clone()))?;

        // Idempotent no-op: an already stored text keeps its reference.
        if let Some(pos) = lineage.versions.iter().position(|text| text == schema_text) {
            return Ok(SchemaRef::new(id, (pos + 1) as u32));
        }

        if !lineage.versions.is_empty() && lineage.metadata.compatibility != Compatibility::None {
            return Err(RegistryError::Incompatible {
                name: metadata.name.clone(),
                reason: format!(
                    "policy {:?} forbids changed schema text without a compatibility evaluator",
                    lineage.metadata.compatibility
                ),
            });
        }

        lineage.versions.push(schema_text.to_string());
        let version = lineage.versions.len() as u32;
        debug!(name = %metadata.name, id, version, "registered schema version");
        Ok(SchemaRef::new(id, version))
    }

    fn fetch_schema(&self, schema_ref: SchemaRef) -> Result<String> {
        let state = self.lock()?;
        state
            .lineages
            .get(&schema_ref.id)
            .and_then(|lineage| {
                let index = (schema_ref.version as usize).checked_sub(1)?;
                lineage.versions.get(index)
            })
            .cloned()
            .ok_or(RegistryError::SchemaNotFound(schema_ref))
    }

    fn close(&self) -> Result<()> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.closed = true;
        Ok(())
    }
}
