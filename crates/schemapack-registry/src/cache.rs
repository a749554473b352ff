use std::collections::HashMap;
use std::sync::RwLock;

use schemapack_envelope::SchemaRef;

/// Process-wide cache of fetched schema texts, keyed by reference.
///
/// A schema reference is immutable and always resolves to the same text,
/// so entries are write-once and never invalidated. The cache is an
/// explicit object injected into resolvers rather than ambient global
/// state, so tests can use an isolated cache per case.
#[derive(Debug, Default)]
pub struct SchemaCache {
    entries: RwLock<HashMap<SchemaRef, std::sync::Arc<str>>>,
}

impl SchemaCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the cached text for a reference.
    pub fn get(&self, schema_ref: SchemaRef) -> Option<std::sync::Arc<str>> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.get(&schema_ref).cloned()
    }

    /// Insert the text for a reference, returning the stored entry.
    ///
    /// If another thread won the race, its entry is kept and returned;
    /// a reference never maps to two different texts.
    pub fn insert(&self, schema_ref: SchemaRef, schema_text: &str) -> std::sync::Arc<str> {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries
            .entry(schema_ref)
            .or_insert_with(|| std::sync::Arc::from(schema_text))
            .clone()
    }

    /// Number of cached schema texts.
    pub fn len(&self) -> usize {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.len()
    }

    /// Whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
