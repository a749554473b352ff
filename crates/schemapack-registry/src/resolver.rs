use std::sync::Arc;

use schemapack_envelope::SchemaRef;
use tracing::{debug, trace};

use crate::cache::SchemaCache;
use crate::client::SchemaRegistryClient;
use crate::error::Result;

/// Cache-first schema resolution.
///
/// Owns a registry client handle and a shared [`SchemaCache`]. Two
/// successive resolves of the same reference hit the registry at most
/// once; concurrent first resolves may both fetch but converge to a
/// single cache entry.
pub struct SchemaResolver<C> {
    client: C,
    cache: Arc<SchemaCache>,
}

impl<C: SchemaRegistryClient> SchemaResolver<C> {
    /// Create a resolver with its own cache.
    pub fn new(client: C) -> Self {
        Self::with_cache(client, Arc::new(SchemaCache::new()))
    }

    /// Create a resolver over a shared cache.
    pub fn with_cache(client: C, cache: Arc<SchemaCache>) -> Self {
        Self { client, cache }
    }

    /// Resolve a reference to its schema text.
    ///
    /// Fails with `SchemaNotFound` if the registry has no schema for the
    /// reference; that failure is not cached.
    pub fn resolve(&self, schema_ref: SchemaRef) -> Result<Arc<str>> {
        if let Some(text) = self.cache.get(schema_ref) {
            trace!(%schema_ref, "schema cache hit");
            return Ok(text);
        }

        debug!(%schema_ref, "fetching schema from registry");
        let text = self.client.fetch_schema(schema_ref)?;
        Ok(self.cache.insert(schema_ref, &text))
    }

    /// Borrow the underlying client.
    pub fn client(&self) -> &C {
        &self.client
    }

    /// The cache this resolver reads and populates.
    pub fn cache(&self) -> &Arc<SchemaCache> {
        &self.cache
    }

    /// Release the registry client handle.
    pub fn close(&self) -> Result<()> {
        self.client.close()
    }
}
