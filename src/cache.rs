//! Caching gateway decorator
//!
//! Wraps any [`RegistryGateway`] and memoizes successful answers so repeated
//! writes and reads of the same schema skip the registry round-trip. Failures
//! are never cached.

use std::collections::HashMap;

use parking_lot::RwLock;
use tracing::trace;

use crate::error::RegistryError;
use crate::fingerprint::Fingerprint;
use crate::gateway::RegistryGateway;
use crate::schema::RegistrySchema;
use crate::wire::SchemaId;

/// Cache statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

/// Memoizing wrapper around a registry gateway
///
/// Register and lookup answers are keyed by subject and canonical-form
/// fingerprint, so schemas differing only in Avro logical types hit the same
/// entry. Wrap a gateway with the same identity rule.
pub struct CachedRegistry<G: RegistryGateway> {
    inner: G,
    schemas_by_id: RwLock<HashMap<SchemaId, G::Schema>>,
    ids_by_subject: RwLock<HashMap<(String, Fingerprint), SchemaId>>,
    stats: RwLock<CacheStats>,
}

impl<G: RegistryGateway> CachedRegistry<G> {
    pub fn new(inner: G) -> Self {
        Self {
            inner,
            schemas_by_id: RwLock::new(HashMap::new()),
            ids_by_subject: RwLock::new(HashMap::new()),
            stats: RwLock::new(CacheStats::default()),
        }
    }

    /// The wrapped gateway
    pub fn inner(&self) -> &G {
        &self.inner
    }

    pub fn stats(&self) -> CacheStats {
        *self.stats.read()
    }

    /// Drop every cached entry
    pub fn clear(&self) {
        self.schemas_by_id.write().clear();
        self.ids_by_subject.write().clear();
    }

    fn record(&self, hit: bool) {
        let mut stats = self.stats.write();
        if hit {
            stats.hits += 1;
        } else {
            stats.misses += 1;
        }
    }

    /// Shared path for register and lookup: both map (subject, schema) to an id
    fn cached_id<F>(
        &self,
        subject: &str,
        schema: &G::Schema,
        fetch: F,
    ) -> Result<SchemaId, RegistryError>
    where
        F: FnOnce() -> Result<SchemaId, RegistryError>,
    {
        let key = (subject.to_string(), schema.fingerprint());
        if let Some(id) = self.ids_by_subject.read().get(&key).copied() {
            self.record(true);
            trace!(subject, schema_id = %id, "Schema id cache hit");
            return Ok(id);
        }

        self.record(false);
        let id = fetch()?;
        self.ids_by_subject.write().insert(key, id);
        self.schemas_by_id.write().entry(id).or_insert_with(|| schema.clone());
        Ok(id)
    }
}

impl<G: RegistryGateway> RegistryGateway for CachedRegistry<G> {
    type Schema = G::Schema;

    fn register(&self, subject: &str, schema: &G::Schema) -> Result<SchemaId, RegistryError> {
        self.cached_id(subject, schema, || self.inner.register(subject, schema))
    }

    fn lookup_id(&self, subject: &str, schema: &G::Schema) -> Result<SchemaId, RegistryError> {
        self.cached_id(subject, schema, || self.inner.lookup_id(subject, schema))
    }

    fn resolve_by_id(&self, id: SchemaId) -> Result<G::Schema, RegistryError> {
        if let Some(schema) = self.schemas_by_id.read().get(&id).cloned() {
            self.record(true);
            trace!(schema_id = %id, "Schema cache hit");
            return Ok(schema);
        }

        self.record(false);
        let schema = self.inner.resolve_by_id(id)?;
        self.schemas_by_id.write().insert(id, schema.clone());
        Ok(schema)
    }
}
