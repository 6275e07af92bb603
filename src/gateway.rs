//! Registry gateway contract
//!
//! The narrow capability the coder needs from a schema registry client.
//! Transport, retries, authentication and caching all live behind this trait;
//! see [`crate::cache::CachedRegistry`] for a caching decorator.

use std::sync::Arc;

use crate::error::RegistryError;
use crate::schema::RegistrySchema;
use crate::wire::SchemaId;

/// Operations a registry client must provide
pub trait RegistryGateway {
    /// Schema type stored by this registry
    type Schema: RegistrySchema;

    /// Register `schema` under `subject`, returning its new or existing id
    ///
    /// Must be idempotent: registering an equal schema again under the same
    /// subject returns the same id.
    fn register(&self, subject: &str, schema: &Self::Schema) -> Result<SchemaId, RegistryError>;

    /// Id of an already registered schema, without creating a registration
    fn lookup_id(&self, subject: &str, schema: &Self::Schema) -> Result<SchemaId, RegistryError>;

    /// Full schema bound to `id`
    fn resolve_by_id(&self, id: SchemaId) -> Result<Self::Schema, RegistryError>;
}

impl<G: RegistryGateway + ?Sized> RegistryGateway for &G {
    type Schema = G::Schema;

    fn register(&self, subject: &str, schema: &Self::Schema) -> Result<SchemaId, RegistryError> {
        (**self).register(subject, schema)
    }

    fn lookup_id(&self, subject: &str, schema: &Self::Schema) -> Result<SchemaId, RegistryError> {
        (**self).lookup_id(subject, schema)
    }

    fn resolve_by_id(&self, id: SchemaId) -> Result<Self::Schema, RegistryError> {
        (**self).resolve_by_id(id)
    }
}

impl<G: RegistryGateway + ?Sized> RegistryGateway for Arc<G> {
    type Schema = G::Schema;

    fn register(&self, subject: &str, schema: &Self::Schema) -> Result<SchemaId, RegistryError> {
        (**self).register(subject, schema)
    }

    fn lookup_id(&self, subject: &str, schema: &Self::Schema) -> Result<SchemaId, RegistryError> {
        (**self).lookup_id(subject, schema)
    }

    fn resolve_by_id(&self, id: SchemaId) -> Result<Self::Schema, RegistryError> {
        (**self).resolve_by_id(id)
    }
}

impl<G: RegistryGateway + ?Sized> RegistryGateway for Box<G> {
    type Schema = G::Schema;

    fn register(&self, subject: &str, schema: &Self::Schema) -> Result<SchemaId, RegistryError> {
        (**self).register(subject, schema)
    }

    fn lookup_id(&self, subject: &str, schema: &Self::Schema) -> Result<SchemaId, RegistryError> {
        (**self).lookup_id(subject, schema)
    }

    fn resolve_by_id(&self, id: SchemaId) -> Result<Self::Schema, RegistryError> {
        (**self).resolve_by_id(id)
    }
}
