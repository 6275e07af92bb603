//! Registry-backed schema coder
//!
//! Writes and reads the 5-byte schema prefix, resolving schemas through a
//! [`RegistryGateway`]. The coder holds no mutable state; each call is one
//! independent transaction against the gateway.

use std::io::{Read, Write};

use tracing::{debug, warn};

use crate::error::{CoderError, RegistryOperation, Result};
use crate::gateway::RegistryGateway;
use crate::policy::{RegistryConfig, WriteMode};
use crate::subject::Subject;
use crate::wire::{self, SchemaId};

/// Reads and writes the schema reference in front of a payload
pub trait SchemaCoder {
    type Schema;

    /// Strip the prefix from `reader` and resolve the schema it names
    fn read_schema(&self, reader: &mut dyn Read) -> Result<Self::Schema>;

    /// Resolve `schema` to an id and write its prefix to `writer`
    fn write_schema(&self, schema: &Self::Schema, writer: &mut dyn Write) -> Result<()>;
}

/// Coder bound to one subject, one configuration and one registry
#[derive(Debug, Clone)]
pub struct RegistrySchemaCoder<G> {
    subject: Option<Subject>,
    gateway: G,
    config: Option<RegistryConfig>,
}

impl<G: RegistryGateway> RegistrySchemaCoder<G> {
    /// Create a coder
    ///
    /// Without a subject the coder can only read; writes fail with
    /// [`CoderError::SubjectRequired`].
    pub fn new(subject: Option<Subject>, gateway: G, config: Option<RegistryConfig>) -> Self {
        Self { subject, gateway, config }
    }

    /// Create a coder for `subject` with default configuration
    pub fn with_subject(subject: Subject, gateway: G) -> Self {
        Self::new(Some(subject), gateway, None)
    }

    /// Create a read-only coder that resolves ids without a subject
    pub fn identifier_only(gateway: G) -> Self {
        Self::new(None, gateway, None)
    }

    pub fn subject(&self) -> Option<&Subject> {
        self.subject.as_ref()
    }

    pub fn config(&self) -> Option<&RegistryConfig> {
        self.config.as_ref()
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// The registry call writes will make
    pub fn write_mode(&self) -> WriteMode {
        WriteMode::for_config(self.config.as_ref())
    }

    /// Resolve `schema` to its registry id, registering it if configured to
    ///
    /// Never falls back from one mode to the other.
    pub fn schema_id_for(&self, schema: &G::Schema) -> Result<SchemaId> {
        let mode = self.write_mode();
        let operation = mode.operation();
        let subject = self
            .subject
            .as_ref()
            .ok_or(CoderError::SubjectRequired { operation })?;

        let outcome = match mode {
            WriteMode::Register => self.gateway.register(subject.as_str(), schema),
            WriteMode::Lookup => self.gateway.lookup_id(subject.as_str(), schema),
        };

        match outcome {
            Ok(id) => {
                debug!(subject = %subject, schema_id = %id, mode = ?mode, "Resolved schema id");
                Ok(id)
            }
            Err(source) => {
                warn!(subject = %subject, mode = ?mode, error = %source, "Registry call failed");
                Err(CoderError::RegistryOperationFailed { operation, source })
            }
        }
    }

    /// Resolve a schema id read from the wire
    pub fn resolve(&self, id: SchemaId) -> Result<G::Schema> {
        self.gateway.resolve_by_id(id).map_err(|source| {
            warn!(schema_id = %id, error = %source, "Schema resolution failed");
            CoderError::SchemaResolutionFailed { id, source }
        })
    }
}

impl<G: RegistryGateway> SchemaCoder for RegistrySchemaCoder<G> {
    type Schema = G::Schema;

    fn read_schema(&self, reader: &mut dyn Read) -> Result<G::Schema> {
        let id = wire::decode_prefix(reader)?;
        debug!(schema_id = %id, "Read schema prefix");
        self.resolve(id)
    }

    fn write_schema(&self, schema: &G::Schema, writer: &mut dyn Write) -> Result<()> {
        let id = self.schema_id_for(schema)?;
        wire::write_prefix(writer, id)
    }
}
