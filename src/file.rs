//! File-backed registry
//!
//! Persists registrations as `registry.json` inside a directory. Every new
//! registration rewrites the file before the in-memory state changes, so a
//! failed write leaves both untouched.
//!
//! ```text
//! registry/
//! └── registry.json
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::RegistryError;
use crate::fingerprint::Fingerprint;
use crate::gateway::RegistryGateway;
use crate::memory::{Registration, RegistryState};
use crate::schema::RegistrySchema;
use crate::wire::SchemaId;

/// Name of the state file inside the registry directory
pub const REGISTRY_FILE: &str = "registry.json";

const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct RegistryFile {
    format_version: u32,
    registrations: Vec<StoredRegistration>,
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredRegistration {
    id: SchemaId,
    subject: String,
    version: u32,
    fingerprint: Fingerprint,
    schema: String,
    registered_at: DateTime<Utc>,
}

/// Registry persisted to a JSON file
#[derive(Debug)]
pub struct FileRegistry<S> {
    root: PathBuf,
    state: Mutex<RegistryState<S>>,
}

impl<S: RegistrySchema> FileRegistry<S> {
    /// Open an existing registry or create a new one
    pub fn open(path: impl AsRef<Path>) -> Result<Self, RegistryError> {
        let root = path.as_ref().to_path_buf();
        fs::create_dir_all(&root).map_err(storage_error)?;

        let state = load_state(&root.join(REGISTRY_FILE))?;
        info!(path = %root.display(), schemas = state.schema_count(), "Opened file registry");

        Ok(Self {
            root,
            state: Mutex::new(state),
        })
    }

    /// Get the root path of the registry
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// All subjects, sorted
    pub fn subjects(&self) -> Vec<String> {
        self.state.lock().subjects()
    }

    /// Version numbers registered under `subject`
    pub fn versions(&self, subject: &str) -> Vec<u32> {
        self.state.lock().versions(subject)
    }

    /// Every (subject, version) registration
    pub fn registrations(&self) -> Vec<Registration<S>> {
        self.state.lock().registrations()
    }

    fn persist(&self, state: &RegistryState<S>) -> Result<(), RegistryError> {
        let registrations = state
            .registrations()
            .into_iter()
            .map(|r| {
                Ok(StoredRegistration {
                    id: r.id,
                    subject: r.subject,
                    version: r.version,
                    fingerprint: r.schema.fingerprint(),
                    schema: r.schema.full_text()?,
                    registered_at: r.registered_at,
                })
            })
            .collect::<Result<Vec<_>, RegistryError>>()?;
        let file = RegistryFile {
            format_version: FORMAT_VERSION,
            registrations,
        };

        let content = serde_json::to_string_pretty(&file).map_err(storage_error)?;
        let path = self.root.join(REGISTRY_FILE);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, content).map_err(storage_error)?;
        fs::rename(&tmp, &path).map_err(storage_error)?;
        Ok(())
    }
}

impl<S: RegistrySchema> RegistryGateway for FileRegistry<S> {
    type Schema = S;

    fn register(&self, subject: &str, schema: &S) -> Result<SchemaId, RegistryError> {
        let mut state = self.state.lock();

        let mut next = state.clone();
        let (id, created) = next.register(subject, schema)?;
        if created {
            self.persist(&next)?;
            *state = next;
            debug!(subject, schema_id = %id, "Registered schema");
        }
        Ok(id)
    }

    fn lookup_id(&self, subject: &str, schema: &S) -> Result<SchemaId, RegistryError> {
        self.state.lock().lookup_id(subject, schema)
    }

    fn resolve_by_id(&self, id: SchemaId) -> Result<S, RegistryError> {
        self.state.lock().resolve_by_id(id)
    }
}

fn load_state<S: RegistrySchema>(path: &Path) -> Result<RegistryState<S>, RegistryError> {
    let mut state = RegistryState::default();
    if !path.exists() {
        return Ok(state);
    }

    let content = fs::read_to_string(path).map_err(storage_error)?;
    let file: RegistryFile = serde_json::from_str(&content).map_err(storage_error)?;
    if file.format_version != FORMAT_VERSION {
        return Err(RegistryError::Storage(format!(
            "unsupported registry format version {}",
            file.format_version
        )));
    }

    for stored in file.registrations {
        let schema = S::parse(&stored.schema)?;
        if stored.fingerprint != schema.fingerprint() {
            return Err(RegistryError::Storage(format!(
                "fingerprint mismatch for schema id {} under {}",
                stored.id, stored.subject
            )));
        }
        state.restore(Registration {
            id: stored.id,
            subject: stored.subject,
            version: stored.version,
            schema,
            registered_at: stored.registered_at,
        })?;
    }

    Ok(state)
}

fn storage_error(e: impl std::fmt::Display) -> RegistryError {
    RegistryError::Storage(e.to_string())
}
