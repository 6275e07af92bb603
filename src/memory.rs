//! In-memory registry
//!
//! A thread-safe [`RegistryGateway`] holding all registrations in process.
//! Used for tests and local development, and as the state model behind
//! [`crate::file::FileRegistry`].

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tracing::debug;

use crate::error::RegistryError;
use crate::fingerprint::Fingerprint;
use crate::gateway::RegistryGateway;
use crate::schema::RegistrySchema;
use crate::wire::SchemaId;

/// One version of a schema under a subject
#[derive(Debug, Clone, PartialEq)]
pub struct Registration<S> {
    pub id: SchemaId,
    pub subject: String,
    pub version: u32,
    pub schema: S,
    pub registered_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct SubjectVersion {
    version: u32,
    id: SchemaId,
    registered_at: DateTime<Utc>,
}

/// Registry contents, shared by the in-memory and file-backed registries
#[derive(Debug, Clone)]
pub(crate) struct RegistryState<S> {
    next_id: i32,
    schemas: BTreeMap<SchemaId, S>,
    ids_by_fingerprint: HashMap<Fingerprint, SchemaId>,
    subjects: BTreeMap<String, Vec<SubjectVersion>>,
}

impl<S> Default for RegistryState<S> {
    fn default() -> Self {
        Self {
            next_id: 1,
            schemas: BTreeMap::new(),
            ids_by_fingerprint: HashMap::new(),
            subjects: BTreeMap::new(),
        }
    }
}

impl<S: RegistrySchema> RegistryState<S> {
    /// Id of `fingerprint` under `subject`, if registered there
    fn find_in_subject(&self, subject: &str, fingerprint: &Fingerprint) -> Option<SchemaId> {
        let id = *self.ids_by_fingerprint.get(fingerprint)?;
        self.subjects
            .get(subject)?
            .iter()
            .any(|v| v.id == id)
            .then_some(id)
    }

    /// Register a schema; returns the id and whether state changed
    pub(crate) fn register(
        &mut self,
        subject: &str,
        schema: &S,
    ) -> Result<(SchemaId, bool), RegistryError> {
        let fingerprint = schema.fingerprint();
        if let Some(id) = self.find_in_subject(subject, &fingerprint) {
            return Ok((id, false));
        }

        let id = match self.ids_by_fingerprint.get(&fingerprint) {
            Some(id) => *id,
            None => {
                let id = SchemaId(self.next_id);
                self.next_id = self.next_id.checked_add(1).ok_or_else(|| {
                    RegistryError::Storage("schema id space exhausted".to_string())
                })?;
                self.schemas.insert(id, schema.clone());
                self.ids_by_fingerprint.insert(fingerprint, id);
                id
            }
        };

        self.push_version(subject, id, Utc::now());
        Ok((id, true))
    }

    fn push_version(&mut self, subject: &str, id: SchemaId, registered_at: DateTime<Utc>) {
        let versions = self.subjects.entry(subject.to_string()).or_default();
        let version = versions.last().map(|v| v.version + 1).unwrap_or(1);
        versions.push(SubjectVersion { version, id, registered_at });
    }

    pub(crate) fn lookup_id(&self, subject: &str, schema: &S) -> Result<SchemaId, RegistryError> {
        if !self.subjects.contains_key(subject) {
            return Err(RegistryError::SubjectNotFound(subject.to_string()));
        }
        self.find_in_subject(subject, &schema.fingerprint())
            .ok_or_else(|| RegistryError::SchemaNotFound { subject: subject.to_string() })
    }

    pub(crate) fn resolve_by_id(&self, id: SchemaId) -> Result<S, RegistryError> {
        self.schemas.get(&id).cloned().ok_or(RegistryError::IdNotFound(id))
    }

    /// Re-insert a registration loaded from storage
    pub(crate) fn restore(&mut self, registration: Registration<S>) -> Result<(), RegistryError> {
        let fingerprint = registration.schema.fingerprint();
        match self.schemas.get(&registration.id) {
            Some(existing) if *existing != registration.schema => {
                return Err(RegistryError::Conflict(format!(
                    "id {} is bound to two different schemas",
                    registration.id
                )));
            }
            Some(_) => {}
            None => {
                self.schemas.insert(registration.id, registration.schema);
                self.ids_by_fingerprint.insert(fingerprint, registration.id);
            }
        }
        self.next_id = self.next_id.max(registration.id.0.saturating_add(1));

        let versions = self.subjects.entry(registration.subject).or_default();
        versions.push(SubjectVersion {
            version: registration.version,
            id: registration.id,
            registered_at: registration.registered_at,
        });
        versions.sort_by_key(|v| v.version);
        Ok(())
    }

    pub(crate) fn registrations(&self) -> Vec<Registration<S>> {
        self.subjects
            .iter()
            .flat_map(|(subject, versions)| {
                versions.iter().filter_map(move |v| {
                    self.schemas.get(&v.id).map(|schema| Registration {
                        id: v.id,
                        subject: subject.clone(),
                        version: v.version,
                        schema: schema.clone(),
                        registered_at: v.registered_at,
                    })
                })
            })
            .collect()
    }

    pub(crate) fn subjects(&self) -> Vec<String> {
        self.subjects.keys().cloned().collect()
    }

    pub(crate) fn versions(&self, subject: &str) -> Vec<u32> {
        self.subjects
            .get(subject)
            .map(|versions| versions.iter().map(|v| v.version).collect())
            .unwrap_or_default()
    }

    pub(crate) fn schema_count(&self) -> usize {
        self.schemas.len()
    }
}

/// Registry kept entirely in memory
///
/// Ids start at 1 and are global across subjects: an equal schema registered
/// under a second subject reuses its existing id.
///
/// Equality is the fingerprint of [`RegistrySchema::canonical_form`]. For Avro
/// the Parsing Canonical Form drops `logicalType`, `precision` and `scale`, so a
/// plain `long` and a `timestamp-millis` long share one id, and
/// `resolve_by_id` returns whichever was registered first. A Confluent
/// registry keeps those apart.
#[derive(Debug)]
pub struct InMemoryRegistry<S> {
    state: RwLock<RegistryState<S>>,
}

impl<S: RegistrySchema> InMemoryRegistry<S> {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            state: RwLock::new(RegistryState::default()),
        }
    }

    /// All subjects, sorted
    pub fn subjects(&self) -> Vec<String> {
        self.state.read().subjects()
    }

    /// Version numbers registered under `subject`
    pub fn versions(&self, subject: &str) -> Vec<u32> {
        self.state.read().versions(subject)
    }

    /// Every (subject, version) registration
    pub fn registrations(&self) -> Vec<Registration<S>> {
        self.state.read().registrations()
    }

    /// Number of distinct schemas
    pub fn len(&self) -> usize {
        self.state.read().schema_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<S: RegistrySchema> Default for InMemoryRegistry<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: RegistrySchema> RegistryGateway for InMemoryRegistry<S> {
    type Schema = S;

    fn register(&self, subject: &str, schema: &S) -> Result<SchemaId, RegistryError> {
        let (id, created) = self.state.write().register(subject, schema)?;
        if created {
            debug!(subject, schema_id = %id, "Registered schema");
        }
        Ok(id)
    }

    fn lookup_id(&self, subject: &str, schema: &S) -> Result<SchemaId, RegistryError> {
        self.state.read().lookup_id(subject, schema)
    }

    fn resolve_by_id(&self, id: SchemaId) -> Result<S, RegistryError> {
        self.state.read().resolve_by_id(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    #[test]
    fn test_register_is_idempotent() {
        let registry = InMemoryRegistry::<Value>::new();
        let schema = json!({"type": "record", "name": "Order"});

        let first = registry.register("orders-value", &schema).unwrap();
        let second = registry.register("orders-value", &schema.clone()).unwrap();
        assert_eq!(first, SchemaId(1));
        assert_eq!(first, second);
        assert_eq!(registry.versions("orders-value"), vec![1]);
    }

    #[test]
    fn test_ids_are_global() {
        let registry = InMemoryRegistry::<Value>::new();
        let order = json!("string");
        let payment = json!("long");

        let a = registry.register("orders-value", &order).unwrap();
        let b = registry.register("payments-value", &payment).unwrap();
        let c = registry.register("audit-value", &order).unwrap();
        assert_eq!((a, b, c), (SchemaId(1), SchemaId(2), SchemaId(1)));
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.subjects(), vec!["audit-value", "orders-value", "payments-value"]);
    }

    #[test]
    fn test_new_version_per_schema() {
        let registry = InMemoryRegistry::<Value>::new();
        registry.register("orders-value", &json!("string")).unwrap();
        registry.register("orders-value", &json!("long")).unwrap();
        assert_eq!(registry.versions("orders-value"), vec![1, 2]);

        let registrations = registry.registrations();
        assert_eq!(registrations.len(), 2);
        assert_eq!(registrations[1].schema, json!("long"));
    }

    #[test]
    fn test_lookup_never_creates() {
        let registry = InMemoryRegistry::<Value>::new();
        assert!(matches!(
            registry.lookup_id("orders-value", &json!("string")),
            Err(RegistryError::SubjectNotFound(_))
        ));

        registry.register("orders-value", &json!("string")).unwrap();
        assert!(matches!(
            registry.lookup_id("orders-value", &json!("long")),
            Err(RegistryError::SchemaNotFound { .. })
        ));
        assert_eq!(registry.lookup_id("orders-value", &json!("string")).unwrap(), SchemaId(1));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_lookup_is_scoped_to_subject() {
        let registry = InMemoryRegistry::<Value>::new();
        registry.register("orders-value", &json!("string")).unwrap();
        registry.register("payments-value", &json!("long")).unwrap();
        assert!(matches!(
            registry.lookup_id("payments-value", &json!("string")),
            Err(RegistryError::SchemaNotFound { .. })
        ));
    }

    #[test]
    fn test_resolve_unknown_id() {
        let registry = InMemoryRegistry::<Value>::new();
        assert!(matches!(
            registry.resolve_by_id(SchemaId(-3)),
            Err(RegistryError::IdNotFound(SchemaId(-3)))
        ));
    }

    #[test]
    fn test_logical_types_share_id() {
        let registry = InMemoryRegistry::<apache_avro::Schema>::new();
        let plain = apache_avro::Schema::parse_str(r#""long""#).unwrap();
        let timestamp =
            apache_avro::Schema::parse_str(r#"{"type": "long", "logicalType": "timestamp-millis"}"#)
                .unwrap();

        let a = registry.register("events-value", &plain).unwrap();
        let b = registry.register("events-value", &timestamp).unwrap();
        assert_eq!(a, b);
        assert_eq!(registry.versions("events-value"), vec![1]);
        assert_eq!(registry.resolve_by_id(a).unwrap(), plain);
    }

    #[test]
    fn test_restore_advances_ids() {
        let mut state = RegistryState::<Value>::default();
        state
            .restore(Registration {
                id: SchemaId(10),
                subject: "orders-value".to_string(),
                version: 1,
                schema: json!("string"),
                registered_at: Utc::now(),
            })
            .unwrap();
        let (id, created) = state.register("orders-value", &json!("long")).unwrap();
        assert!(created);
        assert_eq!(id, SchemaId(11));
        assert_eq!(state.versions("orders-value"), vec![1, 2]);
    }

    #[test]
    fn test_restore_conflict() {
        let mut state = RegistryState::<Value>::default();
        let registration = |schema: Value| Registration {
            id: SchemaId(1),
            subject: "orders-value".to_string(),
            version: 1,
            schema,
            registered_at: Utc::now(),
        };
        state.restore(registration(json!("string"))).unwrap();
        assert!(matches!(
            state.restore(registration(json!("long"))),
            Err(RegistryError::Conflict(_))
        ));
    }
}
