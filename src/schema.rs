//! Schema abstraction
//!
//! The coder treats schemas as opaque values. Registries need three things
//! from them: a canonical text form for structural identity, the full text for
//! persistence, and a way to parse that text back when loading stored state.

use std::fmt::Debug;

use crate::error::RegistryError;
use crate::fingerprint::Fingerprint;

/// A schema value the registry can store and compare
pub trait RegistrySchema: Clone + PartialEq + Debug + Send + Sync + Sized {
    /// Canonical text; equal schemas must produce equal text
    fn canonical_form(&self) -> String;

    /// Complete text of the schema, keeping every attribute `parse` reads back
    fn full_text(&self) -> Result<String, RegistryError>;

    /// Parse a schema from its text form
    fn parse(text: &str) -> Result<Self, RegistryError>;

    /// Fingerprint of the canonical form
    fn fingerprint(&self) -> Fingerprint {
        Fingerprint::of(&self.canonical_form())
    }
}

impl RegistrySchema for apache_avro::Schema {
    fn canonical_form(&self) -> String {
        apache_avro::Schema::canonical_form(self)
    }

    fn full_text(&self) -> Result<String, RegistryError> {
        serde_json::to_string(self).map_err(|e| RegistryError::InvalidSchema(e.to_string()))
    }

    fn parse(text: &str) -> Result<Self, RegistryError> {
        apache_avro::Schema::parse_str(text)
            .map_err(|e| RegistryError::InvalidSchema(e.to_string()))
    }
}

impl RegistrySchema for serde_json::Value {
    fn canonical_form(&self) -> String {
        self.to_string()
    }

    fn full_text(&self) -> Result<String, RegistryError> {
        Ok(self.to_string())
    }

    fn parse(text: &str) -> Result<Self, RegistryError> {
        serde_json::from_str(text).map_err(|e| RegistryError::InvalidSchema(e.to_string()))
    }
}
