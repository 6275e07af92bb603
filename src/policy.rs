//! Registration policy
//!
//! Decides per write whether the coder registers a schema or only looks up an
//! existing id.
//!
//! The `auto.register.schemas` value is parsed loosely: only the text `true`
//! (any ASCII case) enables registration. Every other value, including `yes`,
//! `1` and the empty string, silently disables it rather than failing. Callers
//! that expect strict boolean parsing should validate the value themselves.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::RegistryOperation;

/// Option key controlling auto-registration
pub const AUTO_REGISTER_SCHEMAS: &str = "auto.register.schemas";

/// Immutable option map supplied at coder construction
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegistryConfig {
    options: HashMap<String, String>,
}

impl RegistryConfig {
    /// Create an empty configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Return a copy with one more option set
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    /// Get the raw text of an option
    pub fn get(&self, key: &str) -> Option<&str> {
        self.options.get(key).map(String::as_str)
    }

    /// Whether an option is present
    pub fn contains_key(&self, key: &str) -> bool {
        self.options.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RegistryConfig {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            options: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

impl From<HashMap<String, String>> for RegistryConfig {
    fn from(options: HashMap<String, String>) -> Self {
        Self { options }
    }
}

/// Whether writes should register schemas
///
/// Defaults to `true` when no configuration or no option is given.
pub fn should_auto_register(config: Option<&RegistryConfig>) -> bool {
    match config.and_then(|c| c.get(AUTO_REGISTER_SCHEMAS)) {
        Some(value) => value.eq_ignore_ascii_case("true"),
        None => true,
    }
}

/// Registry call a write will make
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    Register,
    Lookup,
}

impl WriteMode {
    /// Pick the mode for a configuration
    pub fn for_config(config: Option<&RegistryConfig>) -> Self {
        if should_auto_register(config) {
            WriteMode::Register
        } else {
            WriteMode::Lookup
        }
    }

    /// The registry operation this mode performs
    pub fn operation(self) -> RegistryOperation {
        match self {
            WriteMode::Register => RegistryOperation::Register,
            WriteMode::Lookup => RegistryOperation::Lookup,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(value: &str) -> RegistryConfig {
        RegistryConfig::new().with(AUTO_REGISTER_SCHEMAS, value)
    }

    #[test]
    fn test_default_registers() {
        assert!(should_auto_register(None));
        assert!(should_auto_register(Some(&RegistryConfig::new())));
        assert!(should_auto_register(Some(
            &RegistryConfig::new().with("basic.auth.user.info", "user:pw")
        )));
    }

    #[test]
    fn test_explicit_values() {
        assert!(should_auto_register(Some(&config("true"))));
        assert!(should_auto_register(Some(&config("TRUE"))));
        assert!(should_auto_register(Some(&config("True"))));
        assert!(!should_auto_register(Some(&config("false"))));
        assert!(!should_auto_register(Some(&config("FALSE"))));
    }

    #[test]
    fn test_loose_parsing_disables() {
        for value in ["yes", "1", "", " true", "on"] {
            assert!(!should_auto_register(Some(&config(value))), "value {:?}", value);
        }
    }

    #[test]
    fn test_write_mode() {
        assert_eq!(WriteMode::for_config(None), WriteMode::Register);
        assert_eq!(WriteMode::for_config(Some(&config("false"))), WriteMode::Lookup);
        assert_eq!(WriteMode::Lookup.operation(), RegistryOperation::Lookup);
    }

    #[test]
    fn test_from_iter() {
        let cfg: RegistryConfig = [(AUTO_REGISTER_SCHEMAS, "false"), ("other", "x")]
            .into_iter()
            .collect();
        assert_eq!(cfg.len(), 2);
        assert_eq!(cfg.get("other"), Some("x"));
        assert!(!should_auto_register(Some(&cfg)));
    }
}
