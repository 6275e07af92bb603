//! Configuration management for the schema coder
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (schema-coder.toml)
//! - Environment variables (SCHEMA_CODER__*)
//!
//! ## Example config file (schema-coder.toml):
//! ```toml
//! [registry]
//! path = "./registry"
//! cache = true
//!
//! [coder]
//! subject = "orders-value"
//! subject_strategy = "topic_name"
//!
//! [coder.properties]
//! "auto.register.schemas" = "false"
//! ```

use config_crate::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

use crate::error::Result;
use crate::policy::RegistryConfig;
use crate::subject::{Subject, SubjectNameStrategy};

/// Main configuration for the coder tooling
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CoderSettings {
    /// Registry settings
    #[serde(default)]
    pub registry: RegistrySettings,

    /// Coder settings
    #[serde(default)]
    pub coder: CoderOptions,
}

/// Where the registry lives and how it is accessed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrySettings {
    /// Directory of the file-backed registry
    #[serde(default = "default_registry_path")]
    pub path: PathBuf,

    /// Wrap the registry in a caching decorator
    #[serde(default = "default_true")]
    pub cache: bool,
}

/// Options bound into each coder
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CoderOptions {
    /// Subject to register under; identifier-only mode when absent
    #[serde(default)]
    pub subject: Option<String>,

    /// How subjects are derived from topics
    #[serde(default)]
    pub subject_strategy: SubjectNameStrategy,

    /// Registry client properties (e.g. `auto.register.schemas`)
    #[serde(default)]
    pub properties: HashMap<String, String>,
}

fn default_registry_path() -> PathBuf {
    PathBuf::from("registry")
}

fn default_true() -> bool {
    true
}

impl Default for RegistrySettings {
    fn default() -> Self {
        Self {
            path: default_registry_path(),
            cache: true,
        }
    }
}

impl CoderOptions {
    /// The configured subject, validated
    pub fn subject(&self) -> Result<Option<Subject>> {
        self.subject.clone().map(Subject::new).transpose()
    }

    /// Properties as a registry configuration, absent when none are set
    pub fn registry_config(&self) -> Option<RegistryConfig> {
        if self.properties.is_empty() {
            None
        } else {
            Some(RegistryConfig::from(self.properties.clone()))
        }
    }
}

impl CoderSettings {
    /// Load configuration from default locations
    pub fn load() -> std::result::Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load configuration from a specific file
    pub fn load_from(config_path: Option<&str>) -> std::result::Result<Self, ConfigError> {
        let mut builder = Config::builder();

        let config_locations = [
            "schema-coder.toml",
            ".schema-coder.toml",
            "config/schema-coder.toml",
        ];

        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        let project_dirs = directories::ProjectDirs::from("dev", "familiar", "schema-coder");
        if let Some(config_dir) = project_dirs {
            let xdg_config = config_dir.config_dir().join("schema-coder.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // SCHEMA_CODER__REGISTRY__PATH=/var/lib/registry
        builder = builder.add_source(
            Environment::with_prefix("SCHEMA_CODER")
                .separator("__")
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }

    /// Save configuration to a file
    pub fn save(&self, path: &str) -> std::io::Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, content)
    }

    /// Get the registry path (resolves relative paths)
    pub fn registry_path(&self) -> PathBuf {
        if self.registry.path.is_absolute() {
            self.registry.path.clone()
        } else {
            std::env::current_dir()
                .unwrap_or_default()
                .join(&self.registry.path)
        }
    }
}
