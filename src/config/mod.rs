//! Configuration loading and management

use crate::core::PreferenceStore;
use crate::core::filter::{DefaultFilter, builtin_default_filters};
use crate::storage::{InMemoryPreferenceStore, JsonFilePreferenceStore};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

/// Prefix of the preference keys filter sets are stored under
pub const DEFAULT_KEY_PREFIX: &str = "process-filters";

/// Which preference store backs the service
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StoreConfig {
    /// Process-local map, lost on exit
    #[default]
    InMemory,

    /// JSON document on local disk
    File { path: PathBuf },

    /// Remote preference REST API
    Http {
        base_url: String,
        #[serde(default)]
        token: Option<String>,
    },
}

impl StoreConfig {
    /// Build the configured store
    ///
    /// The `http` store needs the `http` feature.
    pub fn build(&self) -> Result<Arc<dyn PreferenceStore>> {
        match self {
            StoreConfig::InMemory => Ok(Arc::new(InMemoryPreferenceStore::new())),
            StoreConfig::File { path } => Ok(Arc::new(JsonFilePreferenceStore::new(path))),
            #[cfg(feature = "http")]
            StoreConfig::Http { base_url, token } => {
                let mut store = crate::storage::HttpPreferenceStore::new(base_url)?;
                if let Some(token) = token {
                    store = store.with_bearer_token(token);
                }
                Ok(Arc::new(store))
            }
            #[cfg(not(feature = "http"))]
            StoreConfig::Http { .. } => {
                anyhow::bail!("the http preference store requires the `http` feature")
            }
        }
    }
}

/// Configuration of the filter cache service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterServiceConfig {
    /// Prefix of derived preference keys
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,

    /// Hold a per-key lock across each read-modify-write
    ///
    /// Off by default: concurrent writers to one key are last-write-wins.
    #[serde(default)]
    pub serialize_writes: bool,

    /// Filters seeded when a user has none for an application
    #[serde(default = "builtin_default_filters")]
    pub default_filters: Vec<DefaultFilter>,

    #[serde(default)]
    pub store: StoreConfig,
}

fn default_key_prefix() -> String {
    DEFAULT_KEY_PREFIX.to_string()
}

impl Default for FilterServiceConfig {
    fn default() -> Self {
        Self {
            key_prefix: default_key_prefix(),
            serialize_writes: false,
            default_filters: builtin_default_filters(),
            store: StoreConfig::default(),
        }
    }
}

impl FilterServiceConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    pub fn with_serialized_writes(mut self, serialize_writes: bool) -> Self {
        self.serialize_writes = serialize_writes;
        self
    }
}
