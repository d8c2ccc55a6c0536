//! Preference store contract
//!
//! The filter cache persists each user's filter set as one JSON value in a
//! generic key-value preference store, addressed by application name and key.

use crate::core::error::StoreResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One stored preference: a key and its JSON-encoded value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreferenceEntry {
    pub key: String,

    /// JSON text, for filters an encoded array of `FilterDefinition`
    pub value: String,
}

impl PreferenceEntry {
    /// Encode a value into an entry
    pub fn encode(key: impl Into<String>, value: &Value) -> StoreResult<Self> {
        Ok(Self {
            key: key.into(),
            value: serde_json::to_string(value)?,
        })
    }

    /// Decode the entry's value
    pub fn decode(&self) -> StoreResult<Value> {
        Ok(serde_json::from_str(&self.value)?)
    }
}

/// Wrapper around an entry, as listed by the preference API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreferenceItem {
    pub entry: PreferenceEntry,
}

/// Paged list of entries
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreferencePage {
    #[serde(default)]
    pub entries: Vec<PreferenceItem>,
}

/// Response of `get_preferences`: `{ "list": { "entries": [ { "entry": ... } ] } }`
///
/// Every level defaults, so an absent or empty response decodes as no entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreferenceList {
    #[serde(default)]
    pub list: Option<PreferencePage>,
}

impl PreferenceList {
    pub fn from_entries(entries: impl IntoIterator<Item = PreferenceEntry>) -> Self {
        Self {
            list: Some(PreferencePage {
                entries: entries
                    .into_iter()
                    .map(|entry| PreferenceItem { entry })
                    .collect(),
            }),
        }
    }

    pub fn entries(&self) -> impl Iterator<Item = &PreferenceEntry> {
        self.list
            .iter()
            .flat_map(|page| page.entries.iter().map(|item| &item.entry))
    }

    pub fn is_empty(&self) -> bool {
        self.entries().next().is_none()
    }

    pub fn find(&self, key: &str) -> Option<&PreferenceEntry> {
        self.entries().find(|entry| entry.key == key)
    }
}

/// Key-value preference storage, scoped by application
///
/// Implementations must be safe to share between tasks. The filter cache
/// treats every failure as a server error and never retries.
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    /// List the preferences of an application
    ///
    /// `key` is passed through for backends that can narrow the listing;
    /// callers still look the key up in the returned entries.
    async fn get_preferences(&self, app_name: &str, key: &str) -> StoreResult<PreferenceList>;

    /// Get the decoded value stored under a key, `None` when absent
    async fn get_preference_by_key(&self, app_name: &str, key: &str) -> StoreResult<Option<Value>>;

    /// Store a value under a new key, returning the stored value
    async fn create_preference(&self, app_name: &str, key: &str, value: Value) -> StoreResult<Value>;

    /// Replace the value under an existing key, returning the stored value
    ///
    /// Fails with `StoreError::NotFound` when the key does not exist.
    async fn update_preference(&self, app_name: &str, key: &str, value: Value) -> StoreResult<Value>;

    /// Remove a key; removing an absent key is not an error
    async fn delete_preference(&self, app_name: &str, key: &str) -> StoreResult<()>;
}
