//! In-memory implementation of PreferenceStore for testing and development

use crate::core::error::{StoreError, StoreResult};
use crate::core::preference::{PreferenceEntry, PreferenceList, PreferenceStore};
use async_trait::async_trait;
use indexmap::IndexMap;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

type AppPreferences = IndexMap<String, Value>;

/// In-memory preference store
///
/// Preferences are grouped per application and listed in insertion order.
/// Uses RwLock for thread-safe access; clones share the same data.
#[derive(Clone, Default)]
pub struct InMemoryPreferenceStore {
    apps: Arc<RwLock<HashMap<String, AppPreferences>>>,
}

impl InMemoryPreferenceStore {
    /// Create a new, empty in-memory preference store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys stored for an application
    pub fn len(&self, app_name: &str) -> usize {
        self.apps
            .read()
            .map(|apps| apps.get(app_name).map_or(0, IndexMap::len))
            .unwrap_or(0)
    }

    fn poisoned(e: impl std::fmt::Display) -> StoreError {
        StoreError::Unavailable(format!("Failed to acquire lock: {}", e))
    }
}

#[async_trait]
impl PreferenceStore for InMemoryPreferenceStore {
    async fn get_preferences(&self, app_name: &str, _key: &str) -> StoreResult<PreferenceList> {
        let apps = self.apps.read().map_err(Self::poisoned)?;

        let entries = match apps.get(app_name) {
            Some(prefs) => prefs
                .iter()
                .map(|(key, value)| PreferenceEntry::encode(key, value))
                .collect::<StoreResult<Vec<_>>>()?,
            None => Vec::new(),
        };

        Ok(PreferenceList::from_entries(entries))
    }

    async fn get_preference_by_key(&self, app_name: &str, key: &str) -> StoreResult<Option<Value>> {
        let apps = self.apps.read().map_err(Self::poisoned)?;

        Ok(apps.get(app_name).and_then(|prefs| prefs.get(key)).cloned())
    }

    async fn create_preference(&self, app_name: &str, key: &str, value: Value) -> StoreResult<Value> {
        let mut apps = self.apps.write().map_err(Self::poisoned)?;

        apps.entry(app_name.to_string())
            .or_default()
            .insert(key.to_string(), value.clone());

        Ok(value)
    }

    async fn update_preference(&self, app_name: &str, key: &str, value: Value) -> StoreResult<Value> {
        let mut apps = self.apps.write().map_err(Self::poisoned)?;

        let slot = apps
            .get_mut(app_name)
            .and_then(|prefs| prefs.get_mut(key))
            .ok_or_else(|| StoreError::NotFound {
                app_name: app_name.to_string(),
                key: key.to_string(),
            })?;
        *slot = value.clone();

        Ok(value)
    }

    async fn delete_preference(&self, app_name: &str, key: &str) -> StoreResult<()> {
        let mut apps = self.apps.write().map_err(Self::poisoned)?;

        if let Some(prefs) = apps.get_mut(app_name) {
            prefs.shift_remove(key);
        }

        Ok(())
    }
}
