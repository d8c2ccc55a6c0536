//! JSON file implementation of PreferenceStore
//!
//! Keeps every application's preferences in one JSON document:
//!
//! ```json
//! { "billing": { "process-filters-billing-alice": [ ... ] } }
//! ```
//!
//! Each write replaces the file atomically (temporary file, then rename).
//! Operations are serialized through an async mutex, so one store instance
//! never interleaves its own reads and writes. Separate instances on the same
//! path do not coordinate.

use crate::core::error::{StoreError, StoreResult};
use crate::core::preference::{PreferenceEntry, PreferenceList, PreferenceStore};
use async_trait::async_trait;
use indexmap::IndexMap;
use serde_json::Value;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

type Document = IndexMap<String, IndexMap<String, Value>>;

/// Preference store persisted to a local JSON file
pub struct JsonFilePreferenceStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFilePreferenceStore {
    /// Create a store backed by `path`; the file is created on first write
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> StoreResult<Document> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.is_empty() => Ok(Document::new()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Document::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, document: &Document) -> StoreResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let bytes = serde_json::to_vec_pretty(document)?;
        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;

        tracing::debug!(path = %self.path.display(), apps = document.len(), "Saved preference file");
        Ok(())
    }
}

#[async_trait]
impl PreferenceStore for JsonFilePreferenceStore {
    async fn get_preferences(&self, app_name: &str, _key: &str) -> StoreResult<PreferenceList> {
        let _guard = self.lock.lock().await;
        let document = self.load().await?;

        let entries = match document.get(app_name) {
            Some(prefs) => prefs
                .iter()
                .map(|(key, value)| PreferenceEntry::encode(key, value))
                .collect::<StoreResult<Vec<_>>>()?,
            None => Vec::new(),
        };

        Ok(PreferenceList::from_entries(entries))
    }

    async fn get_preference_by_key(&self, app_name: &str, key: &str) -> StoreResult<Option<Value>> {
        let _guard = self.lock.lock().await;
        let document = self.load().await?;

        Ok(document.get(app_name).and_then(|prefs| prefs.get(key)).cloned())
    }

    async fn create_preference(&self, app_name: &str, key: &str, value: Value) -> StoreResult<Value> {
        let _guard = self.lock.lock().await;
        let mut document = self.load().await?;

        document
            .entry(app_name.to_string())
            .or_default()
            .insert(key.to_string(), value.clone());
        self.save(&document).await?;

        Ok(value)
    }

    async fn update_preference(&self, app_name: &str, key: &str, value: Value) -> StoreResult<Value> {
        let _guard = self.lock.lock().await;
        let mut document = self.load().await?;

        let slot = document
            .get_mut(app_name)
            .and_then(|prefs| prefs.get_mut(key))
            .ok_or_else(|| StoreError::NotFound {
                app_name: app_name.to_string(),
                key: key.to_string(),
            })?;
        *slot = value.clone();
        self.save(&document).await?;

        Ok(value)
    }

    async fn delete_preference(&self, app_name: &str, key: &str) -> StoreResult<()> {
        let _guard = self.lock.lock().await;
        let mut document = self.load().await?;

        let removed = document
            .get_mut(app_name)
            .and_then(|prefs| prefs.shift_remove(key))
            .is_some();
        if removed {
            self.save(&document).await?;
        }

        Ok(())
    }
}
