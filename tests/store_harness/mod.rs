//! Shared test harness for preference store testing
//!
//! Provides filter fixtures, a [`ScriptedStore`] wrapper that can delay or
//! fail calls, and the `preference_store_tests!` contract suite.
//!
//! # Usage
//!
//! From any integration test file in `tests/`:
//! ```rust,ignore
//! #[macro_use]
//! mod store_harness;
//! use store_harness::*;
//! ```

#![allow(dead_code)]

#[macro_use]
pub mod preference_store_tests;

use async_trait::async_trait;
use process_filters::core::error::{StoreError, StoreResult};
use process_filters::core::filter::FilterDefinition;
use process_filters::core::preference::{PreferenceList, PreferenceStore};
use process_filters::storage::InMemoryPreferenceStore;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// A user-defined filter with a fixed id
pub fn custom_filter(id: &str, app_name: &str) -> FilterDefinition {
    FilterDefinition::new(format!("custom-{}", id), format!("Custom {}", id), app_name)
        .with_id(id)
        .with_icon("star")
        .with_sort("name")
        .with_status("SUSPENDED")
        .with_order("ASC")
}

/// Statuses of a filter set, in order
pub fn statuses(filters: &[FilterDefinition]) -> Vec<String> {
    filters.iter().map(|f| f.status.clone()).collect()
}

/// Ids of a filter set, in order
pub fn ids(filters: &[FilterDefinition]) -> Vec<String> {
    filters.iter().map(|f| f.id.clone()).collect()
}

// ---------------------------------------------------------------------------
// ScriptedStore — in-memory store with injectable delays and failures
// ---------------------------------------------------------------------------

/// In-memory store whose calls can be slowed down per app or made to fail
#[derive(Clone, Default)]
pub struct ScriptedStore {
    pub inner: InMemoryPreferenceStore,
    delays: Arc<Mutex<HashMap<String, Duration>>>,
    fail_reads: Arc<AtomicBool>,
    fail_writes: Arc<AtomicBool>,
    create_attempts: Arc<AtomicUsize>,
    creates: Arc<AtomicUsize>,
    updates: Arc<AtomicUsize>,
}

impl ScriptedStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every read for `app_name`
    pub fn delay_reads(&self, app_name: &str, delay: Duration) {
        self.delays
            .lock()
            .unwrap()
            .insert(app_name.to_string(), delay);
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Create calls received, including rejected ones
    pub fn create_attempts(&self) -> usize {
        self.create_attempts.load(Ordering::SeqCst)
    }

    /// Create calls that reached the inner store
    pub fn creates(&self) -> usize {
        self.creates.load(Ordering::SeqCst)
    }

    pub fn updates(&self) -> usize {
        self.updates.load(Ordering::SeqCst)
    }

    async fn before_read(&self, app_name: &str) -> StoreResult<()> {
        let delay = self.delays.lock().unwrap().get(app_name).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("network unreachable".to_string()));
        }
        Ok(())
    }

    fn before_write(&self) -> StoreResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Http {
                status: 500,
                message: "write rejected".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl PreferenceStore for ScriptedStore {
    async fn get_preferences(&self, app_name: &str, key: &str) -> StoreResult<PreferenceList> {
        self.before_read(app_name).await?;
        self.inner.get_preferences(app_name, key).await
    }

    async fn get_preference_by_key(&self, app_name: &str, key: &str) -> StoreResult<Option<Value>> {
        self.before_read(app_name).await?;
        self.inner.get_preference_by_key(app_name, key).await
    }

    async fn create_preference(&self, app_name: &str, key: &str, value: Value) -> StoreResult<Value> {
        self.create_attempts.fetch_add(1, Ordering::SeqCst);
        self.before_write()?;
        self.creates.fetch_add(1, Ordering::SeqCst);
        self.inner.create_preference(app_name, key, value).await
    }

    async fn update_preference(&self, app_name: &str, key: &str, value: Value) -> StoreResult<Value> {
        self.before_write()?;
        self.updates.fetch_add(1, Ordering::SeqCst);
        self.inner.update_preference(app_name, key, value).await
    }

    async fn delete_preference(&self, app_name: &str, key: &str) -> StoreResult<()> {
        self.before_write()?;
        self.inner.delete_preference(app_name, key).await
    }
}
