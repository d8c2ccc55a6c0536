//! Filter cache service
//!
//! [`FilterCacheService`] serves a user's saved filters for an application:
//!
//! - reads go to the preference store under a key derived from the app name
//!   and the current user, seeding the default filters when nothing is stored
//! - every mutation re-reads the whole set, changes it and writes it back
//! - every set read or written is published to the app's stream and to the
//!   shared stream (see [`FilterStreams`])
//!
//! Store failures surface as [`FilterError::Server`] and leave the streams
//! untouched. Nothing is retried.
//!
//! Writers to the same key are not coordinated unless
//! [`FilterServiceConfig::serialize_writes`] is set; by default two concurrent
//! mutations can lose one another's changes.

mod locks;

use crate::config::FilterServiceConfig;
use crate::core::error::{FilterError, FilterResult, StoreError};
use crate::core::filter::FilterDefinition;
use crate::core::identity::{IdentityProvider, preference_key};
use crate::core::preference::PreferenceStore;
use crate::core::stream::{FilterStreams, FilterSubscription};
use locks::KeyLocks;
use serde_json::Value;
use std::sync::Arc;
use validator::Validate;

/// Preference-backed cache of filter sets
///
/// Cheap to clone; clones share the store, streams and locks.
#[derive(Clone)]
pub struct FilterCacheService {
    store: Arc<dyn PreferenceStore>,
    identity: Arc<dyn IdentityProvider>,
    config: Arc<FilterServiceConfig>,
    streams: Arc<FilterStreams>,
    locks: Arc<KeyLocks>,
}

impl FilterCacheService {
    /// Create a service with the default configuration
    pub fn new(store: Arc<dyn PreferenceStore>, identity: Arc<dyn IdentityProvider>) -> Self {
        Self::with_config(store, identity, FilterServiceConfig::default())
    }

    pub fn with_config(
        store: Arc<dyn PreferenceStore>,
        identity: Arc<dyn IdentityProvider>,
        config: FilterServiceConfig,
    ) -> Self {
        Self {
            store,
            identity,
            config: Arc::new(config),
            streams: Arc::new(FilterStreams::new()),
            locks: Arc::new(KeyLocks::default()),
        }
    }

    /// Build the configured store and a service on top of it
    pub fn from_config(
        config: FilterServiceConfig,
        identity: Arc<dyn IdentityProvider>,
    ) -> anyhow::Result<Self> {
        let store = config.store.build()?;
        Ok(Self::with_config(store, identity, config))
    }

    /// A service acting for another user, sharing store, streams and locks
    pub fn with_identity(&self, identity: Arc<dyn IdentityProvider>) -> Self {
        Self {
            identity,
            ..self.clone()
        }
    }

    pub fn config(&self) -> &FilterServiceConfig {
        &self.config
    }

    /// Key of the current user's filter set for an application
    pub fn preference_key(&self, app_name: &str) -> String {
        let user = self.identity.current_user_info();
        preference_key(&self.config.key_prefix, app_name, &user.username)
    }

    /// Subscribe to an application's filter stream without loading anything
    pub fn subscribe(&self, app_name: &str) -> FilterSubscription {
        self.streams.subscribe(&self.preference_key(app_name))
    }

    /// Subscribe to the stream of whichever application was addressed last
    pub fn filters(&self) -> FilterSubscription {
        self.streams.subscribe_shared()
    }

    /// Get an application's filters
    ///
    /// Returns at once and loads in the background (seeding the defaults if
    /// needed). The subscription's first item is the load's outcome, a
    /// validation error for an empty app name. Must be called from within a
    /// tokio runtime.
    pub fn get_filters(&self, app_name: &str) -> FilterSubscription {
        let subscription = self.subscribe(app_name);

        let service = self.clone();
        let app_name = app_name.to_string();
        let load = tokio::spawn(async move { service.load_filters(&app_name).await });

        subscription.with_pending(load)
    }

    /// Load an application's filters, seeding the defaults if none are stored
    pub async fn load_filters(&self, app_name: &str) -> FilterResult<Vec<FilterDefinition>> {
        require_app_name(app_name)?;
        let key = self.preference_key(app_name);
        tracing::debug!(app_name = %app_name, key = %key, "Loading filters");

        let filters = self
            .fetch_or_seed(app_name, &key)
            .await
            .inspect_err(|e| log_failure("load", app_name, e))?;

        self.streams.publish(&key, &filters);
        Ok(filters)
    }

    /// Find one of an application's filters by id
    ///
    /// Seeds the defaults first if the set is empty. An unknown id is
    /// `Ok(None)`. The streams are not updated.
    pub async fn get_filter_by_id(
        &self,
        app_name: &str,
        id: &str,
    ) -> FilterResult<Option<FilterDefinition>> {
        require_app_name(app_name)?;
        let key = self.preference_key(app_name);

        self.find_in_set(app_name, &key, id)
            .await
            .inspect_err(|e| log_failure("get_by_id", app_name, e))
    }

    /// Add a filter to its application's set
    ///
    /// When no set exists yet, it is created with this filter alone; the
    /// defaults are not seeded.
    pub async fn add_filter(&self, filter: FilterDefinition) -> FilterResult<Vec<FilterDefinition>> {
        filter.validate()?;
        let key = self.preference_key(&filter.app_name);
        let _guard = self.locks.acquire(&key, self.config.serialize_writes).await;

        let app_name = filter.app_name.clone();
        let filters = self
            .append_to_set(&key, filter)
            .await
            .inspect_err(|e| log_failure("add", &app_name, e))?;

        self.streams.publish(&key, &filters);
        Ok(filters)
    }

    /// Replace the filter with the same id in its application's set
    ///
    /// When no set exists yet, it is created with this filter alone. An id
    /// missing from an existing set is `FilterError::FilterNotFound` and
    /// nothing is written.
    pub async fn update_filter(
        &self,
        filter: FilterDefinition,
    ) -> FilterResult<Vec<FilterDefinition>> {
        filter.validate()?;
        let key = self.preference_key(&filter.app_name);
        let _guard = self.locks.acquire(&key, self.config.serialize_writes).await;

        let app_name = filter.app_name.clone();
        let filters = self
            .replace_in_set(&key, filter)
            .await
            .inspect_err(|e| log_failure("update", &app_name, e))?;

        self.streams.publish(&key, &filters);
        Ok(filters)
    }

    /// Remove the filter with the same id from its application's set
    ///
    /// `Ok(None)` when the set is empty: nothing is written or published.
    pub async fn delete_filter(
        &self,
        filter: &FilterDefinition,
    ) -> FilterResult<Option<Vec<FilterDefinition>>> {
        filter.validate()?;
        let app_name = filter.app_name.as_str();
        let key = self.preference_key(app_name);
        let _guard = self.locks.acquire(&key, self.config.serialize_writes).await;

        let removed = self
            .remove_from_set(&key, filter)
            .await
            .inspect_err(|e| log_failure("delete", app_name, e))?;

        match removed {
            Some(filters) => {
                self.streams.publish(&key, &filters);
                Ok(Some(filters))
            }
            None => {
                tracing::debug!(app_name = %app_name, key = %key, "No filters to delete from");
                Ok(None)
            }
        }
    }

    async fn find_in_set(
        &self,
        app_name: &str,
        key: &str,
        id: &str,
    ) -> FilterResult<Option<FilterDefinition>> {
        let mut filters = self.read_set(app_name, key).await?;
        if filters.is_empty() {
            filters = self.seed_defaults(app_name, key).await?;
        }
        Ok(filters.into_iter().find(|filter| filter.id == id))
    }

    async fn append_to_set(
        &self,
        key: &str,
        mut filter: FilterDefinition,
    ) -> FilterResult<Vec<FilterDefinition>> {
        let app_name = filter.app_name.clone();
        let mut filters = self.read_set(&app_name, key).await?;
        filter.ensure_id();

        if filters.is_empty() {
            self.create_set(&app_name, key, vec![filter]).await
        } else {
            filters.push(filter);
            self.update_set(&app_name, key, filters).await
        }
    }

    async fn replace_in_set(
        &self,
        key: &str,
        filter: FilterDefinition,
    ) -> FilterResult<Vec<FilterDefinition>> {
        let app_name = filter.app_name.clone();
        let mut filters = self.read_set(&app_name, key).await?;
        if filters.is_empty() {
            return self.create_set(&app_name, key, vec![filter]).await;
        }

        let slot = filters
            .iter_mut()
            .find(|existing| existing.id == filter.id)
            .ok_or_else(|| FilterError::FilterNotFound {
                app_name: app_name.clone(),
                id: filter.id.clone(),
            })?;
        *slot = filter;

        self.update_set(&app_name, key, filters).await
    }

    async fn remove_from_set(
        &self,
        key: &str,
        filter: &FilterDefinition,
    ) -> FilterResult<Option<Vec<FilterDefinition>>> {
        let app_name = filter.app_name.as_str();
        let mut filters = self.read_set(app_name, key).await?;
        if filters.is_empty() {
            return Ok(None);
        }

        filters.retain(|existing| existing.id != filter.id);
        self.update_set(app_name, key, filters).await.map(Some)
    }

    async fn fetch_or_seed(&self, app_name: &str, key: &str) -> FilterResult<Vec<FilterDefinition>> {
        let preferences = self.store.get_preferences(app_name, key).await?;

        let stored = match preferences.find(key) {
            Some(entry) => decode_filters(entry.decode()?)?,
            None => Vec::new(),
        };

        if stored.is_empty() {
            self.seed_defaults(app_name, key).await
        } else {
            Ok(stored)
        }
    }

    async fn seed_defaults(&self, app_name: &str, key: &str) -> FilterResult<Vec<FilterDefinition>> {
        let defaults: Vec<FilterDefinition> = self
            .config
            .default_filters
            .iter()
            .map(|template| template.for_app(app_name))
            .collect();

        tracing::info!(
            app_name = %app_name,
            key = %key,
            count = defaults.len(),
            "Creating default filters"
        );
        self.create_set(app_name, key, defaults).await
    }

    async fn read_set(&self, app_name: &str, key: &str) -> FilterResult<Vec<FilterDefinition>> {
        match self.store.get_preference_by_key(app_name, key).await? {
            Some(value) => decode_filters(value),
            None => Ok(Vec::new()),
        }
    }

    async fn create_set(
        &self,
        app_name: &str,
        key: &str,
        mut filters: Vec<FilterDefinition>,
    ) -> FilterResult<Vec<FilterDefinition>> {
        filters.iter_mut().for_each(FilterDefinition::ensure_id);
        let stored = self
            .store
            .create_preference(app_name, key, encode_filters(&filters)?)
            .await?;
        decode_filters(stored)
    }

    async fn update_set(
        &self,
        app_name: &str,
        key: &str,
        filters: Vec<FilterDefinition>,
    ) -> FilterResult<Vec<FilterDefinition>> {
        let stored = self
            .store
            .update_preference(app_name, key, encode_filters(&filters)?)
            .await?;
        decode_filters(stored)
    }
}

fn require_app_name(app_name: &str) -> FilterResult<()> {
    if app_name.is_empty() {
        return Err(FilterError::Validation("app_name must not be empty".to_string()));
    }
    Ok(())
}

fn encode_filters(filters: &[FilterDefinition]) -> FilterResult<Value> {
    serde_json::to_value(filters).map_err(|e| StoreError::from(e).into())
}

fn decode_filters(value: Value) -> FilterResult<Vec<FilterDefinition>> {
    if value.is_null() {
        return Ok(Vec::new());
    }
    serde_json::from_value(value).map_err(|e| StoreError::from(e).into())
}

fn log_failure(operation: &str, app_name: &str, error: &FilterError) {
    match error {
        FilterError::Server(_) | FilterError::Internal(_) => tracing::warn!(
            operation = operation,
            app_name = %app_name,
            error = %error,
            "Filter operation failed"
        ),
        _ => tracing::debug!(
            operation = operation,
            app_name = %app_name,
            error = %error,
            "Filter operation rejected"
        ),
    }
}
