//! Macro-generated test suite for `PreferenceStore` contract validation.
//!
//! The `preference_store_tests!` macro generates a test module that validates
//! any `PreferenceStore` implementation: listing, get by key, create, update,
//! delete, app isolation, and a filter service running on top of it.
//!
//! # Usage
//!
//! ```rust,ignore
//! #[macro_use]
//! mod store_harness;
//!
//! use store_harness::*;
//! use process_filters::storage::InMemoryPreferenceStore;
//!
//! preference_store_tests!(InMemoryPreferenceStore::new());
//! ```

/// Generate a full `PreferenceStore` conformance test suite.
///
/// `$factory` must be an expression that evaluates to a fresh store
/// implementing `PreferenceStore + 'static`. It is re-evaluated for each
/// test, inside the test's tokio runtime.
#[macro_export]
macro_rules! preference_store_tests {
    ($factory:expr) => {
        mod preference_store_contract_tests {
            use super::*;
            use process_filters::core::error::StoreError;
            use process_filters::core::identity::StaticIdentity;
            use process_filters::core::preference::PreferenceStore;
            use process_filters::service::FilterCacheService;
            use serde_json::json;
            use std::sync::Arc;

            const APP: &str = "billing";
            const KEY: &str = "process-filters-billing-alice";

            // ==================================================================
            // Reads
            // ==================================================================

            #[tokio::test]
            async fn test_list_empty_app() {
                let store = $factory;
                let list = store.get_preferences(APP, KEY).await.unwrap();
                assert!(list.is_empty());
            }

            #[tokio::test]
            async fn test_get_missing_key_is_none() {
                let store = $factory;
                let value = store.get_preference_by_key(APP, KEY).await.unwrap();
                assert!(value.is_none());
            }

            // ==================================================================
            // Writes
            // ==================================================================

            #[tokio::test]
            async fn test_create_and_get() {
                let store = $factory;
                let value = json!([{ "id": "1", "appName": APP }]);

                let created = store.create_preference(APP, KEY, value.clone()).await.unwrap();
                assert_eq!(created, value);

                let fetched = store.get_preference_by_key(APP, KEY).await.unwrap();
                assert_eq!(fetched, Some(value));
            }

            #[tokio::test]
            async fn test_created_entry_is_listed_encoded() {
                let store = $factory;
                let value = json!([{ "id": "1" }, { "id": "2" }]);
                store.create_preference(APP, KEY, value.clone()).await.unwrap();

                let list = store.get_preferences(APP, KEY).await.unwrap();
                let entry = list.find(KEY).expect("created entry should be listed");
                assert_eq!(entry.decode().unwrap(), value);
            }

            #[tokio::test]
            async fn test_update_replaces_value() {
                let store = $factory;
                store.create_preference(APP, KEY, json!([{ "id": "1" }])).await.unwrap();

                let updated = store
                    .update_preference(APP, KEY, json!([{ "id": "2" }]))
                    .await
                    .unwrap();
                assert_eq!(updated, json!([{ "id": "2" }]));

                let fetched = store.get_preference_by_key(APP, KEY).await.unwrap();
                assert_eq!(fetched, Some(json!([{ "id": "2" }])));
            }

            #[tokio::test]
            async fn test_update_missing_key_fails() {
                let store = $factory;
                let err = store
                    .update_preference(APP, KEY, json!([]))
                    .await
                    .unwrap_err();
                assert!(matches!(err, StoreError::NotFound { .. }));
            }

            #[tokio::test]
            async fn test_delete_removes_key() {
                let store = $factory;
                store.create_preference(APP, KEY, json!([])).await.unwrap();

                store.delete_preference(APP, KEY).await.unwrap();
                assert!(store.get_preference_by_key(APP, KEY).await.unwrap().is_none());
                assert!(store.get_preferences(APP, KEY).await.unwrap().find(KEY).is_none());
            }

            #[tokio::test]
            async fn test_delete_missing_key_is_ok() {
                let store = $factory;
                assert!(store.delete_preference(APP, KEY).await.is_ok());
            }

            #[tokio::test]
            async fn test_apps_are_isolated() {
                let store = $factory;
                store.create_preference("one", KEY, json!([1])).await.unwrap();
                store.create_preference("two", KEY, json!([2])).await.unwrap();

                assert_eq!(
                    store.get_preference_by_key("one", KEY).await.unwrap(),
                    Some(json!([1]))
                );
                assert_eq!(
                    store.get_preference_by_key("two", KEY).await.unwrap(),
                    Some(json!([2]))
                );
            }

            // ==================================================================
            // Filter service on top of the store
            // ==================================================================

            #[tokio::test]
            async fn test_filter_service_round_trip() {
                let store: Arc<dyn PreferenceStore> = Arc::new($factory);
                let service =
                    FilterCacheService::new(store, Arc::new(StaticIdentity::new("alice")));

                let defaults = service.load_filters(APP).await.unwrap();
                assert_eq!(statuses(&defaults), vec!["", "RUNNING", "COMPLETED"]);

                let added = service.add_filter(custom_filter("mine", APP)).await.unwrap();
                assert_eq!(added.len(), 4);

                let found = service.get_filter_by_id(APP, "mine").await.unwrap();
                assert_eq!(found, Some(custom_filter("mine", APP)));

                let reloaded = service.load_filters(APP).await.unwrap();
                assert_eq!(reloaded, added);
            }
        }
    };
}
