//! Tests for the typed error handling system
//!
//! These tests verify that:
//! - Error codes are stable
//! - Server errors keep the original store error
//! - Error matching allows clients to handle specific cases

use process_filters::prelude::*;
use std::error::Error;

// =============================================================================
// Error Code Tests
// =============================================================================

mod error_code_tests {
    use super::*;

    #[test]
    fn test_filter_error_codes() {
        assert_eq!(FilterError::server().error_code(), "SERVER_ERROR");
        assert_eq!(
            FilterError::FilterNotFound {
                app_name: "billing".to_string(),
                id: "x".to_string(),
            }
            .error_code(),
            "FILTER_NOT_FOUND"
        );
        assert_eq!(
            FilterError::Validation("bad".to_string()).error_code(),
            "FILTER_VALIDATION_ERROR"
        );
        assert_eq!(
            FilterError::Internal("boom".to_string()).error_code(),
            "INTERNAL_ERROR"
        );
    }

    #[test]
    fn test_store_error_codes() {
        let not_found = StoreError::NotFound {
            app_name: "billing".to_string(),
            key: "k".to_string(),
        };
        assert_eq!(not_found.error_code(), "PREFERENCE_NOT_FOUND");
        assert_eq!(
            StoreError::Transport("refused".to_string()).error_code(),
            "STORE_TRANSPORT_ERROR"
        );
        assert_eq!(
            StoreError::Http {
                status: 500,
                message: String::new(),
            }
            .error_code(),
            "STORE_HTTP_ERROR"
        );
    }
}

// =============================================================================
// Message Tests
// =============================================================================

mod message_tests {
    use super::*;

    #[test]
    fn test_server_error_default_message() {
        assert_eq!(FilterError::server().to_string(), "Server error");
        assert!(FilterError::server().source().is_none());
    }

    #[test]
    fn test_server_error_wraps_store_error() {
        let err = FilterError::from(StoreError::NotFound {
            app_name: "billing".to_string(),
            key: "process-filters-billing-bob".to_string(),
        });

        assert_eq!(
            err.to_string(),
            "preference 'process-filters-billing-bob' not found for app 'billing'"
        );
        assert!(err.source().is_some());
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only");
        let err: FilterError = StoreError::from(io).into();

        assert!(matches!(err.store_error(), Some(StoreError::Io(_))));
        assert!(err.to_string().contains("read-only"));
    }

    #[test]
    fn test_filter_not_found_message() {
        let err = FilterError::FilterNotFound {
            app_name: "billing".to_string(),
            id: "f-1".to_string(),
        };
        assert_eq!(err.to_string(), "filter 'f-1' not found for app 'billing'");
    }
}

// =============================================================================
// Matching Tests
// =============================================================================

mod matching_tests {
    use super::*;

    #[tokio::test]
    async fn test_client_can_match_not_found_update() {
        let service = FilterCacheService::new(
            Arc::new(InMemoryPreferenceStore::new()),
            Arc::new(StaticIdentity::new("alice")),
        );
        service.load_filters("billing").await.unwrap();

        let ghost = FilterDefinition::new("ghost", "Ghost", "billing").with_id("ghost");
        match service.update_filter(ghost).await {
            Err(FilterError::FilterNotFound { id, app_name }) => {
                assert_eq!(id, "ghost");
                assert_eq!(app_name, "billing");
            }
            other => panic!("expected FilterNotFound, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_client_can_match_validation_error() {
        let service = FilterCacheService::new(
            Arc::new(InMemoryPreferenceStore::new()),
            Arc::new(StaticIdentity::new("alice")),
        );

        let result = service
            .delete_filter(&FilterDefinition::new("k", "n", ""))
            .await;
        assert!(matches!(result, Err(FilterError::Validation(_))));
    }
}
