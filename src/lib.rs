//! # Process Filters
//!
//! Saved process-instance filters for process-automation front-ends, kept per
//! application and per user in a key-value preference store.
//!
//! ## Features
//!
//! - **Lazy Defaults**: the first read for an application seeds the "All",
//!   "Running" and "Completed" filters
//! - **Observable Sets**: every set read or written is published to a
//!   per-application stream and to a shared "last addressed" stream
//! - **Whole-Set Writes**: add, update and delete re-read the stored set and
//!   write it back in one call
//! - **Pluggable Stores**: in-memory, local JSON file, or the remote preference
//!   REST API (`http` feature)
//! - **Per-User Keys**: sets are stored under `process-filters-<app>-<user>`
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use process_filters::prelude::*;
//!
//! let service = FilterCacheService::new(
//!     Arc::new(InMemoryPreferenceStore::new()),
//!     Arc::new(StaticIdentity::new("alice")),
//! );
//!
//! // Loads in the background; the first item is the loaded set
//! let mut filters = service.get_filters("billing");
//! let defaults = filters.next().await.unwrap()?;
//!
//! let mine = FilterDefinition::new("mine", "My processes", "billing").with_status("RUNNING");
//! service.add_filter(mine).await?;
//! ```

pub mod config;
pub mod core;
pub mod service;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core ===
    pub use crate::core::{
        error::{FilterError, FilterResult, StoreError, StoreResult},
        filter::{DefaultFilter, FilterDefinition, default_filters},
        identity::{IdentityProvider, StaticIdentity, UserInfo},
        preference::{PreferenceEntry, PreferenceList, PreferenceStore},
        stream::FilterSubscription,
    };

    // === Service ===
    pub use crate::service::FilterCacheService;

    // === Storage ===
    #[cfg(feature = "http")]
    pub use crate::storage::HttpPreferenceStore;
    pub use crate::storage::{InMemoryPreferenceStore, JsonFilePreferenceStore};

    // === Config ===
    pub use crate::config::{FilterServiceConfig, StoreConfig};

    // === External dependencies ===
    pub use async_trait::async_trait;
    pub use std::sync::Arc;
}
