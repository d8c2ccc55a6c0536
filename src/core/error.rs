//! Typed error handling for the filter cache
//!
//! Two layers of errors exist:
//!
//! - [`StoreError`]: failures reported by a [`PreferenceStore`](crate::core::PreferenceStore)
//!   backend (network, I/O, missing entries, malformed payloads)
//! - [`FilterError`]: what the public operations of
//!   [`FilterCacheService`](crate::service::FilterCacheService) return
//!
//! Every store failure is converted exactly once, at the boundary of a public
//! operation, into [`FilterError::Server`]. The original store error is kept
//! as the source so callers can still match on it.
//!
//! # Example
//!
//! ```rust,ignore
//! match service.update_filter(filter).await {
//!     Ok(filters) => println!("{} filters", filters.len()),
//!     Err(FilterError::FilterNotFound { id, .. }) => println!("no filter {}", id),
//!     Err(e) => eprintln!("{} ({})", e, e.error_code()),
//! }
//! ```

use thiserror::Error;

/// Message used when a store failure carries no detail of its own
pub const SERVER_ERROR_MESSAGE: &str = "Server error";

// =============================================================================
// Store Errors
// =============================================================================

/// Errors raised by preference store backends
#[derive(Debug, Error)]
pub enum StoreError {
    /// No preference entry exists for this key
    #[error("preference '{key}' not found for app '{app_name}'")]
    NotFound { app_name: String, key: String },

    /// The backend refused or could not serve the request
    #[error("preference store unavailable: {0}")]
    Unavailable(String),

    /// A stored value could not be encoded or decoded
    #[error("preference serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Local persistence failed
    #[error("preference store I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The remote preference API answered with a non-success status
    #[error("preference API returned {status}: {message}")]
    Http { status: u16, message: String },

    /// The request never reached the remote preference API
    #[error("preference API transport error: {0}")]
    Transport(String),
}

impl StoreError {
    pub fn error_code(&self) -> &'static str {
        match self {
            StoreError::NotFound { .. } => "PREFERENCE_NOT_FOUND",
            StoreError::Unavailable(_) => "STORE_UNAVAILABLE",
            StoreError::Serialization(_) => "STORE_SERIALIZATION_ERROR",
            StoreError::Io(_) => "STORE_IO_ERROR",
            StoreError::Http { .. } => "STORE_HTTP_ERROR",
            StoreError::Transport(_) => "STORE_TRANSPORT_ERROR",
        }
    }
}

// =============================================================================
// Filter Errors
// =============================================================================

/// Errors returned by filter cache operations
#[derive(Debug, Error)]
pub enum FilterError {
    /// The preference store failed; the original error is kept when there is one
    #[error("{}", server_message(.0))]
    Server(#[source] Option<StoreError>),

    /// `update_filter` was given a filter whose id is not in the stored set
    #[error("filter '{id}' not found for app '{app_name}'")]
    FilterNotFound { app_name: String, id: String },

    /// The filter failed validation before anything was written
    #[error("invalid filter: {0}")]
    Validation(String),

    /// A background load task could not complete
    #[error("internal error: {0}")]
    Internal(String),
}

fn server_message(source: &Option<StoreError>) -> String {
    match source {
        Some(err) => err.to_string(),
        None => SERVER_ERROR_MESSAGE.to_string(),
    }
}

impl FilterError {
    /// A server error with no underlying detail
    pub fn server() -> Self {
        FilterError::Server(None)
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            FilterError::Server(_) => "SERVER_ERROR",
            FilterError::FilterNotFound { .. } => "FILTER_NOT_FOUND",
            FilterError::Validation(_) => "FILTER_VALIDATION_ERROR",
            FilterError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// The store error behind a server failure, if any
    pub fn store_error(&self) -> Option<&StoreError> {
        match self {
            FilterError::Server(source) => source.as_ref(),
            _ => None,
        }
    }
}

impl From<StoreError> for FilterError {
    fn from(err: StoreError) -> Self {
        FilterError::Server(Some(err))
    }
}

impl From<validator::ValidationErrors> for FilterError {
    fn from(errors: validator::ValidationErrors) -> Self {
        FilterError::Validation(errors.to_string())
    }
}

/// Result alias for filter cache operations
pub type FilterResult<T> = Result<T, FilterError>;

/// Result alias for preference store backends
pub type StoreResult<T> = Result<T, StoreError>;
