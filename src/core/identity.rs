//! Current-user identity used to scope filter sets
//!
//! Filter sets are stored per application and per user. The user is supplied
//! by an [`IdentityProvider`] injected into the service, so several users can
//! be simulated side by side in one process.

use serde::{Deserialize, Serialize};

/// The part of the signed-in user's profile the filter cache needs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    pub username: String,
}

impl UserInfo {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
        }
    }
}

/// Synchronous source of the current user
///
/// Must not fail: keys are derived from it before any I/O happens.
pub trait IdentityProvider: Send + Sync {
    fn current_user_info(&self) -> UserInfo;
}

/// Fixed identity, for services bound to one user and for tests
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticIdentity {
    user: UserInfo,
}

impl StaticIdentity {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            user: UserInfo::new(username),
        }
    }
}

impl IdentityProvider for StaticIdentity {
    fn current_user_info(&self) -> UserInfo {
        self.user.clone()
    }
}

/// Storage key of a user's filter set for an application
///
/// `"{prefix}-{app_name}-{username}"`, e.g. `process-filters-billing-alice`.
pub fn preference_key(prefix: &str, app_name: &str, username: &str) -> String {
    format!("{}-{}-{}", prefix, app_name, username)
}
