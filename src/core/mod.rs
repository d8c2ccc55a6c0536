//! Core module containing the filter model, store contract and streams

pub mod error;
pub mod filter;
pub mod identity;
pub mod preference;
pub mod stream;

pub use error::{FilterError, FilterResult, StoreError, StoreResult};
pub use filter::{DefaultFilter, FilterDefinition, default_filters};
pub use identity::{IdentityProvider, StaticIdentity, UserInfo};
pub use preference::{PreferenceEntry, PreferenceList, PreferenceStore};
pub use stream::{FilterStreams, FilterSubscription};
