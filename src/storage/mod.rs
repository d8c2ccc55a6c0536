//! Storage implementations for different backends

pub mod file;
#[cfg(feature = "http")]
pub mod http;
pub mod in_memory;

pub use file::JsonFilePreferenceStore;
#[cfg(feature = "http")]
pub use http::HttpPreferenceStore;
pub use in_memory::InMemoryPreferenceStore;
