//! Client-side building blocks for the studio admin dashboard.
//!
//! - `pagination`: page navigation metadata that never goes out of range
//! - `collection`: the generic fetch/render/mutate/re-fetch list controller
//! - `sources`: page sources for users, bookings, contact messages and classes
//! - `api`: authenticated HTTP client for the studio API
//! - `storage`: injected key-value capability for session state
//! - `debounce`: delays input until it settles
//! - `config`: client settings from defaults, `admin.toml` and environment

pub mod api;
pub mod collection;
pub mod config;
pub mod debounce;
pub mod error;
pub mod pagination;
pub mod sources;
pub mod storage;

pub use api::ApiClient;
pub use collection::{LoadState, Page, PageRequest, PageSource, RemoteCollection};
pub use config::{load_settings, ClientSettings};
pub use debounce::{debounce, DebounceSender};
pub use error::ClientError;
pub use pagination::{PageInfo, PaginationError, Paginator};
pub use sources::{BookingSource, ClassSource, ContactSource, UserSource};
pub use storage::{FileStore, KeyValueStore, MemoryStore, StoreError};

#[cfg(test)]
#[path = "tests/fake_studio.rs"]
mod test_support;
