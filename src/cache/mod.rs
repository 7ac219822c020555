//! Named, versioned cache stores
//!
//! A cache store maps a request identity to a captured response. Stores are
//! named `<prefix>-v<version>`; one store is current per worker version and
//! every other store is purged when that version activates.
//!
//! # Backends
//!
//! | Backend | Persistence | Used by |
//! |---------|-------------|---------|
//! | [`MemoryCacheStorage`] | process lifetime | tests, embedding |
//! | [`DiskCacheStorage`] | directory per store | CLI |

pub mod disk;
pub mod memory;
pub mod name;

pub use disk::DiskCacheStorage;
pub use memory::MemoryCacheStorage;
pub use name::CacheName;

use crate::error::SwResult;
use crate::http::{RequestKey, Response};
use async_trait::async_trait;

/// Storage for every cache store the worker can see
///
/// Implementations must make individual `put`, `match_in` and `delete`
/// calls atomic per key; callers add no locking of their own.
#[async_trait]
pub trait CacheStorage: Send + Sync {
    /// Create the store if it does not exist yet
    async fn open(&self, name: &str) -> SwResult<()>;

    /// Whether a store with this name exists
    async fn has(&self, name: &str) -> SwResult<bool>;

    /// Names of all stores, in creation order
    async fn keys(&self) -> SwResult<Vec<String>>;

    /// Delete a store and all its entries. Returns false if it did not exist.
    async fn delete(&self, name: &str) -> SwResult<bool>;

    /// Exact-match lookup in a single store
    async fn match_in(&self, name: &str, key: &RequestKey) -> SwResult<Option<Response>>;

    /// Store a response, creating the store if needed. Last write wins.
    async fn put(&self, name: &str, key: &RequestKey, response: &Response) -> SwResult<()>;

    /// Store a batch of responses. Either every entry becomes visible or none does.
    async fn put_all(&self, name: &str, entries: &[(RequestKey, Response)]) -> SwResult<()>;

    /// Request identities held by a store
    async fn entries(&self, name: &str) -> SwResult<Vec<RequestKey>>;

    /// Human-readable backend name for display
    fn backend_name(&self) -> &'static str;

    /// Exact-match lookup across every store, oldest store first
    async fn match_request(&self, key: &RequestKey) -> SwResult<Option<Response>> {
        for name in self.keys().await? {
            if let Some(response) = self.match_in(&name, key).await? {
                return Ok(Some(response));
            }
        }
        Ok(None)
    }
}
