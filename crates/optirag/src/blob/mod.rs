//! Object store client
//!
//! Keyed blob access for the routing metadata and the ingestion glue.
//! "Key not found" is a distinct error variant; the router degrades the
//! same way for every failure here but preserves the underlying reason
//! for logging.

pub mod http;
pub mod memory;

pub use http::{HttpBlobStore, HttpBlobStoreConfig};
pub use memory::MemoryBlobStore;

use async_trait::async_trait;

/// Errors raised by blob store operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum BlobError {
    /// Key does not exist
    #[error("object not found: {0}")]
    NotFound(String),
    /// Access denied by the store
    #[error("access denied for object: {0}")]
    AccessDenied(String),
    /// Transport-level failure
    #[error("blob store request failed: {0}")]
    Request(String),
    /// Store answered with an unexpected status
    #[error("blob store returned status {status} for object {key}")]
    Status { key: String, status: u16 },
    /// Other error
    #[error("blob store error: {0}")]
    Other(String),
}

/// Result alias for blob store operations.
pub type BlobResult<T> = Result<T, BlobError>;

/// Keyed object storage.
///
/// Implementations own their own timeout and retry policy; callers impose
/// none on top.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Retrieve an object.
    async fn get(&self, key: &str) -> BlobResult<Vec<u8>>;

    /// Store an object, replacing any existing value.
    async fn put(&self, key: &str, body: Vec<u8>) -> BlobResult<()>;

    /// Check whether an object exists.
    async fn exists(&self, key: &str) -> BlobResult<bool>;

    /// Delete an object. Deleting a missing key is not an error.
    async fn delete(&self, key: &str) -> BlobResult<()>;

    /// List object keys under a prefix.
    async fn list(&self, prefix: &str) -> BlobResult<Vec<String>>;
}
