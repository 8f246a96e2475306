//! In-memory blob store
//!
//! Backed by a plain map. Suitable for tests and local demos; the router
//! only needs the `get` contract.

use super::{BlobError, BlobResult, BlobStore};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::BTreeMap;

/// In-memory blob store.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    objects: RwLock<BTreeMap<String, Vec<u8>>>,
}

impl MemoryBlobStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an object, builder-style.
    pub fn with_object(self, key: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        self.objects.write().insert(key.into(), body.into());
        self
    }

    /// Number of stored objects.
    pub fn len(&self) -> usize {
        self.objects.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.read().is_empty()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn get(&self, key: &str) -> BlobResult<Vec<u8>> {
        self.objects
            .read()
            .get(key)
            .cloned()
            .ok_or_else(|| BlobError::NotFound(key.to_string()))
    }

    async fn put(&self, key: &str, body: Vec<u8>) -> BlobResult<()> {
        self.objects.write().insert(key.to_string(), body);
        Ok(())
    }

    async fn exists(&self, key: &str) -> BlobResult<bool> {
        Ok(self.objects.read().contains_key(key))
    }

    async fn delete(&self, key: &str) -> BlobResult<()> {
        self.objects.write().remove(key);
        Ok(())
    }

    async fn list(&self, prefix: &str) -> BlobResult<Vec<String>> {
        Ok(self
            .objects
            .read()
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let store = MemoryBlobStore::new();
        let err = store.get("missing").await.unwrap_err();
        assert!(matches!(err, BlobError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_put_get_round_trip() {
        let store = MemoryBlobStore::new();
        store.put("a/b", b"payload".to_vec()).await.unwrap();
        assert_eq!(store.get("a/b").await.unwrap(), b"payload");
        assert!(store.exists("a/b").await.unwrap());
    }

    #[tokio::test]
    async fn test_list_by_prefix() {
        let store = MemoryBlobStore::new()
            .with_object("centroids/databases.json", "{}")
            .with_object("centroids/archive.json", "{}")
            .with_object("documents/a.pdf", "x");
        let keys = store.list("centroids/").await.unwrap();
        assert_eq!(keys.len(), 2);
    }

    #[tokio::test]
    async fn test_delete_missing_is_ok() {
        let store = MemoryBlobStore::new();
        store.delete("nope").await.unwrap();
    }
}
