//! In-memory blob store provider for development and tests.

use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use bytes::Bytes;

use mediavault_core::error::AppError;
use mediavault_core::result::AppResult;
use mediavault_core::traits::BlobStore;

/// Blob store that keeps objects in process memory.
///
/// Mirrors the S3 provider's contract exactly, including the
/// no-overwrite rule, so the ingestion pipeline behaves identically in
/// tests.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    bucket: String,
    bucket_created: AtomicBool,
    objects: RwLock<HashMap<String, (Bytes, String)>>,
}

impl MemoryBlobStore {
    /// Create a new empty in-memory store.
    pub fn new(bucket: &str) -> Self {
        Self {
            bucket: bucket.to_string(),
            bucket_created: AtomicBool::new(false),
            objects: RwLock::new(HashMap::new()),
        }
    }

    /// Number of stored objects.
    pub fn object_count(&self) -> usize {
        match self.objects.read() {
            Ok(objects) => objects.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    /// Whether an object exists at `path`.
    pub fn contains(&self, path: &str) -> bool {
        match self.objects.read() {
            Ok(objects) => objects.contains_key(path),
            Err(poisoned) => poisoned.into_inner().contains_key(path),
        }
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    fn provider_type(&self) -> &str {
        "memory"
    }

    async fn ensure_bucket(&self) -> AppResult<()> {
        self.bucket_created.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn put(&self, path: &str, data: Bytes, content_type: &str) -> AppResult<()> {
        let mut objects = self
            .objects
            .write()
            .map_err(|_| AppError::storage("Memory store lock poisoned"))?;
        if objects.contains_key(path) {
            return Err(AppError::conflict(format!(
                "Object already exists at '{path}'"
            )));
        }
        objects.insert(path.to_string(), (data, content_type.to_string()));
        Ok(())
    }

    fn public_url(&self, path: &str) -> Option<String> {
        Some(format!("memory://{}/{path}", self.bucket))
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_rejects_overwrite() {
        let store = MemoryBlobStore::new("test");
        store.ensure_bucket().await.unwrap();
        store
            .put("a/b/1-x-f.jpg", Bytes::from_static(b"abc"), "image/jpeg")
            .await
            .unwrap();

        let err = store
            .put("a/b/1-x-f.jpg", Bytes::from_static(b"xyz"), "image/jpeg")
            .await
            .unwrap_err();
        assert_eq!(err.kind, mediavault_core::ErrorKind::Conflict);
        assert_eq!(store.object_count(), 1);
    }

    #[tokio::test]
    async fn public_url_is_always_resolvable() {
        let store = MemoryBlobStore::new("test");
        assert_eq!(
            store.public_url("a/b/c.jpg").as_deref(),
            Some("memory://test/a/b/c.jpg")
        );
    }
}
