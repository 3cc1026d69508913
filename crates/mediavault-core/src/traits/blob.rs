//! Blob store trait for pluggable object-storage backends.

use async_trait::async_trait;
use bytes::Bytes;

use crate::result::AppResult;

/// Trait for the content-addressable blob store behind asset ingestion.
///
/// The trait is defined here in `mediavault-core` and implemented in
/// `mediavault-storage` (S3 and an in-memory dev/test provider). Paths
/// are made unique per upload by the caller, so `put` never needs to
/// overwrite; an object collision at an existing path is a hard error.
#[async_trait]
pub trait BlobStore: Send + Sync + std::fmt::Debug + 'static {
    /// Return the provider type name (e.g., "s3", "memory").
    fn provider_type(&self) -> &str;

    /// Ensure the backing bucket exists. Idempotent: an already-existing
    /// bucket, including one created by a racing caller, is success.
    async fn ensure_bucket(&self) -> AppResult<()>;

    /// Write bytes under `path`. Fails with a conflict if an object
    /// already exists at that path.
    async fn put(&self, path: &str, data: Bytes, content_type: &str) -> AppResult<()>;

    /// Resolve a publicly retrievable URL for `path`. Best-effort: `None`
    /// is not fatal and callers fall back to any previously known URL.
    fn public_url(&self, path: &str) -> Option<String>;

    /// Check whether the backing store is reachable.
    async fn health_check(&self) -> AppResult<bool>;
}
