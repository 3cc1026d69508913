//! Blob store provider implementations.

pub mod memory;
pub mod s3;

use std::sync::Arc;

use mediavault_core::config::storage::StorageConfig;
use mediavault_core::error::AppError;
use mediavault_core::result::AppResult;
use mediavault_core::traits::BlobStore;

/// Construct the configured blob store provider.
///
/// Built once by the composition root and injected everywhere; there is
/// no ambient global client.
pub async fn build_provider(config: &StorageConfig) -> AppResult<Arc<dyn BlobStore>> {
    match config.provider.as_str() {
        "s3" => Ok(Arc::new(s3::S3BlobStore::new(&config.s3).await)),
        "memory" => Ok(Arc::new(memory::MemoryBlobStore::new(
            &config.s3.bucket,
        ))),
        other => Err(AppError::configuration(format!(
            "Unknown storage provider '{other}' (expected \"s3\" or \"memory\")"
        ))),
    }
}
