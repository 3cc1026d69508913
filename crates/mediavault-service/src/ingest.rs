//! Single-asset ingestion: dedupe, store, catalog.

use std::sync::Arc;

use bytes::Bytes;
use tracing::{debug, info};

use mediavault_core::error::{AppError, ErrorKind};
use mediavault_core::result::AppResult;
use mediavault_core::traits::BlobStore;
use mediavault_entity::asset::{Asset, AssetScope, CreateAsset};
use mediavault_storage::path::unique_object_path;

use crate::catalog::AssetCatalog;
use crate::dedup::{ScopeLocks, content_digest};

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// One incoming byte buffer with its declared metadata.
#[derive(Debug, Clone)]
pub struct IngestRequest {
    pub bytes: Bytes,
    pub file_name: String,
    pub content_type: Option<String>,
    pub scope: AssetScope,
    pub dropbox_file_id: Option<String>,
    pub dropbox_rev: Option<String>,
    /// Provenance tag: "upload", "webhook", or "import".
    pub source: &'static str,
}

/// The catalog row an ingestion resolved to, plus whether it was a
/// dedup hit.
#[derive(Debug, Clone)]
pub struct IngestOutcome {
    pub asset: Asset,
    pub deduplicated: bool,
}

/// Drives one byte buffer through dedupe, blob storage, and the catalog.
#[derive(Clone)]
pub struct IngestService {
    catalog: Arc<dyn AssetCatalog>,
    store: Arc<dyn BlobStore>,
    bucket: String,
    locks: Arc<ScopeLocks>,
}

impl IngestService {
    pub fn new(catalog: Arc<dyn AssetCatalog>, store: Arc<dyn BlobStore>, bucket: String) -> Self {
        Self {
            catalog,
            store,
            bucket,
            locks: Arc::new(ScopeLocks::new()),
        }
    }

    /// Store one byte buffer, deduplicating by content digest within the
    /// request's scope.
    ///
    /// Identical bytes ingested twice under the same scope always
    /// resolve to the same asset: the second ingestion skips the blob
    /// store entirely and only refreshes remote linkage. The dedup
    /// lookup and the subsequent insert run under a per-(digest, scope)
    /// critical section, with the catalog's uniqueness constraint as
    /// the backstop — a conflicting concurrent insert is converted to
    /// the duplicate path, never surfaced as an error.
    pub async fn store_bytes(&self, request: IngestRequest) -> AppResult<IngestOutcome> {
        if request.bytes.is_empty() {
            return Err(AppError::validation("Uploaded file is empty"));
        }

        let digest = content_digest(&request.bytes);
        let _guard = self.locks.acquire(&digest, &request.scope).await;

        if let Some(existing) = self.catalog.find_duplicate(&digest, &request.scope).await? {
            return self.resolve_duplicate(existing, &request).await;
        }

        let path = unique_object_path(
            request.scope.client_id.as_deref(),
            request.scope.project_code.as_deref(),
            &request.file_name,
        );
        let content_type = request
            .content_type
            .as_deref()
            .unwrap_or(DEFAULT_CONTENT_TYPE);

        self.store
            .put(&path, request.bytes.clone(), content_type)
            .await?;
        let public_url = self.store.public_url(&path);

        let create = CreateAsset {
            client_id: request.scope.client_id.clone(),
            project_code: request.scope.project_code.clone(),
            file_name: request.file_name.clone(),
            content_type: request.content_type.clone(),
            size_bytes: request.bytes.len() as i64,
            bucket: Some(self.bucket.clone()),
            storage_path: Some(path),
            public_url,
            checksum: digest.clone(),
            duplicate_of: None,
            dropbox_file_id: request.dropbox_file_id.clone(),
            dropbox_rev: request.dropbox_rev.clone(),
            source: Some(request.source.to_string()),
        };

        match self.catalog.create(&create).await {
            Ok(asset) => {
                info!(
                    asset_id = %asset.id,
                    file_name = %asset.file_name,
                    size = asset.size_bytes,
                    "Stored new asset"
                );
                Ok(IngestOutcome {
                    asset,
                    deduplicated: false,
                })
            }
            Err(e) if e.kind == ErrorKind::Conflict => {
                // A racing writer stored the same content first.
                let existing = self
                    .catalog
                    .find_duplicate(&digest, &request.scope)
                    .await?
                    .ok_or_else(|| {
                        AppError::internal(
                            "Insert conflicted but no existing asset matches the digest",
                        )
                    })?;
                self.resolve_duplicate(existing, &request).await
            }
            Err(e) => Err(e),
        }
    }

    async fn resolve_duplicate(
        &self,
        existing: Asset,
        request: &IngestRequest,
    ) -> AppResult<IngestOutcome> {
        debug!(
            asset_id = %existing.dedup_target(),
            file_name = %request.file_name,
            "Duplicate content, linking to existing asset"
        );
        let asset = self
            .catalog
            .link_remote(
                existing.dedup_target(),
                request.dropbox_file_id.as_deref(),
                request.dropbox_rev.as_deref(),
            )
            .await?;
        Ok(IngestOutcome {
            asset,
            deduplicated: true,
        })
    }
}
