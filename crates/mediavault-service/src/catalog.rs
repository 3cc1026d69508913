//! Asset catalog seam.
//!
//! Services talk to the catalog through this trait so the batch
//! pipeline can be exercised against an in-memory catalog in tests.
//! The production implementation delegates to
//! [`AssetRepository`](mediavault_database::repositories::AssetRepository).

use async_trait::async_trait;
use uuid::Uuid;

use mediavault_core::result::AppResult;
use mediavault_database::repositories::AssetRepository;
use mediavault_entity::asset::{Asset, AssetScope, CreateAsset};

/// Durable record of every stored asset.
#[async_trait]
pub trait AssetCatalog: Send + Sync + 'static {
    /// Insert a new asset record. A unique violation on the dedup
    /// constraint surfaces as a conflict error.
    async fn create(&self, data: &CreateAsset) -> AppResult<Asset>;

    /// Find the stored asset matching a content digest within a scope.
    async fn find_duplicate(&self, checksum: &str, scope: &AssetScope)
    -> AppResult<Option<Asset>>;

    /// Update only the remote-linkage fields of an existing asset.
    async fn link_remote(
        &self,
        id: Uuid,
        dropbox_file_id: Option<&str>,
        dropbox_rev: Option<&str>,
    ) -> AppResult<Asset>;

    /// Bulk-associate stored assets with a gallery.
    async fn attach_to_gallery(&self, asset_ids: &[Uuid], gallery_id: Uuid) -> AppResult<u64>;
}

#[async_trait]
impl AssetCatalog for AssetRepository {
    async fn create(&self, data: &CreateAsset) -> AppResult<Asset> {
        AssetRepository::create(self, data).await
    }

    async fn find_duplicate(
        &self,
        checksum: &str,
        scope: &AssetScope,
    ) -> AppResult<Option<Asset>> {
        AssetRepository::find_duplicate(self, checksum, scope).await
    }

    async fn link_remote(
        &self,
        id: Uuid,
        dropbox_file_id: Option<&str>,
        dropbox_rev: Option<&str>,
    ) -> AppResult<Asset> {
        AssetRepository::link_remote(self, id, dropbox_file_id, dropbox_rev).await
    }

    async fn attach_to_gallery(&self, asset_ids: &[Uuid], gallery_id: Uuid) -> AppResult<u64> {
        AssetRepository::attach_to_gallery(self, asset_ids, gallery_id).await
    }
}
