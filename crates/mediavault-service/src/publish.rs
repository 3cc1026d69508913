//! Gallery publishing.

use serde_json::json;
use tracing::info;
use uuid::Uuid;

use mediavault_core::error::AppError;
use mediavault_core::result::AppResult;
use mediavault_database::repositories::{AssetRepository, GalleryRepository};
use mediavault_entity::gallery::Gallery;

use crate::notify::Notifier;

/// Publishes galleries and maintains the publication log.
pub struct PublishService {
    galleries: GalleryRepository,
    assets: AssetRepository,
    notifier: Notifier,
}

impl PublishService {
    pub fn new(galleries: GalleryRepository, assets: AssetRepository, notifier: Notifier) -> Self {
        Self {
            galleries,
            assets,
            notifier,
        }
    }

    /// Publish a gallery: flip its status, append a publication log row,
    /// and emit an outbound notification. Publishing an already-published
    /// gallery refreshes its timestamp rather than erroring.
    pub async fn publish(&self, gallery_id: Uuid) -> AppResult<Gallery> {
        let gallery = self
            .galleries
            .mark_published(gallery_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Gallery {gallery_id} not found")))?;

        let assets = self.assets.find_by_gallery(gallery_id).await?;
        self.galleries
            .append_publication_log(
                gallery_id,
                &json!({
                    "galleryName": gallery.name,
                    "assetCount": assets.len(),
                    "publishedAt": gallery.published_at,
                }),
            )
            .await?;

        info!(
            %gallery_id,
            gallery_name = %gallery.name,
            asset_count = assets.len(),
            "Published gallery"
        );

        self.notifier.gallery_published(&gallery, assets.len());
        Ok(gallery)
    }
}
