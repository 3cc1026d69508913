//! Shared application state threaded through every handler.

use std::sync::Arc;

use sqlx::PgPool;

use mediavault_core::config::AppConfig;
use mediavault_core::traits::BlobStore;
use mediavault_database::repositories::{
    AssetRepository, GalleryRepository, WebhookEventRepository,
};
use mediavault_service::{ImportService, IngestService, PublishService, WebhookService};

/// Everything the handlers need, cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db_pool: PgPool,
    pub blob_store: Arc<dyn BlobStore>,
    pub asset_repo: Arc<AssetRepository>,
    pub gallery_repo: Arc<GalleryRepository>,
    pub webhook_event_repo: Arc<WebhookEventRepository>,
    pub ingest_service: Arc<IngestService>,
    pub import_service: Arc<ImportService>,
    pub webhook_service: Arc<WebhookService>,
    pub publish_service: Arc<PublishService>,
}
