//! Application composition root.

use std::sync::Arc;

use sqlx::PgPool;
use tracing::{info, warn};

use mediavault_core::config::AppConfig;
use mediavault_core::error::AppError;
use mediavault_core::traits::BlobStore;
use mediavault_database::repositories::{
    AssetRepository, GalleryRepository, WebhookEventRepository,
};
use mediavault_remote::client::{DropboxClient, RemoteSource};
use mediavault_service::catalog::AssetCatalog;
use mediavault_service::{ImportService, IngestService, Notifier, PublishService, WebhookService};

use crate::router::build_router;
use crate::state::AppState;

/// Runs the MediaVault server with the given configuration and
/// database pool.
pub async fn run_server(config: AppConfig, db_pool: PgPool) -> Result<(), AppError> {
    info!("Starting MediaVault server...");

    // ── Step 1: Initialize blob storage ──────────────────────────
    let blob_store: Arc<dyn BlobStore> =
        mediavault_storage::build_provider(&config.storage).await?;
    info!(provider = blob_store.provider_type(), "Blob store ready");
    blob_store.ensure_bucket().await?;

    // ── Step 2: Initialize repositories ──────────────────────────
    let asset_repo = Arc::new(AssetRepository::new(db_pool.clone()));
    let gallery_repo = Arc::new(GalleryRepository::new(db_pool.clone()));
    let webhook_event_repo = Arc::new(WebhookEventRepository::new(db_pool.clone()));

    // ── Step 3: Initialize the remote source ─────────────────────
    let dropbox: Arc<dyn RemoteSource> = Arc::new(DropboxClient::new(&config.dropbox)?);
    if !config.dropbox.has_credential() {
        warn!("No Dropbox access token configured; selection and folder imports will fail");
    }

    // ── Step 4: Initialize services ──────────────────────────────
    let notifier = Notifier::new(&config.webhook);
    let catalog: Arc<dyn AssetCatalog> = asset_repo.clone();

    let ingest_service = Arc::new(IngestService::new(
        catalog.clone(),
        blob_store.clone(),
        config.storage.s3.bucket.clone(),
    ));
    let import_service = Arc::new(ImportService::new(
        dropbox,
        config.dropbox.has_credential(),
        ingest_service.clone(),
        catalog,
        notifier.clone(),
        config.import.max_concurrency,
    ));
    let webhook_service = Arc::new(WebhookService::new(
        webhook_event_repo.clone(),
        (*gallery_repo).clone(),
        import_service.clone(),
        config.webhook.signing_secret.clone(),
    ));
    let publish_service = Arc::new(PublishService::new(
        (*gallery_repo).clone(),
        (*asset_repo).clone(),
        notifier,
    ));

    if !config.webhook.verification_enabled() {
        warn!("Webhook signature verification is disabled (no signing secret configured)");
    }

    // ── Step 5: Build and start HTTP server ──────────────────────
    let state = AppState {
        config: Arc::new(config.clone()),
        db_pool,
        blob_store,
        asset_repo,
        gallery_repo,
        webhook_event_repo,
        ingest_service,
        import_service,
        webhook_service,
        publish_service,
    };

    let app = build_router(state);
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    info!("MediaVault server listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "Failed to install Ctrl+C handler");
    }
}
