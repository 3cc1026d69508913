//! Route definitions for the MediaVault HTTP API.
//!
//! All routes are organized by resource and mounted under `/api`. The
//! router receives `AppState` and passes it to all handlers via Axum's
//! `State` extractor.

use axum::http::HeaderValue;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::handlers;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let max_upload = state.config.storage.max_upload_size_bytes as usize;
    let cors = build_cors_layer(&state.config.server.allowed_origins);

    let api_routes = Router::new()
        .merge(asset_routes())
        .merge(import_routes())
        .merge(webhook_routes())
        .merge(gallery_routes())
        .merge(health_routes());

    Router::new()
        .nest("/api", api_routes)
        .layer(DefaultBodyLimit::max(max_upload))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Direct upload plus asset lookup.
fn asset_routes() -> Router<AppState> {
    Router::new()
        .route("/assets/upload", post(handlers::upload::upload_asset))
        .route("/assets/{id}", get(handlers::assets::get_asset))
}

/// Batch/folder import.
fn import_routes() -> Router<AppState> {
    Router::new().route("/galleries/import", post(handlers::import::run_import))
}

/// Inbound webhook gate and event log.
fn webhook_routes() -> Router<AppState> {
    Router::new()
        .route("/webhooks/dropbox", post(handlers::webhook::receive_webhook))
        .route("/webhooks/events", get(handlers::webhook::list_events))
        .route("/webhooks/events/{id}", get(handlers::webhook::get_event))
}

/// Gallery publish and contents.
fn gallery_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/galleries/{id}/publish",
            post(handlers::publish::publish_gallery),
        )
        .route(
            "/galleries/{id}/assets",
            get(handlers::assets::list_gallery_assets),
        )
}

/// Health endpoints.
fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health::health))
        .route("/health/detailed", get(handlers::health::health_detailed))
}

fn build_cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if allowed_origins.iter().any(|o| o == "*") {
        return cors.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin, "Ignoring unparseable CORS origin");
                None
            }
        })
        .collect();
    cors.allow_origin(origins)
}
