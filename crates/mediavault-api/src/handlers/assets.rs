//! Asset query handlers.

use axum::Json;
use axum::extract::{Path, State};
use uuid::Uuid;

use mediavault_core::error::AppError;

use crate::dto::response::{ApiResponse, AssetResponse};
use crate::error::ApiError;
use crate::state::AppState;

/// GET /api/assets/{id}
pub async fn get_asset(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<AssetResponse>>, ApiError> {
    let asset = state
        .asset_repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Asset {id} not found")))?;
    Ok(Json(ApiResponse::ok(AssetResponse::from(asset))))
}

/// GET /api/galleries/{id}/assets
pub async fn list_gallery_assets(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<AssetResponse>>>, ApiError> {
    let assets = state.asset_repo.find_by_gallery(id).await?;
    Ok(Json(ApiResponse::ok(
        assets.into_iter().map(AssetResponse::from).collect(),
    )))
}
