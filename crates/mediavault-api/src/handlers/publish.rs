//! Gallery publish handler.

use axum::Json;
use axum::extract::{Path, State};
use uuid::Uuid;

use crate::dto::response::{ApiResponse, GalleryResponse};
use crate::error::ApiError;
use crate::state::AppState;

/// POST /api/galleries/{id}/publish
///
/// `200` with the published gallery, `404` when the id is unknown.
pub async fn publish_gallery(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<GalleryResponse>>, ApiError> {
    let gallery = state.publish_service.publish(id).await?;
    Ok(Json(ApiResponse::ok(GalleryResponse::from(gallery))))
}
