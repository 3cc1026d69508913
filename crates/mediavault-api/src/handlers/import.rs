//! Batch/folder import handler.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use mediavault_core::error::AppError;
use mediavault_service::import::{BatchOutcome, ImportRequest};

use crate::dto::request::ImportRequestBody;
use crate::dto::response::{ApiResponse, ImportResponse};
use crate::error::ApiError;
use crate::state::AppState;

/// POST /api/galleries/import
///
/// `200` on full success, `207` when some items failed while others
/// succeeded, `400` when no target gallery is named or nothing
/// resolves, `502` when the remote provider blocks the whole batch.
pub async fn run_import(
    State(state): State<AppState>,
    Json(body): Json<ImportRequestBody>,
) -> Result<(StatusCode, Json<ApiResponse<ImportResponse>>), ApiError> {
    let gallery_id = match (body.gallery_id, body.gallery_name.as_deref()) {
        (Some(id), _) => id,
        (None, Some(name)) => {
            state
                .gallery_repo
                .find_or_create_by_name(name, body.client_name.as_deref())
                .await?
                .id
        }
        (None, None) => {
            return Err(AppError::validation("galleryId (or galleryName) is required").into());
        }
    };

    let outcome = state
        .import_service
        .run(ImportRequest {
            gallery_id,
            gallery_name: body.gallery_name,
            client_name: body.client_name,
            folder_path: body.folder_path,
            notify: body.trigger_zapier,
            references: body.assets,
            selection: body.selection,
        })
        .await?;

    let (status, error) = match &outcome {
        BatchOutcome::Complete(_) => (StatusCode::OK, None),
        BatchOutcome::Partial(summary) => (
            StatusCode::MULTI_STATUS,
            Some(format!(
                "{} of {} items failed: {}",
                summary.failed_items().len(),
                summary.items.len(),
                summary.failed_items().join(", ")
            )),
        ),
    };

    let summary = match outcome {
        BatchOutcome::Complete(s) | BatchOutcome::Partial(s) => s,
    };

    Ok((
        status,
        Json(ApiResponse::ok(ImportResponse {
            imported: summary.imported,
            skipped: summary.skipped,
            items: summary.items,
            error,
        })),
    ))
}
