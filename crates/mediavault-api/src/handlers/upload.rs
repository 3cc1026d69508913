//! Direct multipart upload handler.

use axum::Json;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use bytes::Bytes;
use tracing::debug;

use mediavault_core::error::AppError;
use mediavault_entity::asset::AssetScope;
use mediavault_service::ingest::IngestRequest;

use crate::dto::response::{ApiResponse, AssetResponse, UploadResponse};
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Default)]
struct UploadForm {
    file: Option<(String, Option<String>, Bytes)>,
    client_id: Option<String>,
    project_code: Option<String>,
    dropbox_file_id: Option<String>,
    dropbox_rev: Option<String>,
}

/// POST /api/assets/upload
///
/// Multipart form with one `file` part plus optional text fields. `201`
/// with the stored asset on first upload, `200` with the existing asset
/// on a dedup hit, `400` when no file part is present.
pub async fn upload_asset(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<UploadResponse>>), ApiError> {
    let form = read_form(multipart).await?;

    let (file_name, content_type, bytes) = form
        .file
        .ok_or_else(|| AppError::validation("No file part in upload"))?;

    debug!(file_name, size = bytes.len(), "Received direct upload");

    let outcome = state
        .ingest_service
        .store_bytes(IngestRequest {
            bytes,
            file_name,
            content_type,
            scope: AssetScope::new(form.client_id, form.project_code),
            dropbox_file_id: form.dropbox_file_id,
            dropbox_rev: form.dropbox_rev,
            source: "upload",
        })
        .await?;

    let status = if outcome.deduplicated {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };
    Ok((
        status,
        Json(ApiResponse::ok(UploadResponse {
            asset: AssetResponse::from(outcome.asset),
            duplicate: outcome.deduplicated,
        })),
    ))
}

async fn read_form(mut multipart: Multipart) -> Result<UploadForm, ApiError> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::validation(format!("Malformed multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let file_name = field
                    .file_name()
                    .map(str::to_string)
                    .unwrap_or_else(|| "upload.bin".to_string());
                let content_type = field.content_type().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::validation(format!("Failed to read file part: {e}")))?;
                form.file = Some((file_name, content_type, bytes));
            }
            "clientId" | "client" => form.client_id = read_text(field).await?,
            "projectCode" | "project" => form.project_code = read_text(field).await?,
            "dropboxFileId" => form.dropbox_file_id = read_text(field).await?,
            "dropboxRevision" => form.dropbox_rev = read_text(field).await?,
            other => {
                debug!(field = other, "Ignoring unknown upload form field");
            }
        }
    }

    Ok(form)
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> Result<Option<String>, ApiError> {
    let value = field
        .text()
        .await
        .map_err(|e| AppError::validation(format!("Failed to read form field: {e}")))?;
    let value = value.trim().to_string();
    Ok(if value.is_empty() { None } else { Some(value) })
}
