//! Inbound webhook handler and event-log queries.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use bytes::Bytes;
use serde_json::json;
use uuid::Uuid;

use mediavault_core::error::AppError;
use mediavault_entity::webhook::WebhookEvent;
use mediavault_service::webhook::InboundDelivery;

use crate::dto::response::{ApiResponse, WebhookAdmittedResponse};
use crate::error::ApiError;
use crate::state::AppState;

const SIGNATURE_HEADER: &str = "x-dropbox-signature";
const ZAP_ID_HEADER: &str = "x-zap-id";
const EVENT_ID_HEADER: &str = "x-event-id";
const EVENT_TYPE_HEADER: &str = "x-event-type";

/// POST /api/webhooks/dropbox
///
/// Verifies the HMAC signature over the exact raw body, logs the
/// delivery, and responds `202` immediately; processing runs in the
/// background. `401` on signature mismatch.
pub async fn receive_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<ApiResponse<WebhookAdmittedResponse>>), ApiError> {
    let delivery = InboundDelivery {
        raw_body: body,
        signature: header_value(&headers, SIGNATURE_HEADER),
        zap_id: header_value(&headers, ZAP_ID_HEADER),
        event_id: header_value(&headers, EVENT_ID_HEADER),
        event_type: header_value(&headers, EVENT_TYPE_HEADER),
        headers: headers_to_json(&headers),
    };

    let event = state.webhook_service.admit(&delivery).await?;
    let response = WebhookAdmittedResponse {
        event_id: event.id,
        status: event.status.clone(),
    };
    state.webhook_service.clone().process_async(event);

    Ok((StatusCode::ACCEPTED, Json(ApiResponse::ok(response))))
}

/// GET /api/webhooks/events
pub async fn list_events(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<WebhookEvent>>>, ApiError> {
    let events = state.webhook_event_repo.list_recent(50).await?;
    Ok(Json(ApiResponse::ok(events)))
}

/// GET /api/webhooks/events/{id}
pub async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<WebhookEvent>>, ApiError> {
    let event = state
        .webhook_event_repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Webhook event {id} not found")))?;
    Ok(Json(ApiResponse::ok(event)))
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

fn headers_to_json(headers: &HeaderMap) -> serde_json::Value {
    let map: serde_json::Map<String, serde_json::Value> = headers
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                json!(String::from_utf8_lossy(value.as_bytes())),
            )
        })
        .collect();
    serde_json::Value::Object(map)
}
