//! Webhook event log entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Processing state values for an admitted webhook delivery.
pub mod status {
    /// Logged, not yet processed.
    pub const RECEIVED: &str = "received";
    /// Processing completed.
    pub const PROCESSED: &str = "processed";
    /// Processing failed; `error` carries the reason.
    pub const FAILED: &str = "failed";
}

/// Immutable record of one admitted inbound webhook request.
///
/// Created once per admitted request, before any business logic runs,
/// so no delivery is ever silently lost. The status transition is the
/// only mutation; payload and headers are retained verbatim for replay.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct WebhookEvent {
    /// Unique event log identifier.
    pub id: Uuid,
    /// Provider-assigned zap identifier, if present.
    pub zap_id: Option<String>,
    /// Provider-assigned event identifier, if present.
    pub event_id: Option<String>,
    /// Event type declared by the sender.
    pub event_type: Option<String>,
    /// Raw request payload. Malformed JSON is stored as a string value.
    pub payload: serde_json::Value,
    /// Request headers at admission time.
    pub headers: serde_json::Value,
    /// Processing status: `received`, `processed`, or `failed`.
    pub status: String,
    /// Failure reason when status is `failed`.
    pub error: Option<String>,
    /// Per-item outcomes of the triggered import when status is
    /// `processed`, for replay and audit.
    pub result: Option<serde_json::Value>,
    /// When the request was admitted.
    pub received_at: DateTime<Utc>,
    /// When processing finished (either way).
    pub processed_at: Option<DateTime<Utc>>,
}
