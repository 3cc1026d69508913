//! Webhook event log repository.

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use mediavault_core::error::{AppError, ErrorKind};
use mediavault_core::result::AppResult;
use mediavault_entity::webhook::{WebhookEvent, status};

/// Repository for the append-only inbound webhook event log.
#[derive(Debug, Clone)]
pub struct WebhookEventRepository {
    pool: PgPool,
}

impl WebhookEventRepository {
    /// Create a new webhook event repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Log one admitted delivery. Called before any business logic runs.
    pub async fn create(
        &self,
        zap_id: Option<&str>,
        event_id: Option<&str>,
        event_type: Option<&str>,
        payload: &serde_json::Value,
        headers: &serde_json::Value,
    ) -> AppResult<WebhookEvent> {
        sqlx::query_as::<_, WebhookEvent>(
            "INSERT INTO webhook_events (zap_id, event_id, event_type, payload, headers, status) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
        )
        .bind(zap_id)
        .bind(event_id)
        .bind(event_type)
        .bind(payload)
        .bind(headers)
        .bind(status::RECEIVED)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to log webhook event", e))
    }

    /// Mark an event as processed, recording the per-item outcomes of
    /// the import it triggered.
    pub async fn mark_processed(&self, id: Uuid, result: &serde_json::Value) -> AppResult<()> {
        self.transition(id, status::PROCESSED, None, Some(result))
            .await
    }

    /// Mark an event as failed with a reason.
    pub async fn mark_failed(&self, id: Uuid, error: &str) -> AppResult<()> {
        self.transition(id, status::FAILED, Some(error), None).await
    }

    async fn transition(
        &self,
        id: Uuid,
        to: &str,
        error: Option<&str>,
        result: Option<&serde_json::Value>,
    ) -> AppResult<()> {
        sqlx::query(
            "UPDATE webhook_events SET status = $2, error = $3, processed_at = $4, result = $5 \
             WHERE id = $1",
        )
        .bind(id)
        .bind(to)
        .bind(error)
        .bind(Utc::now())
        .bind(result)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to update webhook event", e)
        })?;
        Ok(())
    }

    /// Find an event by ID (used for replay).
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<WebhookEvent>> {
        sqlx::query_as::<_, WebhookEvent>("SELECT * FROM webhook_events WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find webhook event", e)
            })
    }

    /// List the most recently admitted events.
    pub async fn list_recent(&self, limit: i64) -> AppResult<Vec<WebhookEvent>> {
        sqlx::query_as::<_, WebhookEvent>(
            "SELECT * FROM webhook_events ORDER BY received_at DESC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list webhook events", e)
        })
    }
}
