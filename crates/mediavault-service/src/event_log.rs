//! Event log seam for the webhook gate.
//!
//! The gate's admit/process path depends on this trait rather than the
//! concrete repository, mirroring [`crate::catalog::AssetCatalog`], so
//! the log-before-business-logic contract is testable in process.

use async_trait::async_trait;
use uuid::Uuid;

use mediavault_core::result::AppResult;
use mediavault_database::repositories::WebhookEventRepository;
use mediavault_entity::webhook::WebhookEvent;

/// The slice of the webhook event log the gate writes to.
#[async_trait]
pub trait EventLog: Send + Sync + 'static {
    /// Append one admitted delivery in `received` status.
    async fn create(
        &self,
        zap_id: Option<&str>,
        event_id: Option<&str>,
        event_type: Option<&str>,
        payload: &serde_json::Value,
        headers: &serde_json::Value,
    ) -> AppResult<WebhookEvent>;

    /// Transition an event to `processed`, recording per-item outcomes.
    async fn mark_processed(&self, id: Uuid, result: &serde_json::Value) -> AppResult<()>;

    /// Transition an event to `failed` with a reason.
    async fn mark_failed(&self, id: Uuid, error: &str) -> AppResult<()>;
}

#[async_trait]
impl EventLog for WebhookEventRepository {
    async fn create(
        &self,
        zap_id: Option<&str>,
        event_id: Option<&str>,
        event_type: Option<&str>,
        payload: &serde_json::Value,
        headers: &serde_json::Value,
    ) -> AppResult<WebhookEvent> {
        WebhookEventRepository::create(self, zap_id, event_id, event_type, payload, headers).await
    }

    async fn mark_processed(&self, id: Uuid, result: &serde_json::Value) -> AppResult<()> {
        WebhookEventRepository::mark_processed(self, id, result).await
    }

    async fn mark_failed(&self, id: Uuid, error: &str) -> AppResult<()> {
        WebhookEventRepository::mark_failed(self, id, error).await
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Mutex;

    use chrono::Utc;

    use mediavault_entity::webhook::status;

    use super::*;

    /// In-process event log backing the webhook gate tests.
    #[derive(Debug, Default)]
    pub struct MemoryEventLog {
        rows: Mutex<Vec<WebhookEvent>>,
    }

    impl MemoryEventLog {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn rows(&self) -> Vec<WebhookEvent> {
            self.rows.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl EventLog for MemoryEventLog {
        async fn create(
            &self,
            zap_id: Option<&str>,
            event_id: Option<&str>,
            event_type: Option<&str>,
            payload: &serde_json::Value,
            headers: &serde_json::Value,
        ) -> AppResult<WebhookEvent> {
            let event = WebhookEvent {
                id: Uuid::new_v4(),
                zap_id: zap_id.map(String::from),
                event_id: event_id.map(String::from),
                event_type: event_type.map(String::from),
                payload: payload.clone(),
                headers: headers.clone(),
                status: status::RECEIVED.to_string(),
                error: None,
                result: None,
                received_at: Utc::now(),
                processed_at: None,
            };
            self.rows.lock().unwrap().push(event.clone());
            Ok(event)
        }

        async fn mark_processed(&self, id: Uuid, result: &serde_json::Value) -> AppResult<()> {
            let mut rows = self.rows.lock().unwrap();
            if let Some(row) = rows.iter_mut().find(|r| r.id == id) {
                row.status = status::PROCESSED.to_string();
                row.result = Some(result.clone());
                row.processed_at = Some(Utc::now());
            }
            Ok(())
        }

        async fn mark_failed(&self, id: Uuid, error: &str) -> AppResult<()> {
            let mut rows = self.rows.lock().unwrap();
            if let Some(row) = rows.iter_mut().find(|r| r.id == id) {
                row.status = status::FAILED.to_string();
                row.error = Some(error.to_string());
                row.processed_at = Some(Utc::now());
            }
            Ok(())
        }
    }
}
