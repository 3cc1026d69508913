//! Outbound notification events.
//!
//! Completed imports and gallery publications emit one event to a
//! configured webhook sink. Emission is fire-and-forget: the HTTP
//! response that triggered it has already been computed, so a delivery
//! failure is logged and dropped, never propagated.

use chrono::Utc;
use serde_json::json;
use tracing::{debug, warn};
use uuid::Uuid;

use mediavault_core::config::webhook::WebhookConfig;
use mediavault_entity::gallery::Gallery;

#[derive(Debug, Clone)]
pub struct Notifier {
    http: reqwest::Client,
    outbound_url: Option<String>,
}

impl Notifier {
    pub fn new(config: &WebhookConfig) -> Self {
        let outbound_url = if config.outbound_url.is_empty() {
            None
        } else {
            Some(config.outbound_url.clone())
        };
        Self {
            http: reqwest::Client::new(),
            outbound_url,
        }
    }

    /// A notifier that drops every event. Used when no sink is
    /// configured and in tests.
    pub fn disabled() -> Self {
        Self {
            http: reqwest::Client::new(),
            outbound_url: None,
        }
    }

    /// One event per completed batch, not per item.
    pub fn import_completed(&self, gallery_id: Uuid, imported: usize, skipped: usize) {
        self.send(json!({
            "event": "import.completed",
            "galleryId": gallery_id,
            "imported": imported,
            "skipped": skipped,
            "occurredAt": Utc::now(),
        }));
    }

    pub fn gallery_published(&self, gallery: &Gallery, asset_count: usize) {
        self.send(json!({
            "event": "gallery.published",
            "galleryId": gallery.id,
            "galleryName": gallery.name,
            "assetCount": asset_count,
            "occurredAt": Utc::now(),
        }));
    }

    fn send(&self, event: serde_json::Value) {
        let Some(url) = self.outbound_url.clone() else {
            debug!("No outbound webhook configured, dropping notification");
            return;
        };
        let http = self.http.clone();
        tokio::spawn(async move {
            match http.post(&url).json(&event).send().await {
                Ok(response) if response.status().is_success() => {
                    debug!(%url, "Delivered outbound notification");
                }
                Ok(response) => {
                    warn!(%url, status = %response.status(), "Outbound notification rejected");
                }
                Err(err) => {
                    warn!(%url, error = %err, "Outbound notification failed");
                }
            }
        });
    }
}
