//! Inbound webhook gate.
//!
//! Verifies the HMAC signature on the raw request body, logs every
//! admitted delivery before any business logic runs, and kicks off the
//! import asynchronously so the sender gets its acknowledgement
//! regardless of the processing outcome.

use std::sync::Arc;

use bytes::Bytes;
use hmac::{Hmac, Mac};
use serde::Deserialize;
use serde_json::json;
use sha2::Sha256;
use tracing::{error, info, warn};
use uuid::Uuid;

use mediavault_core::error::AppError;
use mediavault_core::result::AppResult;
use mediavault_database::repositories::GalleryRepository;
use mediavault_entity::webhook::WebhookEvent;
use mediavault_remote::resolver::AssetReference;
use mediavault_remote::selection::SelectionEntry;

use crate::event_log::EventLog;
use crate::import::{ImportRequest, ImportService};

type HmacSha256 = Hmac<Sha256>;

/// Verify an inbound HMAC-SHA256 signature over the exact raw body.
///
/// An empty secret means the deployment runs with webhooks open and
/// every request is accepted. With a secret configured, the header
/// value is hex-decoded and compared in constant time; a length
/// mismatch rejects immediately without attempting the comparison.
pub fn verify_signature(secret: &str, raw_body: &[u8], signature: Option<&str>) -> bool {
    if secret.is_empty() {
        return true;
    }
    let Some(signature) = signature else {
        return false;
    };
    let Ok(provided) = hex::decode(signature.trim()) else {
        return false;
    };
    // SHA-256 output is 32 bytes; anything else cannot match.
    if provided.len() != 32 {
        return false;
    }

    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(raw_body);
    mac.verify_slice(&provided).is_ok()
}

/// One inbound delivery, as captured by the HTTP layer.
#[derive(Debug, Clone)]
pub struct InboundDelivery {
    pub raw_body: Bytes,
    pub signature: Option<String>,
    pub zap_id: Option<String>,
    pub event_id: Option<String>,
    pub event_type: Option<String>,
    /// All request headers, retained for replay.
    pub headers: serde_json::Value,
}

/// Import instructions carried by a webhook payload. Either an explicit
/// gallery id or a gallery name must be present; assets and selection
/// follow the same shapes as the import endpoint.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WebhookImportPayload {
    #[serde(default)]
    gallery_id: Option<Uuid>,
    #[serde(default)]
    gallery_name: Option<String>,
    #[serde(default)]
    client_name: Option<String>,
    #[serde(default)]
    folder_path: Option<String>,
    #[serde(default)]
    trigger_zapier: bool,
    #[serde(default)]
    assets: Vec<AssetReference>,
    #[serde(default)]
    selection: Vec<SelectionEntry>,
}

/// Gate and processor for inbound webhook deliveries.
pub struct WebhookService {
    events: Arc<dyn EventLog>,
    galleries: GalleryRepository,
    import: Arc<ImportService>,
    signing_secret: String,
}

impl WebhookService {
    pub fn new(
        events: Arc<dyn EventLog>,
        galleries: GalleryRepository,
        import: Arc<ImportService>,
        signing_secret: String,
    ) -> Self {
        Self {
            events,
            galleries,
            import,
            signing_secret,
        }
    }

    /// Admit one delivery: verify the signature, then log it.
    ///
    /// Even a payload that fails to parse as JSON is logged (as a raw
    /// string value), so no admitted delivery is ever silently lost.
    pub async fn admit(&self, delivery: &InboundDelivery) -> AppResult<WebhookEvent> {
        if !verify_signature(
            &self.signing_secret,
            &delivery.raw_body,
            delivery.signature.as_deref(),
        ) {
            warn!(
                event_id = delivery.event_id.as_deref(),
                "Rejected webhook delivery with bad signature"
            );
            return Err(AppError::authentication("Webhook signature mismatch"));
        }

        let payload = serde_json::from_slice::<serde_json::Value>(&delivery.raw_body)
            .unwrap_or_else(|_| json!(String::from_utf8_lossy(&delivery.raw_body)));

        let event = self
            .events
            .create(
                delivery.zap_id.as_deref(),
                delivery.event_id.as_deref(),
                delivery.event_type.as_deref(),
                &payload,
                &delivery.headers,
            )
            .await?;

        info!(
            webhook_event_id = %event.id,
            event_type = delivery.event_type.as_deref(),
            "Admitted webhook delivery"
        );
        Ok(event)
    }

    /// Process an admitted event in the background and record the
    /// terminal status on its log row. The caller has already responded
    /// to the sender.
    pub fn process_async(self: Arc<Self>, event: WebhookEvent) {
        tokio::spawn(async move {
            let event_id = event.id;
            match self.process(event).await {
                Ok(result) => {
                    if let Err(err) = self.events.mark_processed(event_id, &result).await {
                        error!(%event_id, error = %err, "Failed to mark webhook event processed");
                    }
                }
                Err(err) => {
                    warn!(%event_id, error = %err, "Webhook event processing failed");
                    if let Err(log_err) = self.events.mark_failed(event_id, &err.to_string()).await
                    {
                        error!(%event_id, error = %log_err, "Failed to mark webhook event failed");
                    }
                }
            }
        });
    }

    /// Run the import a payload describes. Returns the per-item
    /// outcomes, which land on the event row for replay and audit.
    async fn process(&self, event: WebhookEvent) -> AppResult<serde_json::Value> {
        let payload: WebhookImportPayload = serde_json::from_value(event.payload.clone())?;

        let gallery_id = match (payload.gallery_id, payload.gallery_name.as_deref()) {
            (Some(id), _) => id,
            (None, Some(name)) => {
                self.galleries
                    .find_or_create_by_name(name, payload.client_name.as_deref())
                    .await?
                    .id
            }
            (None, None) => {
                return Err(AppError::validation(
                    "Webhook payload names neither a gallery id nor a gallery name",
                ));
            }
        };

        let outcome = self
            .import
            .run(ImportRequest {
                gallery_id,
                gallery_name: payload.gallery_name,
                client_name: payload.client_name,
                folder_path: payload.folder_path,
                notify: payload.trigger_zapier,
                references: payload.assets,
                selection: payload.selection,
            })
            .await?;

        let summary = outcome.summary();
        info!(
            %gallery_id,
            imported = summary.imported,
            skipped = summary.skipped,
            "Webhook-triggered import finished"
        );
        Ok(serde_json::to_value(&summary.items)?)
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use mediavault_entity::webhook::status;
    use mediavault_remote::client::RemoteSource;
    use mediavault_remote::types::{RemoteEntry, RemoteFile};
    use mediavault_storage::MemoryBlobStore;

    use crate::catalog::testing::MemoryCatalog;
    use crate::event_log::testing::MemoryEventLog;
    use crate::ingest::IngestService;
    use crate::notify::Notifier;

    use super::*;

    const SECRET: &str = "shhh";

    /// Remote source for paths that never reach Dropbox.
    struct InertRemote;

    #[async_trait]
    impl RemoteSource for InertRemote {
        async fn list_folder(&self, path: &str, _recursive: bool) -> AppResult<Vec<RemoteEntry>> {
            Err(AppError::not_found(format!("no folder '{path}'")))
        }

        async fn download(&self, reference: &str) -> AppResult<(RemoteFile, Bytes)> {
            Err(AppError::not_found(format!("no file '{reference}'")))
        }
    }

    fn sample_file() -> RemoteFile {
        RemoteFile {
            id: "id:a".to_string(),
            name: "a.jpg".to_string(),
            path_display: Some("/shoot/a.jpg".to_string()),
            path_lower: Some("/shoot/a.jpg".to_string()),
            size: Some(3),
            rev: Some("r1".to_string()),
            content_hash: None,
            client_modified: None,
            server_modified: None,
        }
    }

    /// Remote source serving a single downloadable file.
    struct OneFileRemote;

    #[async_trait]
    impl RemoteSource for OneFileRemote {
        async fn list_folder(&self, _path: &str, _recursive: bool) -> AppResult<Vec<RemoteEntry>> {
            Ok(vec![RemoteEntry::File(sample_file())])
        }

        async fn download(&self, _reference: &str) -> AppResult<(RemoteFile, Bytes)> {
            Ok((sample_file(), Bytes::from_static(b"pix")))
        }
    }

    fn gate(
        secret: &str,
        events: Arc<MemoryEventLog>,
        remote: Arc<dyn RemoteSource>,
    ) -> WebhookService {
        // Lazy pool: never connects. The gallery repository is only
        // touched when a payload names a gallery without an id, which
        // these tests avoid.
        let pool = sqlx::postgres::PgPoolOptions::new()
            .connect_lazy("postgres://mediavault@localhost/mediavault")
            .unwrap();
        let catalog = Arc::new(MemoryCatalog::new());
        let store = Arc::new(MemoryBlobStore::new("test-bucket"));
        let ingest = Arc::new(IngestService::new(
            catalog.clone(),
            store,
            "test-bucket".to_string(),
        ));
        let import = Arc::new(ImportService::new(
            remote,
            false,
            ingest,
            catalog,
            Notifier::disabled(),
            1,
        ));
        WebhookService::new(
            events,
            GalleryRepository::new(pool),
            import,
            secret.to_string(),
        )
    }

    fn delivery(body: &'static [u8], signature: Option<&str>) -> InboundDelivery {
        InboundDelivery {
            raw_body: Bytes::from_static(body),
            signature: signature.map(String::from),
            zap_id: Some("zap-1".to_string()),
            event_id: Some("evt-1".to_string()),
            event_type: Some("import".to_string()),
            headers: serde_json::json!({"content-type": "application/json"}),
        }
    }

    fn sign(secret: &str, body: &[u8]) -> String {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(body);
        hex::encode(mac.finalize().into_bytes())
    }

    #[test]
    fn valid_signature_is_accepted() {
        let body = br#"{"galleryName":"W2026"}"#;
        let signature = sign(SECRET, body);
        assert!(verify_signature(SECRET, body, Some(&signature)));
    }

    #[test]
    fn tampered_body_is_rejected() {
        let signature = sign(SECRET, b"original");
        assert!(!verify_signature(SECRET, b"tampered", Some(&signature)));
    }

    #[test]
    fn wrong_length_signature_is_rejected() {
        assert!(!verify_signature(SECRET, b"body", Some("deadbeef")));
    }

    #[test]
    fn non_hex_signature_is_rejected() {
        assert!(!verify_signature(SECRET, b"body", Some("not-hex!")));
    }

    #[test]
    fn missing_header_is_rejected_when_secret_configured() {
        assert!(!verify_signature(SECRET, b"body", None));
    }

    #[test]
    fn empty_secret_runs_open() {
        assert!(verify_signature("", b"anything", None));
        assert!(verify_signature("", b"anything", Some("garbage")));
    }

    #[tokio::test]
    async fn admission_logs_exactly_one_row() {
        let events = Arc::new(MemoryEventLog::new());
        let svc = gate("", events.clone(), Arc::new(InertRemote));

        let event = svc
            .admit(&delivery(br#"{"galleryName":"W2026"}"#, None))
            .await
            .unwrap();

        let rows = events.rows();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, event.id);
        assert_eq!(rows[0].status, status::RECEIVED);
        assert_eq!(rows[0].zap_id.as_deref(), Some("zap-1"));
        assert_eq!(rows[0].payload["galleryName"], "W2026");
    }

    #[tokio::test]
    async fn malformed_payload_is_still_logged() {
        let events = Arc::new(MemoryEventLog::new());
        let svc = gate("", events.clone(), Arc::new(InertRemote));

        svc.admit(&delivery(b"not json at all{", None))
            .await
            .unwrap();

        let rows = events.rows();
        assert_eq!(rows.len(), 1);
        // The unparseable body is kept verbatim as a string value.
        assert_eq!(rows[0].payload.as_str(), Some("not json at all{"));
        assert_eq!(rows[0].status, status::RECEIVED);
    }

    #[tokio::test]
    async fn rejected_delivery_logs_nothing() {
        let events = Arc::new(MemoryEventLog::new());
        let svc = gate(SECRET, events.clone(), Arc::new(InertRemote));

        let err = svc
            .admit(&delivery(br#"{"galleryName":"W2026"}"#, Some("deadbeef")))
            .await
            .unwrap_err();

        assert_eq!(err.kind, mediavault_core::ErrorKind::Authentication);
        assert!(events.rows().is_empty());
    }

    #[tokio::test]
    async fn processed_event_records_per_item_outcomes() {
        let events = Arc::new(MemoryEventLog::new());
        let svc = Arc::new(gate("", events.clone(), Arc::new(OneFileRemote)));

        let body = serde_json::to_vec(&serde_json::json!({
            "galleryId": Uuid::new_v4(),
            "assets": [{"dropboxFileId": "id:a"}]
        }))
        .unwrap();
        let event = svc
            .admit(&InboundDelivery {
                raw_body: Bytes::from(body),
                signature: None,
                zap_id: None,
                event_id: None,
                event_type: Some("import".to_string()),
                headers: serde_json::json!({}),
            })
            .await
            .unwrap();

        svc.clone().process_async(event);

        let mut rows = events.rows();
        for _ in 0..100 {
            if rows[0].status != status::RECEIVED {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
            rows = events.rows();
        }

        assert_eq!(rows[0].status, status::PROCESSED);
        let result = rows[0].result.as_ref().unwrap();
        assert_eq!(result[0]["status"], "stored");
        assert_eq!(result[0]["dropbox_file_id"], "id:a");
    }

    #[test]
    fn payload_parses_import_shapes() {
        let payload: WebhookImportPayload = serde_json::from_value(serde_json::json!({
            "galleryName": "W2026",
            "clientName": "acme",
            "folderPath": "/shoot",
            "triggerZapier": true,
            "assets": [
                {"dropboxFileId": "id:a"},
                {"dropboxPath": "/shoot/b.jpg", "fileName": "b.jpg"}
            ]
        }))
        .unwrap();

        assert_eq!(payload.gallery_name.as_deref(), Some("W2026"));
        assert!(payload.trigger_zapier);
        assert_eq!(payload.assets.len(), 2);
        assert_eq!(payload.assets[0].file_id.as_deref(), Some("id:a"));
        assert_eq!(payload.assets[1].file_name.as_deref(), Some("b.jpg"));
    }
}
