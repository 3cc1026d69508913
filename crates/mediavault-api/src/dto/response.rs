//! Response DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use mediavault_entity::asset::Asset;
use mediavault_entity::gallery::Gallery;
use mediavault_service::import::ItemResult;

/// Standard success response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Asset summary for responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetResponse {
    pub id: Uuid,
    pub client_id: Option<String>,
    pub project_code: Option<String>,
    pub file_name: String,
    pub content_type: Option<String>,
    pub size_bytes: i64,
    pub public_url: Option<String>,
    pub checksum: String,
    pub duplicate_of: Option<Uuid>,
    pub dropbox_file_id: Option<String>,
    pub gallery_id: Option<Uuid>,
    pub uploaded_at: DateTime<Utc>,
}

impl From<Asset> for AssetResponse {
    fn from(asset: Asset) -> Self {
        Self {
            id: asset.id,
            client_id: asset.client_id,
            project_code: asset.project_code,
            file_name: asset.file_name,
            content_type: asset.content_type,
            size_bytes: asset.size_bytes,
            public_url: asset.public_url,
            checksum: asset.checksum,
            duplicate_of: asset.duplicate_of,
            dropbox_file_id: asset.dropbox_file_id,
            gallery_id: asset.gallery_id,
            uploaded_at: asset.uploaded_at,
        }
    }
}

/// Upload outcome: the stored (or pre-existing) asset plus whether the
/// content deduplicated.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub asset: AssetResponse,
    pub duplicate: bool,
}

/// Batch import outcome.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportResponse {
    pub imported: usize,
    pub skipped: usize,
    pub items: Vec<ItemResult>,
    /// Summary of the failing items on a partial batch.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Acknowledgement for an admitted webhook delivery.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookAdmittedResponse {
    pub event_id: Uuid,
    pub status: String,
}

/// Gallery summary for responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryResponse {
    pub id: Uuid,
    pub name: String,
    pub client_name: Option<String>,
    pub status: String,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<Gallery> for GalleryResponse {
    fn from(gallery: Gallery) -> Self {
        Self {
            id: gallery.id,
            name: gallery.name,
            client_name: gallery.client_name,
            status: gallery.status,
            published_at: gallery.published_at,
            created_at: gallery.created_at,
        }
    }
}

/// Basic health response.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Detailed health response with dependency checks.
#[derive(Debug, Clone, Serialize)]
pub struct DetailedHealthResponse {
    pub status: String,
    pub database: String,
    pub storage: String,
}
