//! Asset entity model — one physical piece of stored content.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A stored media asset.
///
/// Exactly one row per distinct (checksum, client_id, project_code)
/// triple has `duplicate_of = NULL`; every other row sharing that triple
/// points at that original. Duplicate rows carry no storage coordinates
/// of their own — the bytes are never written twice for the same scope.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Asset {
    /// Unique asset identifier.
    pub id: Uuid,
    /// Tenant scope key (client identifier). `None` matches only `None`.
    pub client_id: Option<String>,
    /// Secondary scope key (project code).
    pub project_code: Option<String>,
    /// Original file name as declared by the uploader.
    pub file_name: String,
    /// Declared MIME type.
    pub content_type: Option<String>,
    /// Content size in bytes.
    pub size_bytes: i64,
    /// Storage bucket. `None` for duplicate rows.
    pub bucket: Option<String>,
    /// Path within the bucket. `None` for duplicate rows.
    pub storage_path: Option<String>,
    /// Publicly resolvable URL, when one could be determined.
    pub public_url: Option<String>,
    /// SHA-256 content digest (hex), the dedup key.
    pub checksum: String,
    /// Back-reference to the original asset when this row is a duplicate.
    pub duplicate_of: Option<Uuid>,
    /// Dropbox file id this asset was imported from, if any.
    pub dropbox_file_id: Option<String>,
    /// Dropbox revision token at import time.
    pub dropbox_rev: Option<String>,
    /// Provenance tag ("upload", "webhook", "import"). Optional column:
    /// older schemas lack it and ingestion tolerates that.
    pub source: Option<String>,
    /// Gallery this asset is attached to, if published into one.
    pub gallery_id: Option<Uuid>,
    /// When the asset was first stored.
    pub uploaded_at: DateTime<Utc>,
}

impl Asset {
    /// Whether this row is a duplicate pointer rather than an original.
    pub fn is_duplicate(&self) -> bool {
        self.duplicate_of.is_some()
    }

    /// The id duplicates of this asset should point at: the terminal
    /// ancestor, never an intermediate hop.
    pub fn dedup_target(&self) -> Uuid {
        self.duplicate_of.unwrap_or(self.id)
    }
}

/// The (tenant, project) pair that bounds deduplication.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct AssetScope {
    /// Tenant scope key.
    pub client_id: Option<String>,
    /// Secondary scope key.
    pub project_code: Option<String>,
}

impl AssetScope {
    /// Create a scope from optional keys.
    pub fn new(client_id: Option<String>, project_code: Option<String>) -> Self {
        Self {
            client_id,
            project_code,
        }
    }
}

/// Data required to create a new asset record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAsset {
    /// Tenant scope key.
    pub client_id: Option<String>,
    /// Secondary scope key.
    pub project_code: Option<String>,
    /// Original file name.
    pub file_name: String,
    /// Declared MIME type.
    pub content_type: Option<String>,
    /// Content size in bytes.
    pub size_bytes: i64,
    /// Storage bucket.
    pub bucket: Option<String>,
    /// Path within the bucket.
    pub storage_path: Option<String>,
    /// Publicly resolvable URL.
    pub public_url: Option<String>,
    /// SHA-256 content digest (hex).
    pub checksum: String,
    /// Back-reference when inserting a duplicate row.
    pub duplicate_of: Option<Uuid>,
    /// Dropbox file id.
    pub dropbox_file_id: Option<String>,
    /// Dropbox revision token.
    pub dropbox_rev: Option<String>,
    /// Provenance tag.
    pub source: Option<String>,
}
