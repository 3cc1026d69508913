//! Gallery entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Gallery status values.
pub mod status {
    /// Created but not yet published.
    pub const DRAFT: &str = "draft";
    /// Published and visible to the client.
    pub const PUBLISHED: &str = "published";
}

/// A client-facing gallery that imported assets attach to.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Gallery {
    /// Unique gallery identifier.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Client the gallery belongs to.
    pub client_name: Option<String>,
    /// Publication state: `draft` or `published`.
    pub status: String,
    /// When the gallery was published, if it has been.
    pub published_at: Option<DateTime<Utc>>,
    /// When the gallery was created.
    pub created_at: DateTime<Utc>,
}

impl Gallery {
    /// Whether the gallery has been published.
    pub fn is_published(&self) -> bool {
        self.status == status::PUBLISHED
    }
}

/// One row of the append-only publication log.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PublicationLogEntry {
    /// Unique log entry identifier.
    pub id: Uuid,
    /// The gallery that was published.
    pub gallery_id: Uuid,
    /// When the publication happened.
    pub published_at: DateTime<Utc>,
    /// Free-form detail (asset counts, actor).
    pub detail: serde_json::Value,
}
