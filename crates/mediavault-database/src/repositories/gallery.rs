//! Gallery repository.

use sqlx::PgPool;
use uuid::Uuid;

use mediavault_core::error::{AppError, ErrorKind};
use mediavault_core::result::AppResult;
use mediavault_entity::gallery::{Gallery, PublicationLogEntry, status};

/// Repository for galleries and their publication log.
#[derive(Debug, Clone)]
pub struct GalleryRepository {
    pool: PgPool,
}

impl GalleryRepository {
    /// Create a new gallery repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a gallery by ID.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Gallery>> {
        sqlx::query_as::<_, Gallery>("SELECT * FROM galleries WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find gallery", e))
    }

    /// Find a gallery by name, creating a draft one when absent.
    ///
    /// Webhook deliveries from the picker flow may name a gallery that
    /// does not exist yet; they always need a target container.
    pub async fn find_or_create_by_name(
        &self,
        name: &str,
        client_name: Option<&str>,
    ) -> AppResult<Gallery> {
        if let Some(gallery) =
            sqlx::query_as::<_, Gallery>("SELECT * FROM galleries WHERE name = $1 LIMIT 1")
                .bind(name)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to find gallery", e)
                })?
        {
            return Ok(gallery);
        }

        sqlx::query_as::<_, Gallery>(
            "INSERT INTO galleries (name, client_name, status) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(name)
        .bind(client_name)
        .bind(status::DRAFT)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create gallery", e))
    }

    /// Mark a gallery as published. Returns `None` if the id is unknown.
    pub async fn mark_published(&self, id: Uuid) -> AppResult<Option<Gallery>> {
        sqlx::query_as::<_, Gallery>(
            "UPDATE galleries SET status = $2, published_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(status::PUBLISHED)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to publish gallery", e))
    }

    /// Append one row to the publication log.
    pub async fn append_publication_log(
        &self,
        gallery_id: Uuid,
        detail: &serde_json::Value,
    ) -> AppResult<PublicationLogEntry> {
        sqlx::query_as::<_, PublicationLogEntry>(
            "INSERT INTO publication_log (gallery_id, detail) VALUES ($1, $2) RETURNING *",
        )
        .bind(gallery_id)
        .bind(detail)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to append publication log", e)
        })
    }
}
