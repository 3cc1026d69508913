//! Asset catalog repository.

use sqlx::PgPool;
use tracing::warn;
use uuid::Uuid;

use mediavault_core::error::{AppError, ErrorKind};
use mediavault_core::result::AppResult;
use mediavault_entity::asset::{Asset, AssetScope, CreateAsset};

const INSERT_COLUMNS: &str = "client_id, project_code, file_name, content_type, size_bytes, \
     bucket, storage_path, public_url, checksum, duplicate_of, dropbox_file_id, dropbox_rev";

/// Repository for the durable record of every stored asset.
#[derive(Debug, Clone)]
pub struct AssetRepository {
    pool: PgPool,
}

impl AssetRepository {
    /// Create a new asset repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find an asset by ID.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Asset>> {
        sqlx::query_as::<_, Asset>("SELECT * FROM assets WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find asset", e))
    }

    /// Insert a new asset record.
    ///
    /// The `source` provenance column is optional schema: if the insert
    /// fails with `undefined_column`, it is retried once with that field
    /// stripped so schema drift does not make ingestion brittle. A
    /// unique violation on the dedup index is surfaced as a conflict;
    /// callers convert it to the duplicate path.
    pub async fn create(&self, data: &CreateAsset) -> AppResult<Asset> {
        match self.insert(data, true).await {
            Ok(asset) => Ok(asset),
            Err(e) if super::is_undefined_column(&e) => {
                warn!(
                    file_name = %data.file_name,
                    "assets.source column missing, retrying insert without it"
                );
                self.insert(data, false).await.map_err(Self::map_insert_err)
            }
            Err(e) => Err(Self::map_insert_err(e)),
        }
    }

    async fn insert(&self, data: &CreateAsset, with_source: bool) -> Result<Asset, sqlx::Error> {
        let query = if with_source {
            format!(
                "INSERT INTO assets ({INSERT_COLUMNS}, source) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13) RETURNING *"
            )
        } else {
            format!(
                "INSERT INTO assets ({INSERT_COLUMNS}) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) RETURNING *"
            )
        };

        let mut q = sqlx::query_as::<_, Asset>(&query)
            .bind(&data.client_id)
            .bind(&data.project_code)
            .bind(&data.file_name)
            .bind(&data.content_type)
            .bind(data.size_bytes)
            .bind(&data.bucket)
            .bind(&data.storage_path)
            .bind(&data.public_url)
            .bind(&data.checksum)
            .bind(data.duplicate_of)
            .bind(&data.dropbox_file_id)
            .bind(&data.dropbox_rev);
        if with_source {
            q = q.bind(&data.source);
        }

        q.fetch_one(&self.pool).await
    }

    fn map_insert_err(e: sqlx::Error) -> AppError {
        if super::is_unique_violation(&e) {
            AppError::conflict("An asset with this checksum already exists in this scope")
        } else {
            AppError::with_source(ErrorKind::Database, "Failed to create asset", e)
        }
    }

    /// Find the stored asset matching a content digest within a scope.
    ///
    /// An absent scope key matches only other absences (`IS NOT DISTINCT
    /// FROM`), never "any tenant". Prefers the original row
    /// (`duplicate_of IS NULL`) when one exists.
    pub async fn find_duplicate(
        &self,
        checksum: &str,
        scope: &AssetScope,
    ) -> AppResult<Option<Asset>> {
        sqlx::query_as::<_, Asset>(
            "SELECT * FROM assets \
             WHERE checksum = $1 \
               AND client_id IS NOT DISTINCT FROM $2 \
               AND project_code IS NOT DISTINCT FROM $3 \
             ORDER BY (duplicate_of IS NULL) DESC, uploaded_at ASC \
             LIMIT 1",
        )
        .bind(checksum)
        .bind(&scope.client_id)
        .bind(&scope.project_code)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to look up duplicate", e))
    }

    /// Update only the remote-linkage fields of an existing asset.
    ///
    /// Used on a dedup hit when a later import references the same
    /// content via a different Dropbox file id or revision. Storage
    /// coordinates and checksum are never touched.
    pub async fn link_remote(
        &self,
        id: Uuid,
        dropbox_file_id: Option<&str>,
        dropbox_rev: Option<&str>,
    ) -> AppResult<Asset> {
        sqlx::query_as::<_, Asset>(
            "UPDATE assets SET \
                dropbox_file_id = COALESCE($2, dropbox_file_id), \
                dropbox_rev = COALESCE($3, dropbox_rev) \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(dropbox_file_id)
        .bind(dropbox_rev)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to link remote file", e))?
        .ok_or_else(|| AppError::not_found(format!("Asset {id} not found")))
    }

    /// Bulk-associate stored assets with a gallery.
    ///
    /// Tolerates the `gallery_id` column being absent (older schema):
    /// the association is skipped with a warning instead of failing the
    /// whole batch.
    pub async fn attach_to_gallery(&self, asset_ids: &[Uuid], gallery_id: Uuid) -> AppResult<u64> {
        if asset_ids.is_empty() {
            return Ok(0);
        }

        let result = sqlx::query("UPDATE assets SET gallery_id = $1 WHERE id = ANY($2)")
            .bind(gallery_id)
            .bind(asset_ids)
            .execute(&self.pool)
            .await;

        match result {
            Ok(r) => Ok(r.rows_affected()),
            Err(e) if super::is_undefined_column(&e) => {
                warn!(
                    %gallery_id,
                    count = asset_ids.len(),
                    "assets.gallery_id column missing, skipping gallery association"
                );
                Ok(0)
            }
            Err(e) => Err(AppError::with_source(
                ErrorKind::Database,
                "Failed to attach assets to gallery",
                e,
            )),
        }
    }

    /// List assets attached to a gallery.
    pub async fn find_by_gallery(&self, gallery_id: Uuid) -> AppResult<Vec<Asset>> {
        sqlx::query_as::<_, Asset>(
            "SELECT * FROM assets WHERE gallery_id = $1 ORDER BY uploaded_at ASC",
        )
        .bind(gallery_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list gallery assets", e))
    }

    /// Count all assets.
    pub async fn count_all(&self) -> AppResult<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM assets")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count assets", e))
    }
}
