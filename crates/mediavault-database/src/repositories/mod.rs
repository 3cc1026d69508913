//! Repository implementations, one per persisted entity.

pub mod asset;
pub mod gallery;
pub mod webhook_event;

pub use asset::AssetRepository;
pub use gallery::GalleryRepository;
pub use webhook_event::WebhookEventRepository;

/// Whether a database error is Postgres `undefined_column` (42703).
///
/// Ingestion tolerates one known schema variance: deployments whose
/// `assets` table predates the optional `source` / `gallery_id` columns.
pub(crate) fn is_undefined_column(err: &sqlx::Error) -> bool {
    db_code_is(err, "42703")
}

/// Whether a database error is Postgres `unique_violation` (23505).
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    db_code_is(err, "23505")
}

fn db_code_is(err: &sqlx::Error, code: &str) -> bool {
    match err {
        sqlx::Error::Database(db) => db.code().as_deref() == Some(code),
        _ => false,
    }
}
