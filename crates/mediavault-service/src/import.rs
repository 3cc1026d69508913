//! Batch import orchestration.
//!
//! Drives a resolved list of remote files through download, dedupe,
//! store, and catalog with bounded concurrency. Failures are isolated
//! per item: one file's failure never aborts or rolls back its
//! siblings, and the batch summarizes into imported/skipped counts with
//! a per-item status.

use std::sync::Arc;

use futures::StreamExt;
use serde::Serialize;
use tracing::{error, info, warn};
use uuid::Uuid;

use mediavault_core::error::AppError;
use mediavault_core::result::AppResult;
use mediavault_entity::asset::AssetScope;
use mediavault_remote::client::RemoteSource;
use mediavault_remote::resolver::{AssetReference, ReferenceResolver, ResolvedFile};
use mediavault_remote::selection::{SelectionEntry, SelectionExpander};

use crate::catalog::AssetCatalog;
use crate::ingest::{IngestRequest, IngestService};
use crate::notify::Notifier;

/// One batch of work for the orchestrator.
#[derive(Debug, Clone, Default)]
pub struct ImportRequest {
    pub gallery_id: Uuid,
    pub gallery_name: Option<String>,
    pub client_name: Option<String>,
    pub folder_path: Option<String>,
    /// Emit an outbound notification when the batch completes.
    pub notify: bool,
    pub references: Vec<AssetReference>,
    pub selection: Vec<SelectionEntry>,
}

/// Terminal status of one batch item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    Stored,
    Duplicate,
    Error,
}

/// Outcome of one item, reported back per input file.
#[derive(Debug, Clone, Serialize)]
pub struct ItemResult {
    pub file_name: String,
    pub dropbox_file_id: Option<String>,
    pub status: ItemStatus,
    pub asset_id: Option<Uuid>,
    pub error: Option<String>,
}

/// Aggregated counts for one batch. `skipped` is everything that was
/// not newly imported: dedup hits and failures alike.
#[derive(Debug, Clone, Serialize)]
pub struct ImportSummary {
    pub imported: usize,
    pub skipped: usize,
    pub items: Vec<ItemResult>,
}

impl ImportSummary {
    /// File names of the items that failed.
    pub fn failed_items(&self) -> Vec<&str> {
        self.items
            .iter()
            .filter(|i| i.status == ItemStatus::Error)
            .map(|i| i.file_name.as_str())
            .collect()
    }
}

/// Result of one batch: full success or partial failure. Partial
/// batches map to a multi-status HTTP response rather than a binary
/// success/failure.
#[derive(Debug, Clone)]
pub enum BatchOutcome {
    Complete(ImportSummary),
    Partial(ImportSummary),
}

impl BatchOutcome {
    pub fn summary(&self) -> &ImportSummary {
        match self {
            BatchOutcome::Complete(s) | BatchOutcome::Partial(s) => s,
        }
    }
}

/// Orchestrates resolve → download → dedupe → store → catalog over a
/// batch of remote files.
pub struct ImportService {
    resolver: ReferenceResolver,
    expander: SelectionExpander,
    remote: Arc<dyn RemoteSource>,
    ingest: Arc<IngestService>,
    catalog: Arc<dyn AssetCatalog>,
    notifier: Notifier,
    max_concurrency: usize,
}

impl ImportService {
    pub fn new(
        remote: Arc<dyn RemoteSource>,
        has_remote_credential: bool,
        ingest: Arc<IngestService>,
        catalog: Arc<dyn AssetCatalog>,
        notifier: Notifier,
        max_concurrency: usize,
    ) -> Self {
        Self {
            resolver: ReferenceResolver::new(remote.clone()),
            expander: SelectionExpander::new(remote.clone(), has_remote_credential),
            remote,
            ingest,
            catalog,
            notifier,
            max_concurrency: max_concurrency.max(1),
        }
    }

    /// Run one batch.
    ///
    /// Fails as a whole only before any item starts: selection
    /// expansion errors, listing errors, an empty resolution, or every
    /// single item failing. Items already committed to the catalog stay
    /// committed regardless of sibling outcomes.
    pub async fn run(&self, request: ImportRequest) -> AppResult<BatchOutcome> {
        let references = if request.selection.is_empty() {
            request.references.clone()
        } else {
            self.expander.expand(&request.selection).await?
        };

        let resolved = self
            .resolver
            .resolve(&references, request.folder_path.as_deref())
            .await?;

        if resolved.is_empty() {
            return Err(AppError::validation(
                "Import request resolved to zero assets",
            ));
        }

        let scope = AssetScope::new(request.client_name.clone(), request.gallery_name.clone());
        let total = resolved.len();

        let items: Vec<ItemResult> = futures::stream::iter(resolved)
            .map(|file| self.process_item(file, &scope))
            .buffer_unordered(self.max_concurrency)
            .collect()
            .await;

        let imported = items
            .iter()
            .filter(|i| i.status == ItemStatus::Stored)
            .count();
        let failed = items
            .iter()
            .filter(|i| i.status == ItemStatus::Error)
            .count();

        if failed == total {
            // Nothing got through; surface the first cause for the batch.
            let cause = items
                .iter()
                .find_map(|i| i.error.as_deref())
                .unwrap_or("unknown");
            return Err(AppError::external(format!(
                "All {total} items in the batch failed: {cause}"
            )));
        }

        let attached: Vec<Uuid> = items.iter().filter_map(|i| i.asset_id).collect();
        self.catalog
            .attach_to_gallery(&attached, request.gallery_id)
            .await?;

        let summary = ImportSummary {
            imported,
            skipped: total - imported,
            items,
        };

        info!(
            gallery_id = %request.gallery_id,
            imported = summary.imported,
            skipped = summary.skipped,
            failed,
            "Import batch finished"
        );

        if request.notify {
            self.notifier
                .import_completed(request.gallery_id, summary.imported, summary.skipped);
        }

        if failed > 0 {
            Ok(BatchOutcome::Partial(summary))
        } else {
            Ok(BatchOutcome::Complete(summary))
        }
    }

    /// Download one resolved file and run it through ingestion. Every
    /// failure is captured as this item's terminal status.
    async fn process_item(&self, file: ResolvedFile, scope: &AssetScope) -> ItemResult {
        let file_name = file.file.name.clone();
        let file_id = file.file.id.clone();

        match self.import_one(file, scope).await {
            Ok((asset_id, deduplicated)) => ItemResult {
                file_name,
                dropbox_file_id: Some(file_id),
                status: if deduplicated {
                    ItemStatus::Duplicate
                } else {
                    ItemStatus::Stored
                },
                asset_id: Some(asset_id),
                error: None,
            },
            Err(err) => {
                warn!(file_name, error = %err, "Import item failed");
                ItemResult {
                    file_name,
                    dropbox_file_id: Some(file_id),
                    status: ItemStatus::Error,
                    asset_id: None,
                    error: Some(err.to_string()),
                }
            }
        }
    }

    async fn import_one(&self, file: ResolvedFile, scope: &AssetScope) -> AppResult<(Uuid, bool)> {
        let (metadata, bytes) = self.remote.download(&file.file.id).await?;

        let outcome = self
            .ingest
            .store_bytes(IngestRequest {
                bytes,
                file_name: file.file.name,
                content_type: None,
                scope: scope.clone(),
                dropbox_file_id: Some(metadata.id),
                dropbox_rev: metadata.rev,
                source: "import",
            })
            .await
            .inspect_err(|err| {
                error!(error = %err, "Failed to store downloaded file");
            })?;

        Ok((outcome.asset.id, outcome.deduplicated))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use async_trait::async_trait;
    use bytes::Bytes;
    use mediavault_core::ErrorKind;
    use mediavault_remote::types::{RemoteEntry, RemoteFile};
    use mediavault_storage::MemoryBlobStore;

    use crate::catalog::testing::MemoryCatalog;
    use crate::ingest::IngestService;

    use super::*;

    /// Remote source serving canned folders; download fails for ids in
    /// `broken`.
    struct FakeRemote {
        folders: HashMap<String, Vec<RemoteFile>>,
        contents: HashMap<String, Bytes>,
        broken: Vec<String>,
    }

    #[async_trait]
    impl RemoteSource for FakeRemote {
        async fn list_folder(&self, path: &str, _recursive: bool) -> AppResult<Vec<RemoteEntry>> {
            self.folders
                .get(path)
                .map(|files| files.iter().cloned().map(RemoteEntry::File).collect())
                .ok_or_else(|| AppError::not_found(format!("no folder '{path}'")))
        }

        async fn download(&self, reference: &str) -> AppResult<(RemoteFile, Bytes)> {
            if self.broken.iter().any(|b| b == reference) {
                return Err(AppError::external("Dropbox returned 500"));
            }
            let bytes = self
                .contents
                .get(reference)
                .cloned()
                .ok_or_else(|| AppError::not_found(format!("no file '{reference}'")))?;
            let file = self
                .folders
                .values()
                .flatten()
                .find(|f| f.id == reference)
                .cloned()
                .ok_or_else(|| AppError::not_found("no metadata"))?;
            Ok((file, bytes))
        }
    }

    fn remote_file(id: &str, path: &str) -> RemoteFile {
        RemoteFile {
            id: id.to_string(),
            name: path.rsplit('/').next().unwrap_or(path).to_string(),
            path_display: Some(path.to_string()),
            path_lower: Some(path.to_lowercase()),
            size: Some(3),
            rev: Some("r1".to_string()),
            content_hash: None,
            client_modified: None,
            server_modified: None,
        }
    }

    struct Fixture {
        service: ImportService,
        catalog: Arc<MemoryCatalog>,
        store: Arc<MemoryBlobStore>,
    }

    fn fixture(files: Vec<(&str, &str, &[u8])>, broken: Vec<&str>, credential: bool) -> Fixture {
        let mut folders: HashMap<String, Vec<RemoteFile>> = HashMap::new();
        let mut contents = HashMap::new();
        for (id, path, bytes) in files {
            let file = remote_file(id, path);
            let folder = mediavault_remote::types::parent_folder(path);
            folders.entry(folder).or_default().push(file);
            contents.insert(id.to_string(), Bytes::copy_from_slice(bytes));
        }

        let remote = Arc::new(FakeRemote {
            folders,
            contents,
            broken: broken.into_iter().map(String::from).collect(),
        });
        let catalog = Arc::new(MemoryCatalog::new());
        let store = Arc::new(MemoryBlobStore::new("test-bucket"));
        let ingest = Arc::new(IngestService::new(
            catalog.clone(),
            store.clone(),
            "test-bucket".to_string(),
        ));

        Fixture {
            service: ImportService::new(
                remote,
                credential,
                ingest,
                catalog.clone(),
                Notifier::disabled(),
                4,
            ),
            catalog,
            store,
        }
    }

    fn folder_request(folder: &str) -> ImportRequest {
        ImportRequest {
            gallery_id: Uuid::new_v4(),
            gallery_name: Some("W2026".to_string()),
            client_name: Some("acme".to_string()),
            folder_path: Some(folder.to_string()),
            notify: false,
            references: Vec::new(),
            selection: Vec::new(),
        }
    }

    #[tokio::test]
    async fn full_success_attaches_everything_to_the_gallery() {
        let fx = fixture(
            vec![
                ("id:a", "/shoot/a.jpg", b"aaa"),
                ("id:b", "/shoot/b.jpg", b"bbb"),
            ],
            vec![],
            true,
        );
        let request = folder_request("/shoot");
        let gallery_id = request.gallery_id;

        let outcome = fx.service.run(request).await.unwrap();

        let BatchOutcome::Complete(summary) = outcome else {
            panic!("expected a complete batch");
        };
        assert_eq!(summary.imported, 2);
        assert_eq!(summary.skipped, 0);
        assert!(
            fx.catalog
                .rows()
                .iter()
                .all(|a| a.gallery_id == Some(gallery_id))
        );
    }

    #[tokio::test]
    async fn one_failing_item_does_not_abort_its_siblings() {
        let fx = fixture(
            vec![
                ("id:a", "/shoot/a.jpg", b"aaa"),
                ("id:bad", "/shoot/bad.jpg", b"xxx"),
            ],
            vec!["id:bad"],
            true,
        );

        let outcome = fx.service.run(folder_request("/shoot")).await.unwrap();

        let BatchOutcome::Partial(summary) = outcome else {
            panic!("expected a partial batch");
        };
        assert_eq!(summary.imported, 1);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.failed_items(), vec!["bad.jpg"]);
        // The sibling stayed committed.
        assert_eq!(fx.catalog.originals(), 1);
    }

    #[tokio::test]
    async fn identical_content_short_circuits_to_duplicate() {
        let fx = fixture(
            vec![
                ("id:a", "/shoot/a.jpg", b"same"),
                ("id:b", "/shoot/b.jpg", b"same"),
            ],
            vec![],
            true,
        );

        let outcome = fx.service.run(folder_request("/shoot")).await.unwrap();

        let summary = outcome.summary();
        assert_eq!(summary.imported, 1);
        assert_eq!(summary.skipped, 1);
        assert!(
            summary
                .items
                .iter()
                .any(|i| i.status == ItemStatus::Duplicate)
        );
        // The duplicate never touched the blob store.
        assert_eq!(fx.store.object_count(), 1);
    }

    #[tokio::test]
    async fn empty_resolution_is_a_validation_error() {
        let fx = fixture(vec![("id:a", "/shoot/a.jpg", b"aaa")], vec![], true);

        let mut request = folder_request("/shoot");
        request.folder_path = None;
        request.references = vec![AssetReference {
            file_id: Some("id:missing".to_string()),
            path: Some("/shoot/missing.jpg".to_string()),
            file_name: None,
        }];

        let err = fx.service.run(request).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[tokio::test]
    async fn selection_import_without_credential_fails_fast() {
        let fx = fixture(vec![("id:a", "/shoot/a.jpg", b"aaa")], vec![], false);

        let mut request = folder_request("/shoot");
        request.selection = vec![SelectionEntry {
            id: Some("id:a".to_string()),
            ..Default::default()
        }];

        let err = fx.service.run(request).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Configuration);
    }

    #[tokio::test]
    async fn all_items_failing_fails_the_batch() {
        let fx = fixture(
            vec![
                ("id:a", "/shoot/a.jpg", b"aaa"),
                ("id:b", "/shoot/b.jpg", b"bbb"),
            ],
            vec!["id:a", "id:b"],
            true,
        );

        let err = fx.service.run(folder_request("/shoot")).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::ExternalService);
    }
}
