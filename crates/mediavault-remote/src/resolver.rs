//! Remote reference resolution.
//!
//! Import requests arrive with loosely-specified references: a remote
//! file id, a path, a bare file name, or any mix of the three. The
//! resolver turns those into canonical file descriptors by listing each
//! distinct remote folder exactly once and matching entries with a
//! strict priority order.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, warn};

use mediavault_core::result::AppResult;

use crate::client::RemoteSource;
use crate::types::{RemoteEntry, RemoteFile, parent_folder};

/// One loosely-specified asset reference from an import request.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetReference {
    #[serde(default, alias = "dropboxFileId")]
    pub file_id: Option<String>,
    #[serde(default, alias = "dropboxPath")]
    pub path: Option<String>,
    #[serde(default)]
    pub file_name: Option<String>,
}

impl AssetReference {
    /// Folder to list for this reference: the parent of its own path
    /// when one is given, otherwise the caller's fallback folder,
    /// otherwise the remote root.
    fn effective_folder(&self, fallback: Option<&str>) -> String {
        match self.path.as_deref() {
            Some(path) if !path.is_empty() => parent_folder(path),
            _ => fallback.unwrap_or("").to_string(),
        }
    }

    fn is_empty(&self) -> bool {
        self.file_id.is_none() && self.path.is_none() && self.file_name.is_none()
    }
}

/// A resolved remote file together with the folder it was found in.
///
/// The folder is derived from the file's own canonical path; the
/// caller's folder hint only scopes the listing.
#[derive(Debug, Clone)]
pub struct ResolvedFile {
    pub file: RemoteFile,
    pub folder: String,
}

/// Resolves loose references against remote folder listings.
pub struct ReferenceResolver {
    source: Arc<dyn RemoteSource>,
}

impl ReferenceResolver {
    pub fn new(source: Arc<dyn RemoteSource>) -> Self {
        Self { source }
    }

    /// Resolve `references` to canonical descriptors.
    ///
    /// With an empty reference list and a fallback folder, every file in
    /// that folder is resolved (bulk-folder-import mode). Unresolvable
    /// references are dropped; the caller decides whether an empty
    /// result is fatal.
    pub async fn resolve(
        &self,
        references: &[AssetReference],
        fallback_folder: Option<&str>,
    ) -> AppResult<Vec<ResolvedFile>> {
        let references: Vec<&AssetReference> =
            references.iter().filter(|r| !r.is_empty()).collect();

        if references.is_empty() {
            return match fallback_folder {
                Some(folder) => self.resolve_whole_folder(folder).await,
                None => Ok(Vec::new()),
            };
        }

        // One listing per distinct folder, not per reference.
        let mut groups: HashMap<String, Vec<&AssetReference>> = HashMap::new();
        for reference in references {
            groups
                .entry(reference.effective_folder(fallback_folder))
                .or_default()
                .push(reference);
        }

        let mut resolved = Vec::new();
        let mut seen_ids = HashSet::new();

        for (folder, group) in groups {
            let files = self.list_files(&folder).await?;
            for reference in group {
                match match_reference(reference, &files) {
                    Some(file) => {
                        if seen_ids.insert(file.id.clone()) {
                            resolved.push(to_resolved(file.clone(), &folder));
                        }
                    }
                    None => {
                        warn!(?reference, folder, "Dropped unresolvable asset reference");
                    }
                }
            }
        }

        debug!(count = resolved.len(), "Resolved asset references");
        Ok(resolved)
    }

    async fn resolve_whole_folder(&self, folder: &str) -> AppResult<Vec<ResolvedFile>> {
        let files = self.list_files(folder).await?;
        let mut seen_ids = HashSet::new();
        Ok(files
            .into_iter()
            .filter(|f| seen_ids.insert(f.id.clone()))
            .map(|f| to_resolved(f, folder))
            .collect())
    }

    async fn list_files(&self, folder: &str) -> AppResult<Vec<RemoteFile>> {
        let entries = self.source.list_folder(folder, false).await?;
        Ok(entries
            .into_iter()
            .filter_map(|entry| match entry {
                RemoteEntry::File(file) => Some(file),
                _ => None,
            })
            .collect())
    }
}

fn to_resolved(file: RemoteFile, listing_folder: &str) -> ResolvedFile {
    let folder = file
        .path_display
        .as_deref()
        .map(parent_folder)
        .unwrap_or_else(|| listing_folder.to_string());
    ResolvedFile { file, folder }
}

/// Match one reference against a folder listing: file id first, then
/// case-insensitive path, then bare file name. The first criterion that
/// is present on the reference decides; later ones are not consulted.
fn match_reference<'a>(
    reference: &AssetReference,
    files: &'a [RemoteFile],
) -> Option<&'a RemoteFile> {
    if let Some(id) = reference.file_id.as_deref() {
        if let Some(file) = files.iter().find(|f| f.id == id) {
            return Some(file);
        }
    }

    if let Some(path) = reference.path.as_deref() {
        let wanted = path.to_lowercase();
        if let Some(file) = files.iter().find(|f| {
            f.path_lower.as_deref() == Some(wanted.as_str())
                || f.path_display
                    .as_deref()
                    .is_some_and(|p| p.to_lowercase() == wanted)
        }) {
            return Some(file);
        }
    }

    if let Some(name) = reference.file_name.as_deref() {
        if let Some(file) = files.iter().find(|f| f.name == name) {
            return Some(file);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use bytes::Bytes;
    use mediavault_core::error::AppError;

    use super::*;

    struct FakeSource {
        folders: HashMap<String, Vec<RemoteFile>>,
        list_calls: AtomicUsize,
    }

    impl FakeSource {
        fn new(folders: Vec<(&str, Vec<RemoteFile>)>) -> Self {
            Self {
                folders: folders
                    .into_iter()
                    .map(|(k, v)| (k.to_string(), v))
                    .collect(),
                list_calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl RemoteSource for FakeSource {
        async fn list_folder(&self, path: &str, _recursive: bool) -> AppResult<Vec<RemoteEntry>> {
            self.list_calls.fetch_add(1, Ordering::SeqCst);
            match self.folders.get(path) {
                Some(files) => Ok(files.iter().cloned().map(RemoteEntry::File).collect()),
                None => Err(AppError::not_found(format!("no folder '{path}'"))),
            }
        }

        async fn download(&self, _reference: &str) -> AppResult<(RemoteFile, Bytes)> {
            unimplemented!("not used by resolver tests")
        }
    }

    fn file(id: &str, path: &str) -> RemoteFile {
        let name = path.rsplit('/').next().unwrap_or(path).to_string();
        RemoteFile {
            id: id.to_string(),
            name,
            path_display: Some(path.to_string()),
            path_lower: Some(path.to_lowercase()),
            size: Some(100),
            rev: Some("r1".to_string()),
            content_hash: None,
            client_modified: None,
            server_modified: None,
        }
    }

    fn by_id(id: &str) -> AssetReference {
        AssetReference {
            file_id: Some(id.to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn one_listing_per_distinct_folder() {
        let source = Arc::new(FakeSource::new(vec![(
            "/shoot",
            vec![file("id:a", "/shoot/a.jpg"), file("id:b", "/shoot/b.jpg")],
        )]));
        let resolver = ReferenceResolver::new(source.clone());

        let refs = vec![
            AssetReference {
                path: Some("/shoot/a.jpg".to_string()),
                ..Default::default()
            },
            AssetReference {
                path: Some("/shoot/b.jpg".to_string()),
                ..Default::default()
            },
        ];
        let resolved = resolver.resolve(&refs, None).await.unwrap();

        assert_eq!(resolved.len(), 2);
        assert_eq!(source.list_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn file_id_wins_over_misleading_path() {
        let source = Arc::new(FakeSource::new(vec![(
            "/shoot",
            vec![file("id:a", "/shoot/a.jpg"), file("id:b", "/shoot/b.jpg")],
        )]));
        let resolver = ReferenceResolver::new(source);

        // Id points at b; path points at a. Id must win.
        let refs = vec![AssetReference {
            file_id: Some("id:b".to_string()),
            path: Some("/shoot/a.jpg".to_string()),
            file_name: None,
        }];
        let resolved = resolver.resolve(&refs, None).await.unwrap();

        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].file.id, "id:b");
    }

    #[tokio::test]
    async fn path_match_is_case_insensitive() {
        let source = Arc::new(FakeSource::new(vec![(
            "/shoot",
            vec![file("id:a", "/Shoot/Photo.JPG")],
        )]));
        let resolver = ReferenceResolver::new(source);

        let refs = vec![AssetReference {
            path: Some("/shoot/photo.jpg".to_string()),
            ..Default::default()
        }];
        let resolved = resolver.resolve(&refs, None).await.unwrap();

        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].file.id, "id:a");
    }

    #[tokio::test]
    async fn bare_name_matches_within_fallback_folder() {
        let source = Arc::new(FakeSource::new(vec![(
            "/shoot",
            vec![file("id:a", "/shoot/a.jpg")],
        )]));
        let resolver = ReferenceResolver::new(source);

        let refs = vec![AssetReference {
            file_name: Some("a.jpg".to_string()),
            ..Default::default()
        }];
        let resolved = resolver.resolve(&refs, Some("/shoot")).await.unwrap();

        assert_eq!(resolved.len(), 1);
    }

    #[tokio::test]
    async fn duplicate_references_collapse_by_file_id() {
        let source = Arc::new(FakeSource::new(vec![(
            "/shoot",
            vec![file("id:a", "/shoot/a.jpg")],
        )]));
        let resolver = ReferenceResolver::new(source);

        let refs = vec![
            by_id("id:a"),
            AssetReference {
                path: Some("/shoot/a.jpg".to_string()),
                ..Default::default()
            },
        ];
        let resolved = resolver.resolve(&refs, Some("/shoot")).await.unwrap();

        assert_eq!(resolved.len(), 1);
    }

    #[tokio::test]
    async fn unresolvable_references_are_dropped() {
        let source = Arc::new(FakeSource::new(vec![(
            "/shoot",
            vec![file("id:a", "/shoot/a.jpg")],
        )]));
        let resolver = ReferenceResolver::new(source);

        let refs = vec![by_id("id:a"), by_id("id:missing")];
        let resolved = resolver.resolve(&refs, Some("/shoot")).await.unwrap();

        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].file.id, "id:a");
    }

    #[tokio::test]
    async fn empty_reference_list_imports_whole_fallback_folder() {
        let source = Arc::new(FakeSource::new(vec![(
            "/shoot",
            vec![file("id:a", "/shoot/a.jpg"), file("id:b", "/shoot/b.jpg")],
        )]));
        let resolver = ReferenceResolver::new(source);

        let resolved = resolver.resolve(&[], Some("/shoot")).await.unwrap();
        assert_eq!(resolved.len(), 2);
    }

    #[tokio::test]
    async fn no_references_and_no_folder_resolves_to_nothing() {
        let source = Arc::new(FakeSource::new(vec![]));
        let resolver = ReferenceResolver::new(source.clone());

        let resolved = resolver.resolve(&[], None).await.unwrap();
        assert!(resolved.is_empty());
        assert_eq!(source.list_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn resolved_folder_comes_from_file_path_not_hint() {
        let source = Arc::new(FakeSource::new(vec![(
            "/hint",
            vec![file("id:a", "/real/location/a.jpg")],
        )]));
        let resolver = ReferenceResolver::new(source);

        let resolved = resolver.resolve(&[by_id("id:a")], Some("/hint")).await.unwrap();
        assert_eq!(resolved[0].folder, "/real/location");
    }
}
