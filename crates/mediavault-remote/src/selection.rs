//! Picker selection expansion.
//!
//! The gallery UI submits opaque chooser selections: some are files,
//! some are whole folders. Files pass straight through; folders are
//! expanded recursively into one reference per contained file, all
//! feeding the same [`ReferenceResolver`](crate::resolver) pipeline.

use std::sync::Arc;

use serde::Deserialize;
use tracing::debug;

use mediavault_core::error::AppError;
use mediavault_core::result::AppResult;

use crate::client::RemoteSource;
use crate::resolver::AssetReference;
use crate::types::{RemoteEntry, RemoteFile};

/// One entry of a picker selection, as submitted by the UI.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionEntry {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, alias = "is_dir")]
    pub is_dir: bool,
}

impl SelectionEntry {
    /// The reference the remote API accepts for this entry: the file id
    /// when present, else the path.
    fn remote_reference(&self) -> Option<&str> {
        self.id.as_deref().or(self.path.as_deref())
    }
}

/// Expands picker selections into flat asset references.
pub struct SelectionExpander {
    source: Arc<dyn RemoteSource>,
    has_credential: bool,
}

impl SelectionExpander {
    pub fn new(source: Arc<dyn RemoteSource>, has_credential: bool) -> Self {
        Self {
            source,
            has_credential,
        }
    }

    /// Expand `selections` into asset references.
    ///
    /// Fails before touching the network when no remote credential is
    /// configured, and fails as a whole on any listing error so a batch
    /// is never partially admitted.
    pub async fn expand(&self, selections: &[SelectionEntry]) -> AppResult<Vec<AssetReference>> {
        if !self.has_credential {
            return Err(AppError::configuration(
                "Selection import requires a Dropbox access token and none is configured",
            ));
        }

        let mut references = Vec::new();
        for entry in selections {
            if entry.is_dir {
                let folder = entry.remote_reference().ok_or_else(|| {
                    AppError::validation("Folder selection carries neither an id nor a path")
                })?;
                let entries = self.source.list_folder(folder, true).await?;
                for listed in entries {
                    if let RemoteEntry::File(file) = listed {
                        references.push(file_reference(&file));
                    }
                }
            } else {
                references.push(AssetReference {
                    file_id: entry.id.clone(),
                    path: entry.path.clone(),
                    file_name: entry.name.clone(),
                });
            }
        }

        debug!(
            selections = selections.len(),
            references = references.len(),
            "Expanded picker selection"
        );
        Ok(references)
    }
}

fn file_reference(file: &RemoteFile) -> AssetReference {
    AssetReference {
        file_id: Some(file.id.clone()),
        path: file.path_display.clone().or_else(|| file.path_lower.clone()),
        file_name: Some(file.name.clone()),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use async_trait::async_trait;
    use bytes::Bytes;
    use mediavault_core::ErrorKind;

    use super::*;

    struct FakeSource {
        folders: HashMap<String, Vec<RemoteEntry>>,
    }

    #[async_trait]
    impl RemoteSource for FakeSource {
        async fn list_folder(&self, path: &str, recursive: bool) -> AppResult<Vec<RemoteEntry>> {
            assert!(recursive, "selection expansion must list recursively");
            self.folders
                .get(path)
                .cloned()
                .ok_or_else(|| AppError::not_found(format!("no folder '{path}'")))
        }

        async fn download(&self, _reference: &str) -> AppResult<(RemoteFile, Bytes)> {
            unimplemented!("not used by selection tests")
        }
    }

    fn file(id: &str, path: &str) -> RemoteEntry {
        RemoteEntry::File(RemoteFile {
            id: id.to_string(),
            name: path.rsplit('/').next().unwrap_or(path).to_string(),
            path_display: Some(path.to_string()),
            path_lower: Some(path.to_lowercase()),
            size: Some(1),
            rev: None,
            content_hash: None,
            client_modified: None,
            server_modified: None,
        })
    }

    fn expander(folders: Vec<(&str, Vec<RemoteEntry>)>, has_credential: bool) -> SelectionExpander {
        SelectionExpander::new(
            Arc::new(FakeSource {
                folders: folders
                    .into_iter()
                    .map(|(k, v)| (k.to_string(), v))
                    .collect(),
            }),
            has_credential,
        )
    }

    #[tokio::test]
    async fn file_selections_pass_through() {
        let expander = expander(vec![], true);
        let selections = vec![SelectionEntry {
            id: Some("id:a".to_string()),
            path: Some("/x/a.jpg".to_string()),
            name: Some("a.jpg".to_string()),
            is_dir: false,
        }];

        let refs = expander.expand(&selections).await.unwrap();
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].file_id.as_deref(), Some("id:a"));
        assert_eq!(refs[0].file_name.as_deref(), Some("a.jpg"));
    }

    #[tokio::test]
    async fn folder_selections_expand_to_contained_files() {
        let expander = expander(
            vec![(
                "id:folder",
                vec![file("id:a", "/x/a.jpg"), file("id:b", "/x/sub/b.jpg")],
            )],
            true,
        );
        let selections = vec![SelectionEntry {
            id: Some("id:folder".to_string()),
            is_dir: true,
            ..Default::default()
        }];

        let refs = expander.expand(&selections).await.unwrap();
        assert_eq!(refs.len(), 2);
        assert_eq!(refs[1].path.as_deref(), Some("/x/sub/b.jpg"));
    }

    #[tokio::test]
    async fn missing_credential_is_a_configuration_error() {
        let expander = expander(vec![], false);
        let err = expander.expand(&[SelectionEntry::default()]).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Configuration);
    }

    #[tokio::test]
    async fn listing_failure_rejects_the_whole_selection() {
        let expander = expander(vec![], true);
        let selections = vec![
            SelectionEntry {
                id: Some("id:a".to_string()),
                is_dir: false,
                ..Default::default()
            },
            SelectionEntry {
                id: Some("id:gone".to_string()),
                is_dir: true,
                ..Default::default()
            },
        ];

        assert!(expander.expand(&selections).await.is_err());
    }
}
