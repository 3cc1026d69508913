//! Wire types for the Dropbox API.

use serde::Deserialize;

/// A file entry returned by a folder listing.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteFile {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub path_display: Option<String>,
    #[serde(default)]
    pub path_lower: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub rev: Option<String>,
    #[serde(default)]
    pub content_hash: Option<String>,
    #[serde(default)]
    pub client_modified: Option<String>,
    #[serde(default)]
    pub server_modified: Option<String>,
}

impl RemoteFile {
    /// Best display path for logging and error messages.
    pub fn display_path(&self) -> &str {
        self.path_display.as_deref().unwrap_or(&self.name)
    }
}

/// A folder entry returned by a listing.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteFolder {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub path_display: Option<String>,
    #[serde(default)]
    pub path_lower: Option<String>,
}

/// One entry of a folder listing. Dropbox tags entries with `.tag`;
/// anything that is not a file or folder (deleted markers) is ignored
/// at parse time.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = ".tag", rename_all = "snake_case")]
pub enum RemoteEntry {
    File(RemoteFile),
    Folder(RemoteFolder),
    #[serde(other)]
    Other,
}

/// Response body of `files/list_folder` and `files/list_folder/continue`.
#[derive(Debug, Deserialize)]
pub struct ListFolderResponse {
    pub entries: Vec<RemoteEntry>,
    pub cursor: String,
    pub has_more: bool,
}

/// Extract the parent folder of a Dropbox path (`/a/b/c.jpg` -> `/a/b`).
///
/// Root-level files and bare names resolve to the root folder, which
/// Dropbox spells as the empty string.
pub fn parent_folder(path: &str) -> String {
    match path.rfind('/') {
        Some(0) | None => String::new(),
        Some(idx) => path[..idx].to_string(),
    }
}
