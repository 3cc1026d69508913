//! Dropbox HTTP API client.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::StatusCode;
use serde_json::json;
use tracing::{debug, warn};

use mediavault_core::config::dropbox::DropboxConfig;
use mediavault_core::error::{AppError, ErrorKind};
use mediavault_core::result::AppResult;

use crate::types::{ListFolderResponse, RemoteEntry, RemoteFile};

const API_BASE: &str = "https://api.dropboxapi.com/2";
const CONTENT_BASE: &str = "https://content.dropboxapi.com/2";

/// Read-only view of a remote file source.
///
/// The production implementation is [`DropboxClient`]; tests substitute
/// in-memory fakes for the resolver and import pipeline.
#[async_trait]
pub trait RemoteSource: Send + Sync + 'static {
    /// List a folder's entries. `path` uses Dropbox conventions: `""`
    /// means the root folder, otherwise a `/`-rooted path or an `id:`
    /// folder identifier. Pagination is handled internally.
    async fn list_folder(&self, path: &str, recursive: bool) -> AppResult<Vec<RemoteEntry>>;

    /// Download a file's bytes together with its current metadata.
    /// `reference` is an `id:` file identifier or a display path.
    async fn download(&self, reference: &str) -> AppResult<(RemoteFile, Bytes)>;
}

/// Dropbox API client over a shared `reqwest` connection pool.
#[derive(Debug, Clone)]
pub struct DropboxClient {
    http: reqwest::Client,
    access_token: String,
}

impl DropboxClient {
    pub fn new(config: &DropboxConfig) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|err| {
                AppError::with_source(ErrorKind::Configuration, "Failed to build HTTP client", err)
            })?;

        Ok(Self {
            http,
            access_token: config.access_token.clone(),
        })
    }

    /// Map a non-success Dropbox status to a domain error.
    fn status_error(status: StatusCode, context: &str, body: &str) -> AppError {
        let summary = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|v| {
                v.get("error_summary")
                    .and_then(|s| s.as_str())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| body.chars().take(200).collect());

        match status {
            StatusCode::UNAUTHORIZED => AppError::authentication(format!(
                "Dropbox rejected the access token while {context}: {summary}"
            )),
            StatusCode::TOO_MANY_REQUESTS => AppError::rate_limit(format!(
                "Dropbox rate limit hit while {context}: {summary}"
            )),
            StatusCode::CONFLICT => {
                // 409 carries path errors such as not_found.
                if summary.contains("not_found") {
                    AppError::not_found(format!("Dropbox path not found while {context}"))
                } else {
                    AppError::external(format!("Dropbox path error while {context}: {summary}"))
                }
            }
            other => AppError::external(format!(
                "Dropbox returned {other} while {context}: {summary}"
            )),
        }
    }

    async fn list_page(
        &self,
        path: &str,
        recursive: bool,
        cursor: Option<&str>,
    ) -> AppResult<ListFolderResponse> {
        let (url, body) = match cursor {
            None => (
                format!("{API_BASE}/files/list_folder"),
                json!({ "path": path, "recursive": recursive, "limit": 2000 }),
            ),
            Some(cursor) => (
                format!("{API_BASE}/files/list_folder/continue"),
                json!({ "cursor": cursor }),
            ),
        };

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await
            .map_err(|err| {
                AppError::with_source(ErrorKind::ExternalService, "Dropbox listing request failed", err)
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Self::status_error(
                status,
                &format!("listing folder '{path}'"),
                &body,
            ));
        }

        response.json::<ListFolderResponse>().await.map_err(|err| {
            AppError::with_source(
                ErrorKind::ExternalService,
                "Failed to decode Dropbox listing response",
                err,
            )
        })
    }
}

#[async_trait]
impl RemoteSource for DropboxClient {
    async fn list_folder(&self, path: &str, recursive: bool) -> AppResult<Vec<RemoteEntry>> {
        let mut entries = Vec::new();
        let mut page = self.list_page(path, recursive, None).await?;
        loop {
            entries.append(&mut page.entries);
            if !page.has_more {
                break;
            }
            page = self.list_page(path, recursive, Some(&page.cursor)).await?;
        }
        debug!(path, recursive, count = entries.len(), "Listed Dropbox folder");
        Ok(entries)
    }

    async fn download(&self, reference: &str) -> AppResult<(RemoteFile, Bytes)> {
        // The download endpoint takes its argument as a JSON header and
        // returns file metadata the same way, with raw bytes as the body.
        let arg = json!({ "path": reference }).to_string();

        let response = self
            .http
            .post(format!("{CONTENT_BASE}/files/download"))
            .bearer_auth(&self.access_token)
            .header("Dropbox-API-Arg", arg)
            .send()
            .await
            .map_err(|err| {
                AppError::with_source(ErrorKind::ExternalService, "Dropbox download request failed", err)
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Self::status_error(
                status,
                &format!("downloading '{reference}'"),
                &body,
            ));
        }

        let metadata = response
            .headers()
            .get("Dropbox-API-Result")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| serde_json::from_str::<RemoteFile>(v).ok());

        let metadata = match metadata {
            Some(meta) => meta,
            None => {
                warn!(reference, "Dropbox download response missing metadata header");
                return Err(AppError::external(format!(
                    "Dropbox download of '{reference}' returned no file metadata"
                )));
            }
        };

        let bytes = response.bytes().await.map_err(|err| {
            AppError::with_source(
                ErrorKind::ExternalService,
                format!("Failed to read Dropbox download body for '{reference}'"),
                err,
            )
        })?;

        debug!(reference, size = bytes.len(), "Downloaded Dropbox file");
        Ok((metadata, bytes))
    }
}
