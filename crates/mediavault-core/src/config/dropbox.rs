//! Dropbox remote-provider configuration.

use serde::{Deserialize, Serialize};

/// Dropbox API settings.
///
/// An empty access token is a valid configuration: direct uploads still
/// work, but any selection- or folder-based import fails with a
/// configuration error naming the missing credential.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DropboxConfig {
    /// OAuth access token for the Dropbox API. Token acquisition is
    /// handled outside this system.
    #[serde(default)]
    pub access_token: String,
    /// Request timeout in seconds for listing and download calls.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl DropboxConfig {
    /// Whether a credential is configured.
    pub fn has_credential(&self) -> bool {
        !self.access_token.is_empty()
    }
}

fn default_timeout() -> u64 {
    60
}
