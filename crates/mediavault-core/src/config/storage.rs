//! Blob storage configuration.

use serde::{Deserialize, Serialize};

/// Top-level blob storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Provider to use: `"s3"` or `"memory"` (dev/test only).
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Maximum upload size in bytes (default 100 MB).
    #[serde(default = "default_max_upload")]
    pub max_upload_size_bytes: u64,
    /// S3-compatible storage configuration.
    #[serde(default)]
    pub s3: S3StorageConfig,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            max_upload_size_bytes: default_max_upload(),
            s3: S3StorageConfig::default(),
        }
    }
}

/// S3-compatible object storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct S3StorageConfig {
    /// S3 endpoint URL (for non-AWS services like MinIO). Empty for AWS.
    #[serde(default)]
    pub endpoint: String,
    /// AWS region.
    #[serde(default = "default_region")]
    pub region: String,
    /// Bucket holding all stored assets, partitioned by path prefix.
    #[serde(default = "default_bucket")]
    pub bucket: String,
    /// Access key ID. Empty to use the ambient credential chain.
    #[serde(default)]
    pub access_key: String,
    /// Secret access key.
    #[serde(default)]
    pub secret_key: String,
    /// Base URL for public object links. Empty to derive the
    /// virtual-hosted S3 form.
    #[serde(default)]
    pub public_base_url: String,
}

fn default_provider() -> String {
    "s3".to_string()
}

fn default_max_upload() -> u64 {
    104_857_600 // 100 MB
}

fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_bucket() -> String {
    "mediavault-assets".to_string()
}
