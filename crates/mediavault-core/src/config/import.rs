//! Batch import configuration.

use serde::{Deserialize, Serialize};

/// Batch import settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportConfig {
    /// Maximum number of per-asset pipelines run concurrently within
    /// one batch.
    #[serde(default = "default_concurrency")]
    pub max_concurrency: usize,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            max_concurrency: default_concurrency(),
        }
    }
}

fn default_concurrency() -> usize {
    4
}
