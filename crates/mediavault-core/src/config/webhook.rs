//! Inbound/outbound webhook configuration.

use serde::{Deserialize, Serialize};

/// Webhook settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct WebhookConfig {
    /// Shared secret for inbound signature verification. Empty means
    /// "webhooks open": every request is admitted. Intended for local
    /// development only; production deployments should always set it.
    #[serde(default)]
    pub signing_secret: String,
    /// URL to POST outbound notification events to (e.g. a Zapier
    /// catch hook). Empty disables outbound notifications.
    #[serde(default)]
    pub outbound_url: String,
}

impl WebhookConfig {
    /// Whether inbound signature verification is enforced.
    pub fn verification_enabled(&self) -> bool {
        !self.signing_secret.is_empty()
    }
}
