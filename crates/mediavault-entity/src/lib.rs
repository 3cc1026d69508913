//! Persisted domain models for MediaVault.

pub mod asset;
pub mod gallery;
pub mod webhook;

pub use asset::{Asset, AssetScope, CreateAsset};
pub use gallery::{Gallery, PublicationLogEntry};
pub use webhook::WebhookEvent;
