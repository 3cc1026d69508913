//! Business services for MediaVault.
//!
//! The ingestion pipeline lives here: checksum deduplication
//! ([`dedup`]), single-asset ingestion ([`ingest`]), batch import
//! orchestration ([`import`]), the inbound webhook gate ([`webhook`]),
//! gallery publishing ([`publish`]), and outbound notifications
//! ([`notify`]).

pub mod catalog;
pub mod dedup;
pub mod event_log;
pub mod import;
pub mod ingest;
pub mod notify;
pub mod publish;
pub mod webhook;

pub use catalog::AssetCatalog;
pub use event_log::EventLog;
pub use import::{BatchOutcome, ImportRequest, ImportService, ImportSummary, ItemStatus};
pub use ingest::{IngestOutcome, IngestRequest, IngestService};
pub use notify::Notifier;
pub use publish::PublishService;
pub use webhook::{InboundDelivery, WebhookService};
