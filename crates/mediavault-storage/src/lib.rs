//! Blob store gateway for MediaVault.
//!
//! Implements the [`BlobStore`](mediavault_core::traits::BlobStore) seam
//! trait for an S3-compatible object store and for an in-memory
//! dev/test provider, plus deterministic storage-path generation.

pub mod path;
pub mod providers;

pub use providers::build_provider;
pub use providers::memory::MemoryBlobStore;
pub use providers::s3::S3BlobStore;
