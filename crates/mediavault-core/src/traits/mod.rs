//! Seam traits implemented by the infrastructure crates.

pub mod blob;

pub use blob::BlobStore;
