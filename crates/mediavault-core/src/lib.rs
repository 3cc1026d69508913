//! Core foundation crate for MediaVault.
//!
//! Holds the unified error type, configuration schemas, and the seam
//! traits implemented by the storage layer. Every other crate in the
//! workspace depends on this one.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;
