//! Database layer for MediaVault.
//!
//! Connection pool management, sqlx migrations, and one repository per
//! persisted entity.

pub mod connection;
pub mod migration;
pub mod repositories;
