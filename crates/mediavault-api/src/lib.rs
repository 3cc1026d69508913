//! HTTP API layer for MediaVault.
//!
//! Axum handlers, routing, DTOs, and the application composition root.

pub mod app;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod router;
pub mod state;

pub use app::run_server;
pub use state::AppState;
