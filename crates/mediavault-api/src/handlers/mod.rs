//! HTTP handlers, one module per resource.

pub mod assets;
pub mod health;
pub mod import;
pub mod publish;
pub mod upload;
pub mod webhook;
