//! Remote-source integration for MediaVault.
//!
//! Talks to the Dropbox HTTP API ([`client`]), resolves loose asset
//! references against folder listings ([`resolver`]), and expands
//! chooser selections into concrete files ([`selection`]).

pub mod client;
pub mod resolver;
pub mod selection;
pub mod types;

pub use client::{DropboxClient, RemoteSource};
pub use resolver::{AssetReference, ReferenceResolver};
pub use selection::{SelectionEntry, SelectionExpander};
pub use types::{RemoteEntry, RemoteFile};
