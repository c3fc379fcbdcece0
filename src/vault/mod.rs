//! Vault module — accounts and per-owner secrets.
//!
//! This module provides:
//! - `VaultService`, the owner-scoped operations over two stores (`service`)
//! - `Session`, the explicit owner token (`session`)
//! - Random secret generation (`generator`)

pub mod generator;
pub mod service;
pub mod session;

// Re-export the most commonly used items.
pub use generator::{generate_random_secret, DEFAULT_CHARSET, DEFAULT_LENGTH};
pub use service::{StoredSecret, VaultService};
pub use session::Session;
