//! HashiCorp Vault client for vaultenv.
//!
//! Exposes the logical `list`/`read`/`write` operations over a hierarchical
//! key namespace, the login-token exchange convention and self-revocation,
//! behind the [`SecretStore`] trait so callers can swap in a fake store.

pub mod client;
pub mod config;
pub mod error;
pub mod provider;
pub mod secrets;

pub use client::VaultClient;
pub use config::VaultConfig;
pub use error::{VaultError, VaultResult};
pub use provider::SecretStore;
pub use secrets::{Secret, SecretAuth};
