//! Generic secret-store trait.
//!
//! The walker and authenticator only ever talk to this trait, so tests can
//! substitute an in-memory store for a real Vault server.

use async_trait::async_trait;
use secrecy::SecretString;
use serde_json::Value;

use crate::error::VaultResult;
use crate::secrets::Secret;

/// Hierarchical key/value store reached through logical paths.
///
/// `list`, `read` and `write` return `Ok(None)` when the store answers
/// without data (for example a 404 on a path that is not a directory).
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// List the child names directly under `path`.
    async fn list(&self, path: &str) -> VaultResult<Option<Secret>>;

    /// Read the payload stored at `path`.
    async fn read(&self, path: &str) -> VaultResult<Option<Secret>>;

    /// Write `payload` to `path`; login endpoints answer with a session token.
    async fn write(&self, path: &str, payload: Value) -> VaultResult<Option<Secret>>;

    /// Use `token` for every subsequent request.
    async fn set_token(&self, token: SecretString);

    /// Revoke the token currently in use.
    async fn revoke_self(&self) -> VaultResult<()>;
}
