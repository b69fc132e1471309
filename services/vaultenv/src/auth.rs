//! Authenticator: exchanges the credential for a session token.

use std::fmt;
use std::str::FromStr;

use secrecy::{ExposeSecret, SecretString};
use serde_json::{json, Value};
use tracing::{info, instrument, warn};
use vaultenv_vault::SecretStore;

use crate::error::VaultEnvError;

/// Default mount for Kubernetes logins.
pub const DEFAULT_K8S_LOGIN_PATH: &str = "auth/kubernetes/login";

/// Fixed GitHub login path.
pub const GITHUB_LOGIN_PATH: &str = "auth/github/login";

/// Supported login backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMethod {
    /// Service-account JWT against the Kubernetes auth backend
    Kubernetes,
    /// Personal access token against the GitHub auth backend
    Github,
}

impl FromStr for AuthMethod {
    type Err = VaultEnvError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "kubernetes" => Ok(Self::Kubernetes),
            "github" => Ok(Self::Github),
            other => Err(VaultEnvError::config(format!(
                "auth method {other} not implemented"
            ))),
        }
    }
}

impl AuthMethod {
    /// Name as accepted on the command line.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Kubernetes => "kubernetes",
            Self::Github => "github",
        }
    }
}

impl fmt::Display for AuthMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Login call to issue: where, and with which body.
pub struct LoginRequest {
    /// Store path of the login endpoint
    pub path: String,
    /// Request body; holds the credential
    pub payload: Value,
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("path", &self.path)
            .field("payload", &"[REDACTED]")
            .finish()
    }
}

/// Build the login call for `method`.
///
/// The role is always sent; the GitHub backend ignores it.
#[must_use]
pub fn login_request(
    method: AuthMethod,
    role: &str,
    credential: &SecretString,
    k8s_login_path: &str,
) -> LoginRequest {
    match method {
        AuthMethod::Kubernetes => LoginRequest {
            path: k8s_login_path.to_string(),
            payload: json!({ "role": role, "jwt": credential.expose_secret() }),
        },
        AuthMethod::Github => LoginRequest {
            path: GITHUB_LOGIN_PATH.to_string(),
            payload: json!({ "role": role, "token": credential.expose_secret() }),
        },
    }
}

/// Log in and install the session token on `store`.
///
/// # Errors
///
/// [`VaultEnvError::Login`] when the login call fails or answers without
/// data, [`VaultEnvError::TokenLookup`] when the answer holds no token.
#[instrument(skip(store, credential))]
pub async fn authenticate<'a, S: SecretStore + ?Sized>(
    store: &'a S,
    method: AuthMethod,
    role: &str,
    k8s_login_path: &str,
    credential: &SecretString,
) -> Result<Session<'a, S>, VaultEnvError> {
    let request = login_request(method, role, credential, k8s_login_path);

    let secret = store
        .write(&request.path, request.payload)
        .await
        .map_err(|source| VaultEnvError::Login {
            path: request.path.clone(),
            source,
        })?
        .ok_or_else(|| VaultEnvError::TokenLookup {
            path: request.path.clone(),
            source: vaultenv_vault::VaultError::MissingToken,
        })?;

    let token = secret.token_id().map_err(|source| VaultEnvError::TokenLookup {
        path: request.path.clone(),
        source,
    })?;

    store.set_token(SecretString::from(token)).await;
    info!(path = %request.path, "Authenticated with Vault");

    Ok(Session {
        store,
        revoked: false,
    })
}

/// A logged-in session whose token is revoked at the end of the run.
///
/// Call [`Session::revoke`] on every path out of the run; dropping a
/// session that was never revoked logs a warning.
pub struct Session<'a, S: SecretStore + ?Sized> {
    store: &'a S,
    revoked: bool,
}

impl<S: SecretStore + ?Sized> fmt::Debug for Session<'_, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session").field("revoked", &self.revoked).finish_non_exhaustive()
    }
}

impl<S: SecretStore + ?Sized> Session<'_, S> {
    /// Revoke the session token, best effort.
    ///
    /// A failure is logged and otherwise ignored.
    pub async fn revoke(mut self) {
        self.revoked = true;
        match self.store.revoke_self().await {
            Ok(()) => info!("Revoked session token"),
            Err(error) => warn!(%error, "Unable to revoke session token"),
        }
    }
}

impl<S: SecretStore + ?Sized> Drop for Session<'_, S> {
    fn drop(&mut self) {
        if !self.revoked {
            warn!("Session ended without revoking its token");
        }
    }
}
