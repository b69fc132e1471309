//! Vault error types using thiserror 2.0.
//!
//! Provides Vault-specific errors with retryability classification so the
//! client's retry policy can tell transient failures from permanent ones.

use thiserror::Error;
use vaultenv_common::Retryable;

/// Vault-specific errors.
#[derive(Error, Debug)]
pub enum VaultError {
    /// Vault server unavailable (5xx or unreachable)
    #[error("Vault unavailable: {0}")]
    Unavailable(String),

    /// Permission denied on a path
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Rate limited
    #[error("Rate limited")]
    RateLimited,

    /// Any other non-success answer
    #[error("Vault returned {status} for {path}: {}", .errors.join("; "))]
    Api {
        /// HTTP status code
        status: u16,
        /// Request path
        path: String,
        /// Messages from the `errors` array of the response body
        errors: Vec<String>,
    },

    /// Response carried no session token
    #[error("No token found in response")]
    MissingToken,

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for Vault operations.
pub type VaultResult<T> = Result<T, VaultError>;

impl VaultError {
    /// Check if error is retryable.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Unavailable(_) | Self::RateLimited => true,
            Self::Http(e) => e.is_connect() || e.is_timeout() || e.is_request(),
            _ => false,
        }
    }

    /// Create an unavailable error.
    #[must_use]
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    /// Create an API error.
    #[must_use]
    pub fn api(status: u16, path: impl Into<String>, errors: Vec<String>) -> Self {
        Self::Api {
            status,
            path: path.into(),
            errors,
        }
    }
}

impl Retryable for VaultError {
    fn is_retryable(&self) -> bool {
        Self::is_retryable(self)
    }
}
