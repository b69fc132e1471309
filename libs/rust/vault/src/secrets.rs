//! Vault wire types.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{VaultError, VaultResult};

/// Generic response envelope returned by logical and auth endpoints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Secret {
    /// Server-assigned request identifier
    #[serde(default)]
    pub request_id: String,
    /// Lease identifier, empty for static secrets
    #[serde(default)]
    pub lease_id: String,
    /// Lease duration in seconds
    #[serde(default)]
    pub lease_duration: u64,
    /// Whether the lease can be renewed
    #[serde(default)]
    pub renewable: bool,
    /// Payload; for listings this holds the `keys` collection
    #[serde(default)]
    pub data: Option<Map<String, Value>>,
    /// Authentication block returned by login endpoints
    #[serde(default)]
    pub auth: Option<SecretAuth>,
    /// Non-fatal warnings from the server
    #[serde(default)]
    pub warnings: Option<Vec<String>>,
}

/// Authentication block of a login response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SecretAuth {
    /// The session token
    pub client_token: String,
    /// Token accessor
    #[serde(default)]
    pub accessor: String,
    /// Policies attached to the token
    #[serde(default)]
    pub policies: Vec<String>,
    /// Token TTL in seconds
    #[serde(default)]
    pub lease_duration: u64,
    /// Whether the token can be renewed
    #[serde(default)]
    pub renewable: bool,
}

/// Error body returned by Vault on non-success answers.
#[derive(Debug, Default, Deserialize)]
pub struct ErrorResponse {
    /// Human readable error messages
    #[serde(default)]
    pub errors: Vec<String>,
}

impl Secret {
    /// Returns `true` when the response carries no payload.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.as_ref().is_none_or(Map::is_empty)
    }

    /// Look up a single payload field.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.data.as_ref().and_then(|data| data.get(name))
    }

    /// Extract the session token from a login or token lookup response.
    ///
    /// Login responses carry it in `auth.client_token`; token lookups carry
    /// it as `data.id`.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::MissingToken`] when neither location holds a
    /// non-empty string.
    pub fn token_id(&self) -> VaultResult<String> {
        if let Some(auth) = &self.auth {
            if !auth.client_token.is_empty() {
                return Ok(auth.client_token.clone());
            }
        }

        match self.field("id") {
            Some(Value::String(id)) if !id.is_empty() => Ok(id.clone()),
            _ => Err(VaultError::MissingToken),
        }
    }
}
