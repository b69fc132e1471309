//! Vault HTTP client with retry and logging integration.

use crate::{
    config::VaultConfig,
    error::{VaultError, VaultResult},
    provider::SecretStore,
    secrets::{ErrorResponse, Secret},
};
use async_trait::async_trait;
use reqwest::{Client, Method, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, instrument};
use vaultenv_common::{build_http_client, HttpConfig, RetryConfig, RetryPolicy};

/// Header carrying the session token.
pub const VAULT_TOKEN_HEADER: &str = "X-Vault-Token";

const REVOKE_SELF_PATH: &str = "auth/token/revoke-self";

/// How a single request should be issued and interpreted.
#[derive(Debug, Clone, Copy)]
struct RequestKind {
    /// Send `?list=true`
    list: bool,
    /// Treat a 404 as "no data" instead of an error
    missing_is_empty: bool,
}

const LIST: RequestKind = RequestKind { list: true, missing_is_empty: true };
const READ: RequestKind = RequestKind { list: false, missing_is_empty: true };
const WRITE: RequestKind = RequestKind { list: false, missing_is_empty: false };

/// Vault client speaking the logical HTTP API.
pub struct VaultClient {
    config: VaultConfig,
    http: Client,
    token: Arc<RwLock<Option<SecretString>>>,
    retry: RetryPolicy,
}

impl std::fmt::Debug for VaultClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaultClient")
            .field("addr", &self.config.addr)
            .field("timeout", &self.config.timeout)
            .field("max_retries", &self.config.max_retries)
            .finish_non_exhaustive()
    }
}

impl VaultClient {
    /// Create a new Vault client.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::InvalidConfig`] for an unusable address and
    /// [`VaultError::Http`] if the HTTP client cannot be built.
    pub fn new(config: VaultConfig) -> VaultResult<Self> {
        config.base_url()?;

        let http = build_http_client(&HttpConfig::default().with_timeout(config.timeout))?;

        let retry = RetryPolicy::new(
            RetryConfig::default()
                .with_max_retries(config.max_retries)
                .with_initial_delay(config.retry_delay),
        );

        Ok(Self {
            config,
            http,
            token: Arc::new(RwLock::new(None)),
            retry,
        })
    }

    /// The configuration this client was built with.
    #[must_use]
    pub const fn config(&self) -> &VaultConfig {
        &self.config
    }

    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        kind: RequestKind,
    ) -> VaultResult<Option<Secret>> {
        self.retry
            .execute(|| self.send_once(method.clone(), path, body, kind))
            .await
    }

    async fn send_once(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        kind: RequestKind,
    ) -> VaultResult<Option<Secret>> {
        let url = self.config.url_for(path)?;
        let token = self
            .token
            .read()
            .await
            .as_ref()
            .map(|token| token.expose_secret().to_string());

        let mut request = self.http.request(method, url);
        if let Some(token) = token {
            request = request.header(VAULT_TOKEN_HEADER, token);
        }
        if kind.list {
            request = request.query(&[("list", "true")]);
        }
        if let Some(b) = body {
            request = request.json(b);
        }

        let response = request.send().await?;

        let status = response.status();
        if status == StatusCode::NO_CONTENT {
            return Ok(None);
        }
        if status == StatusCode::NOT_FOUND && kind.missing_is_empty {
            debug!(path, "No data at path");
            return Ok(None);
        }
        if status.is_success() {
            let bytes = response.bytes().await?;
            if bytes.iter().all(u8::is_ascii_whitespace) {
                return Ok(None);
            }
            return Ok(Some(serde_json::from_slice(&bytes)?));
        }

        let errors = error_messages(response).await;
        Err(match status.as_u16() {
            403 => VaultError::PermissionDenied(format!("{path}: {}", errors.join("; "))),
            429 => VaultError::RateLimited,
            s if s >= 500 => {
                VaultError::unavailable(format!("Status {status} for {path}: {}", errors.join("; ")))
            }
            s => VaultError::api(s, path, errors),
        })
    }
}

async fn error_messages(response: Response) -> Vec<String> {
    let text = response.text().await.unwrap_or_default();
    match serde_json::from_str::<ErrorResponse>(&text) {
        Ok(body) if !body.errors.is_empty() => body.errors,
        _ if text.trim().is_empty() => Vec::new(),
        _ => vec![text.trim().to_string()],
    }
}

#[async_trait]
impl SecretStore for VaultClient {
    #[instrument(skip(self))]
    async fn list(&self, path: &str) -> VaultResult<Option<Secret>> {
        self.request(Method::GET, path, None, LIST).await
    }

    #[instrument(skip(self))]
    async fn read(&self, path: &str) -> VaultResult<Option<Secret>> {
        self.request(Method::GET, path, None, READ).await
    }

    #[instrument(skip(self, payload))]
    async fn write(&self, path: &str, payload: Value) -> VaultResult<Option<Secret>> {
        self.request(Method::PUT, path, Some(&payload), WRITE).await
    }

    async fn set_token(&self, token: SecretString) {
        *self.token.write().await = Some(token);
    }

    #[instrument(skip(self))]
    async fn revoke_self(&self) -> VaultResult<()> {
        self.request(Method::PUT, REVOKE_SELF_PATH, None, WRITE).await?;
        *self.token.write().await = None;
        Ok(())
    }
}
