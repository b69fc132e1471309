//! Vault client configuration.

use std::time::Duration;

use reqwest::Url;

use crate::error::{VaultError, VaultResult};

/// Address used when neither a flag nor `VAULT_ADDR` provides one.
pub const DEFAULT_VAULT_ADDR: &str = "https://127.0.0.1:8200";

/// Vault client configuration.
#[derive(Debug, Clone)]
pub struct VaultConfig {
    /// Vault server address, including scheme
    pub addr: String,
    /// Request timeout
    pub timeout: Duration,
    /// Maximum retry attempts for transient failures
    pub max_retries: u32,
    /// Base retry delay
    pub retry_delay: Duration,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            addr: std::env::var("VAULT_ADDR")
                .ok()
                .filter(|addr| !addr.is_empty())
                .unwrap_or_else(|| DEFAULT_VAULT_ADDR.to_string()),
            timeout: Duration::from_secs(5),
            max_retries: 5,
            retry_delay: Duration::from_millis(100),
        }
    }
}

impl VaultConfig {
    /// Create a new configuration for the given address.
    #[must_use]
    pub fn new(addr: impl Into<String>) -> Self {
        Self {
            addr: addr.into(),
            ..Default::default()
        }
    }

    /// Set request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the number of retries for transient failures.
    #[must_use]
    pub const fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set the base delay between retries.
    #[must_use]
    pub const fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    /// Build the full API URL for a logical path.
    ///
    /// Each `/`-separated segment is percent-encoded on its own, so key
    /// names holding `#`, `?` or `%` stay part of the path.
    ///
    /// # Errors
    ///
    /// [`VaultError::InvalidConfig`] when `addr` is not an absolute
    /// http(s) URL.
    pub fn url_for(&self, path: &str) -> VaultResult<Url> {
        let mut url = self.base_url()?;
        url.path_segments_mut()
            .map_err(|()| self.invalid_addr("it cannot carry a path"))?
            .pop_if_empty()
            .push("v1")
            .extend(path.split('/').filter(|segment| !segment.is_empty()));
        Ok(url)
    }

    /// Parse and check `addr`.
    ///
    /// # Errors
    ///
    /// [`VaultError::InvalidConfig`] for anything but an http(s) URL.
    pub fn base_url(&self) -> VaultResult<Url> {
        let url = Url::parse(&self.addr).map_err(|e| self.invalid_addr(&e.to_string()))?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(self.invalid_addr(&format!("unsupported scheme '{other}'"))),
        }
    }

    fn invalid_addr(&self, reason: &str) -> VaultError {
        VaultError::InvalidConfig(format!(
            "Vault address must be a full http(s) URL, got '{}': {reason}",
            self.addr
        ))
    }
}
