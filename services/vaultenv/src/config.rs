//! Immutable run configuration.
//!
//! Built once from the parsed flags and validated before any file or
//! network access, then passed by reference to each component.

use std::path::PathBuf;

use secrecy::SecretString;
use vaultenv_common::TracingConfig;
use vaultenv_vault::VaultConfig;

use crate::auth::AuthMethod;
use crate::cli::Cli;
use crate::credential::{CredentialSource, PollConfig, DEFAULT_POLL_INTERVAL};
use crate::error::VaultEnvError;

/// Service-account token mounted into every Kubernetes pod.
pub const DEFAULT_KUBERNETES_TOKEN_PATH: &str = "/var/run/secrets/kubernetes.io/serviceaccount/token";

/// Login settings.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Login backend
    pub method: AuthMethod,
    /// Role sent with the login
    pub role: String,
    /// Login path for the Kubernetes backend
    pub k8s_login_path: String,
    /// Where the credential comes from
    pub source: CredentialSource,
    /// Credential file polling
    pub poll: PollConfig,
}

/// vaultenv configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Store client settings
    pub vault: VaultConfig,
    /// Login settings
    pub auth: AuthConfig,
    /// Root of the walk
    pub prefix: String,
    /// Logging settings
    pub tracing: TracingConfig,
}

impl Config {
    /// Validate parsed flags.
    ///
    /// # Errors
    ///
    /// [`VaultEnvError::Config`] when the prefix is missing, the auth method
    /// is unsupported, or no credential source can be determined.
    pub fn from_cli(cli: Cli) -> Result<Self, VaultEnvError> {
        let tracing = cli.tracing_config();

        let prefix = cli
            .vault_prefix
            .filter(|prefix| !prefix.trim().is_empty())
            .ok_or_else(|| VaultEnvError::config("a Vault prefix must be specified"))?;

        let method: AuthMethod = cli
            .auth_method
            .as_deref()
            .filter(|method| !method.is_empty())
            .ok_or_else(|| VaultEnvError::config("an auth method must be specified"))?
            .parse()?;

        let source = match (cli.auth_token.filter(|token| !token.is_empty()), cli.token_path) {
            (Some(token), _) => CredentialSource::Explicit(SecretString::from(token)),
            (None, Some(path)) => CredentialSource::File(path),
            (None, None) if method == AuthMethod::Kubernetes => {
                CredentialSource::File(PathBuf::from(DEFAULT_KUBERNETES_TOKEN_PATH))
            }
            (None, None) => {
                return Err(VaultEnvError::config(format!(
                    "auth method {method} needs --auth-token or --token-path"
                )))
            }
        };

        let vault = VaultConfig::new(cli.vault_addr)
            .with_timeout(cli.vault_timeout)
            .with_max_retries(cli.retries);

        Ok(Self {
            vault,
            auth: AuthConfig {
                method,
                role: cli.k8s_role,
                k8s_login_path: cli.vault_k8s_path,
                source,
                poll: PollConfig {
                    interval: DEFAULT_POLL_INTERVAL,
                    timeout: cli.token_wait_timeout,
                },
            },
            prefix,
            tracing,
        })
    }
}
