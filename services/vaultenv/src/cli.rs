//! Command-line flags.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use vaultenv_common::{parse_duration, TracingConfig};
use vaultenv_vault::config::DEFAULT_VAULT_ADDR;

use crate::auth::DEFAULT_K8S_LOGIN_PATH;

/// Log in to Vault and print every secret under a prefix as `export` lines.
#[derive(Parser, Debug, Clone)]
#[command(name = "vaultenv", version, long_about = None)]
#[command(after_help = "\
Examples:
  eval \"$(vaultenv --auth-method kubernetes --vault-prefix secret/app)\"
  vaultenv --auth-method github --auth-token \"$GITHUB_TOKEN\" --vault-prefix secret/ci
")]
pub struct Cli {
    /// Auth method to use for authentication (kubernetes or github)
    #[arg(long = "auth-method")]
    pub auth_method: Option<String>,

    /// Auth token to use with Vault, instead of reading --token-path
    #[arg(long = "auth-token")]
    pub auth_token: Option<String>,

    /// Role to authenticate against Vault with
    #[arg(long = "k8s-role", default_value = "demo")]
    pub k8s_role: String,

    /// Number of retries for transient Vault failures
    #[arg(long, default_value_t = 5)]
    pub retries: u32,

    /// Path on the filesystem to find the JWT or token
    #[arg(long = "token-path")]
    pub token_path: Option<PathBuf>,

    /// Path used to authenticate Kubernetes tokens (e.g. auth/kube-uw2-110/login)
    #[arg(long = "vault-k8s-path", default_value = DEFAULT_K8S_LOGIN_PATH)]
    pub vault_k8s_path: String,

    /// Timeout for Vault requests (e.g. 500ms, 5s; bare numbers are milliseconds)
    #[arg(long = "vault-timeout", default_value = "5s", value_parser = parse_duration)]
    pub vault_timeout: Duration,

    /// Address to access Vault; should be a full URL
    #[arg(long = "vault-addr", env = "VAULT_ADDR", default_value = DEFAULT_VAULT_ADDR)]
    pub vault_addr: String,

    /// Path in Vault to begin looking for secrets
    #[arg(long = "vault-prefix", env = "VAULT_PREFIX")]
    pub vault_prefix: Option<String>,

    /// How long to wait for --token-path to appear
    #[arg(long = "token-wait-timeout", default_value = "10m", value_parser = parse_duration)]
    pub token_wait_timeout: Duration,

    /// Log level when RUST_LOG is unset
    #[arg(long = "log-level", default_value = "info")]
    pub log_level: String,

    /// Emit logs as JSON
    #[arg(long = "log-json")]
    pub log_json: bool,
}

impl Cli {
    /// Logging settings from `--log-level` and `--log-json`.
    #[must_use]
    pub fn tracing_config(&self) -> TracingConfig {
        let config = TracingConfig::default().with_log_level(self.log_level.clone());
        if self.log_json {
            config.with_json_output()
        } else {
            config
        }
    }
}
