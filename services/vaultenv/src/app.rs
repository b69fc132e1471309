//! Run orchestration: credential, login, walk, revoke.

use std::io::{self, Write};

use tracing::info;
use vaultenv_vault::{SecretStore, VaultClient};

use crate::auth::authenticate;
use crate::config::Config;
use crate::credential::{load_credential, Sleeper, TokioSleeper};
use crate::error::VaultEnvError;
use crate::walker::{SecretWalker, WalkStats};

/// Run against the configured Vault server, printing to stdout.
///
/// # Errors
///
/// Any [`VaultEnvError`]; lines already printed stay printed.
pub async fn run(config: &Config) -> Result<WalkStats, VaultEnvError> {
    let client = VaultClient::new(config.vault.clone()).map_err(VaultEnvError::Client)?;
    run_with(&client, config, &TokioSleeper, io::stdout()).await
}

/// Run against any store and sink.
///
/// Once the login succeeds the session token is revoked before returning,
/// whether or not the walk succeeded.
///
/// # Errors
///
/// Credential, login and traversal failures.
pub async fn run_with<S, W>(
    store: &S,
    config: &Config,
    sleeper: &dyn Sleeper,
    out: W,
) -> Result<WalkStats, VaultEnvError>
where
    S: SecretStore + ?Sized,
    W: Write,
{
    let credential = load_credential(&config.auth.source, &config.auth.poll, sleeper).await?;

    let session = authenticate(
        store,
        config.auth.method,
        &config.auth.role,
        &config.auth.k8s_login_path,
        &credential,
    )
    .await?;
    drop(credential);

    let mut walker = SecretWalker::new(store, out);
    let result = walker.walk(&config.prefix, "").await;
    session.revoke().await;
    result?;

    let stats = walker.stats();
    info!(
        prefix = %config.prefix,
        directories = stats.directories,
        exported = stats.emitted.exported,
        skipped = stats.emitted.skipped,
        "Exported secrets"
    );
    Ok(stats)
}
