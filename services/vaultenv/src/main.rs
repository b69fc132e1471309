//! vaultenv binary: parse flags, configure logging, run once.

use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};
use vaultenv::{Cli, Config};
use vaultenv_common::init_tracing;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli.tracing_config());

    let config = match Config::from_cli(cli) {
        Ok(config) => config,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    info!(
        addr = %config.vault.addr,
        prefix = %config.prefix,
        method = %config.auth.method,
        "Starting vaultenv"
    );

    match vaultenv::run(&config).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", anyhow::Error::from(e));
            ExitCode::FAILURE
        }
    }
}
