//! vaultenv library.
//!
//! Authenticates against Vault with a Kubernetes service-account JWT or a
//! GitHub token, walks every secret below a prefix and prints each leaf as
//! a shell `export NAME='value'` statement.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod app;
pub mod auth;
pub mod cli;
pub mod config;
pub mod credential;
pub mod emitter;
pub mod error;
pub mod paths;
pub mod walker;

// Re-exports for convenience
pub use app::{run, run_with};
pub use cli::Cli;
pub use config::Config;
pub use error::{VaultEnvError, WalkError};
pub use walker::{SecretWalker, WalkStats};
