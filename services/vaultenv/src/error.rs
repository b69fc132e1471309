//! Error types for vaultenv.
//!
//! Every variant is fatal: it reaches `main`, which prints the full source
//! chain and exits non-zero. A leaf that vanishes between list and read is
//! not an error and never shows up here.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use vaultenv_vault::VaultError;

/// Top-level errors.
#[derive(Error, Debug)]
pub enum VaultEnvError {
    /// Invalid or incomplete configuration
    #[error("{0}")]
    Config(String),

    /// The Vault client could not be constructed
    #[error("unable to connect to vault")]
    Client(#[source] VaultError),

    /// Credential file opened but could not be read
    #[error("unable to read JWT for service account from {}", .path.display())]
    CredentialRead {
        /// Credential file
        path: PathBuf,
        /// Underlying I/O failure
        #[source]
        source: io::Error,
    },

    /// Credential file never appeared
    #[error("credential file {} did not appear within {waited:?}", .path.display())]
    CredentialTimeout {
        /// Credential file
        path: PathBuf,
        /// Time spent polling
        waited: Duration,
    },

    /// The login call failed
    #[error("unable to login to vault on {path}")]
    Login {
        /// Login path
        path: String,
        /// Underlying store failure
        #[source]
        source: VaultError,
    },

    /// The login response did not carry a usable token
    #[error("unable to lookup token from login on {path}")]
    TokenLookup {
        /// Login path
        path: String,
        /// Underlying failure
        #[source]
        source: VaultError,
    },

    /// Traversal failed
    #[error(transparent)]
    Walk(#[from] WalkError),
}

impl VaultEnvError {
    /// Create a configuration error.
    #[must_use]
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

/// Errors raised while walking the secret tree.
#[derive(Error, Debug)]
pub enum WalkError {
    /// Listing a path failed
    #[error("unable to list path {path}")]
    List {
        /// Full store path
        path: String,
        /// Underlying store failure
        #[source]
        source: VaultError,
    },

    /// Reading a leaf failed
    #[error("unable to read secret at {path}")]
    Read {
        /// Full store path
        path: String,
        /// Underlying store failure
        #[source]
        source: VaultError,
    },

    /// A child subtree failed
    #[error("unable to get secret {path}")]
    Child {
        /// Full store path of the child
        path: String,
        /// Failure inside the subtree
        #[source]
        source: Box<WalkError>,
    },

    /// The `keys` entry of a listing is not an array
    #[error("listing at {path} has unexpected keys type: {found}")]
    UnexpectedListing {
        /// Full store path
        path: String,
        /// JSON type found instead
        found: &'static str,
    },

    /// Writing to the output failed
    #[error("unable to write export statements")]
    Output(#[from] io::Error),
}

impl WalkError {
    /// The innermost store path the failure refers to.
    #[must_use]
    pub fn failing_path(&self) -> Option<&str> {
        match self {
            Self::Child { source, .. } => source.failing_path(),
            Self::List { path, .. } | Self::Read { path, .. } | Self::UnexpectedListing { path, .. } => {
                Some(path)
            }
            Self::Output(_) => None,
        }
    }
}
