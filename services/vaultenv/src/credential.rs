//! Credential Loader.
//!
//! Produces the bearer credential handed to the login endpoint: either the
//! explicit `--auth-token`, or the full contents of a file that is polled
//! until it shows up (a projected service-account token may be mounted
//! after the container starts).

use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use secrecy::SecretString;
use tracing::{debug, info, warn};

use crate::error::VaultEnvError;

/// Delay between attempts to open the credential file.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Upper bound on how long to wait for the credential file.
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_secs(600);

/// Where the credential comes from.
#[derive(Debug, Clone)]
pub enum CredentialSource {
    /// Token given on the command line
    Explicit(SecretString),
    /// File whose full contents are the token
    File(PathBuf),
}

/// Polling parameters for [`CredentialSource::File`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    /// Delay between attempts
    pub interval: Duration,
    /// Give up once this much time has been spent sleeping
    pub timeout: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            timeout: DEFAULT_POLL_TIMEOUT,
        }
    }
}

/// Suspends the loader between attempts.
#[async_trait]
pub trait Sleeper: Send + Sync {
    /// Wait for `duration`.
    async fn sleep(&self, duration: Duration);
}

/// [`Sleeper`] backed by the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Obtain the credential.
///
/// An explicit token is returned as is. A file is opened repeatedly until
/// it exists and holds data, then read in full without trimming.
///
/// # Errors
///
/// [`VaultEnvError::CredentialRead`] if the file opens but reading it fails
/// (including non UTF-8 content); [`VaultEnvError::CredentialTimeout`] once
/// `poll.timeout` has elapsed without a usable file.
pub async fn load_credential(
    source: &CredentialSource,
    poll: &PollConfig,
    sleeper: &dyn Sleeper,
) -> Result<SecretString, VaultEnvError> {
    let path = match source {
        CredentialSource::Explicit(token) => return Ok(token.clone()),
        CredentialSource::File(path) => path,
    };

    let mut waited = Duration::ZERO;
    let mut attempts: u64 = 0;
    loop {
        attempts += 1;
        match File::open(path) {
            Ok(file) => {
                if let Some(credential) = read_credential(path, file)? {
                    info!(path = %path.display(), attempts, waited_ms = waited.as_millis(), "Loaded credential");
                    return Ok(credential);
                }
                debug!(path = %path.display(), "Credential file is empty, waiting for content");
            }
            Err(e) if attempts == 1 => {
                warn!(path = %path.display(), error = %e, "Unable to access secrets file, waiting for it");
            }
            Err(e) => {
                debug!(path = %path.display(), error = %e, attempts, "Unable to access secrets file");
            }
        }

        if waited >= poll.timeout {
            return Err(VaultEnvError::CredentialTimeout {
                path: path.clone(),
                waited,
            });
        }
        sleeper.sleep(poll.interval).await;
        waited += poll.interval;
    }
}

fn read_credential(path: &Path, mut file: File) -> Result<Option<SecretString>, VaultEnvError> {
    let read_error = |source: io::Error| VaultEnvError::CredentialRead {
        path: path.to_path_buf(),
        source,
    };

    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).map_err(read_error)?;
    if bytes.is_empty() {
        return Ok(None);
    }

    let text = String::from_utf8(bytes)
        .map_err(|e| read_error(io::Error::new(io::ErrorKind::InvalidData, e)))?;
    Ok(Some(SecretString::from(text)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::sync::Mutex;

    /// Records every sleep without actually waiting.
    #[derive(Default)]
    struct RecordingSleeper {
        slept: Mutex<Vec<Duration>>,
    }

    #[async_trait]
    impl Sleeper for RecordingSleeper {
        async fn sleep(&self, duration: Duration) {
            self.slept.lock().unwrap().push(duration);
        }
    }

    #[tokio::test]
    async fn test_explicit_token_skips_file() {
        let sleeper = RecordingSleeper::default();
        let source = CredentialSource::Explicit(SecretString::from("ghp_token"));
        let credential = load_credential(&source, &PollConfig::default(), &sleeper)
            .await
            .unwrap();

        assert_eq!(credential.expose_secret(), "ghp_token");
        assert!(sleeper.slept.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_file_read_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token");
        std::fs::write(&path, "  eyJhbGci.payload.sig\n").unwrap();

        let credential = load_credential(
            &CredentialSource::File(path),
            &PollConfig::default(),
            &RecordingSleeper::default(),
        )
        .await
        .unwrap();

        assert_eq!(credential.expose_secret(), "  eyJhbGci.payload.sig\n");
    }

    #[tokio::test]
    async fn test_times_out() {
        let dir = tempfile::tempdir().unwrap();
        let sleeper = RecordingSleeper::default();
        let poll = PollConfig {
            interval: Duration::from_millis(100),
            timeout: Duration::from_millis(500),
        };

        let err = load_credential(&CredentialSource::File(dir.path().join("never")), &poll, &sleeper)
            .await
            .unwrap_err();

        assert!(matches!(err, VaultEnvError::CredentialTimeout { waited, .. } if waited == Duration::from_millis(500)));
        assert_eq!(sleeper.slept.lock().unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_directory_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_credential(
            &CredentialSource::File(dir.path().to_path_buf()),
            &PollConfig::default(),
            &RecordingSleeper::default(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, VaultEnvError::CredentialRead { .. }));
    }

    #[tokio::test]
    async fn test_invalid_utf8_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token");
        std::fs::write(&path, [0xff, 0xfe, 0x00]).unwrap();

        let err = load_credential(
            &CredentialSource::File(path),
            &PollConfig::default(),
            &RecordingSleeper::default(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, VaultEnvError::CredentialRead { ref source, .. } if source.kind() == io::ErrorKind::InvalidData));
    }
}
