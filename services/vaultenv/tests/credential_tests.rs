//! Credential polling against a real filesystem.

use async_trait::async_trait;
use secrecy::ExposeSecret;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use vaultenv::credential::{load_credential, CredentialSource, PollConfig, Sleeper, TokioSleeper};
use vaultenv::VaultEnvError;

/// Sleeper that writes the credential file once enough time has passed.
struct CreatingSleeper {
    path: PathBuf,
    contents: &'static str,
    appear_after: Duration,
    slept: AtomicU32,
}

#[async_trait]
impl Sleeper for CreatingSleeper {
    async fn sleep(&self, duration: Duration) {
        let naps = self.slept.fetch_add(1, Ordering::SeqCst) + 1;
        if duration * naps >= self.appear_after {
            std::fs::write(&self.path, self.contents).unwrap();
        }
    }
}

#[tokio::test]
async fn file_created_later_is_picked_up() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("token");
    let sleeper = CreatingSleeper {
        path: path.clone(),
        contents: "abc123",
        appear_after: Duration::from_millis(300),
        slept: AtomicU32::new(0),
    };
    let poll = PollConfig {
        interval: Duration::from_millis(100),
        timeout: Duration::from_secs(10),
    };

    let credential = load_credential(&CredentialSource::File(path), &poll, &sleeper)
        .await
        .unwrap();

    assert_eq!(credential.expose_secret(), "abc123");
    // Three failed attempts, then the fourth finds the file.
    assert_eq!(sleeper.slept.load(Ordering::SeqCst), 3);
}

#[tokio::test(start_paused = true)]
async fn tokio_sleeper_waits_on_the_virtual_clock() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("token");

    let writer_path = path.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(250)).await;
        std::fs::write(writer_path, "eyJ.paused\n").unwrap();
    });

    let started = tokio::time::Instant::now();
    let credential = load_credential(
        &CredentialSource::File(path),
        &PollConfig {
            interval: Duration::from_millis(100),
            timeout: Duration::from_secs(10),
        },
        &TokioSleeper,
    )
    .await
    .unwrap();

    assert_eq!(credential.expose_secret(), "eyJ.paused\n");
    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_millis(300) && elapsed < Duration::from_millis(400));
}

#[tokio::test(start_paused = true)]
async fn tokio_sleeper_gives_up_after_timeout() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("never");

    let err = load_credential(
        &CredentialSource::File(path.clone()),
        &PollConfig {
            interval: Duration::from_millis(100),
            timeout: Duration::from_secs(2),
        },
        &TokioSleeper,
    )
    .await
    .unwrap_err();

    match err {
        VaultEnvError::CredentialTimeout { path: reported, waited } => {
            assert_eq!(reported, path);
            assert_eq!(waited, Duration::from_secs(2));
        }
        other => panic!("expected timeout, got {other:?}"),
    }
}

#[tokio::test]
async fn empty_file_keeps_polling_until_written() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("token");
    std::fs::write(&path, "").unwrap();

    let sleeper = CreatingSleeper {
        path: path.clone(),
        contents: "ghp_filled",
        appear_after: Duration::from_millis(200),
        slept: AtomicU32::new(0),
    };
    let poll = PollConfig {
        interval: Duration::from_millis(100),
        timeout: Duration::from_secs(1),
    };

    let credential = load_credential(&CredentialSource::File(path), &poll, &sleeper)
        .await
        .unwrap();
    assert_eq!(credential.expose_secret(), "ghp_filled");
    assert_eq!(sleeper.slept.load(Ordering::SeqCst), 2);
}
