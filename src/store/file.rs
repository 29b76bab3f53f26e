use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use super::SnapshotStore;
use crate::error::StoreError;
use crate::model::Snapshot;

/// Snapshot kept as one pretty-printed JSON document on disk.
///
/// Saves and resets take the same lock, and a reset re-reads the file under
/// it first, so a reader that saw a broken document never clobbers a save
/// that landed after its read.
pub struct JsonFileStore {
    path: PathBuf,
    fallback: Snapshot,
    write_lock: Mutex<()>,
}

enum ReadOutcome {
    Parsed(Snapshot),
    Missing,
    Unreadable(io::Error),
    Corrupt(serde_json::Error),
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            fallback: Snapshot::seed(),
            write_lock: Mutex::new(()),
        }
    }

    /// Use `fallback` instead of the seed data when the file is missing or corrupt.
    pub fn with_fallback(mut self, fallback: Snapshot) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parse the file without any recovery.
    pub async fn read_strict(&self) -> Result<Snapshot, StoreError> {
        let bytes = fs::read(&self.path).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn read(&self) -> ReadOutcome {
        match fs::read(&self.path).await {
            Ok(bytes) => match serde_json::from_slice(&bytes) {
                Ok(snapshot) => ReadOutcome::Parsed(snapshot),
                Err(e) => ReadOutcome::Corrupt(e),
            },
            Err(e) if e.kind() == io::ErrorKind::NotFound => ReadOutcome::Missing,
            Err(e) => ReadOutcome::Unreadable(e),
        }
    }

    /// Caller must hold `write_lock`.
    async fn persist_fallback(&self) -> Snapshot {
        if let Err(e) = self.write_atomic(&self.fallback).await {
            error!("Failed to write defaults to {}: {}", self.path.display(), e);
        }
        self.fallback.clone()
    }

    /// Moves an unreadable data file next to itself so the reset does not
    /// destroy it. Never replaces an earlier backup. Caller must hold `write_lock`.
    async fn quarantine(&self) -> io::Result<PathBuf> {
        let stamp = unix_nanos();
        let mut attempt = 0u32;
        let backup = loop {
            let mut name = self.path.as_os_str().to_owned();
            if attempt == 0 {
                name.push(format!(".corrupt-{}", stamp));
            } else {
                name.push(format!(".corrupt-{}-{}", stamp, attempt));
            }
            let candidate = PathBuf::from(name);
            if !fs::try_exists(&candidate).await? {
                break candidate;
            }
            attempt += 1;
        };
        fs::rename(&self.path, &backup).await?;
        Ok(backup)
    }

    fn temp_path(&self) -> PathBuf {
        let file_name = self
            .path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("data.json");
        let tmp_name = format!(".{}.tmp.{}", file_name, unix_nanos());
        match self.path.parent() {
            Some(dir) => dir.join(tmp_name),
            None => PathBuf::from(tmp_name),
        }
    }

    async fn write_atomic(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        let mut payload = serde_json::to_vec_pretty(snapshot)?;
        payload.push(b'\n');

        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).await?;
        }

        // Write a sibling temp file and rename it over the target so a reader
        // sees either the old document or the new one.
        let tmp_path = self.temp_path();
        let written = async {
            let mut file = fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&tmp_path)
                .await?;
            file.write_all(&payload).await?;
            file.sync_all().await?;
            fs::rename(&tmp_path, &self.path).await
        }
        .await;

        if let Err(e) = written {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(e.into());
        }
        Ok(())
    }
}

#[async_trait]
impl SnapshotStore for JsonFileStore {
    async fn load(&self) -> Snapshot {
        if let ReadOutcome::Parsed(snapshot) = self.read().await {
            return snapshot;
        }

        // A save may have landed since the first read; only what is on disk
        // under the lock decides whether to reset.
        let _guard = self.write_lock.lock().await;
        match self.read().await {
            ReadOutcome::Parsed(snapshot) => snapshot,
            ReadOutcome::Missing => {
                info!("{} does not exist, writing defaults", self.path.display());
                self.persist_fallback().await
            }
            ReadOutcome::Unreadable(e) => {
                error!("Failed to read {}: {}; serving defaults", self.path.display(), e);
                self.fallback.clone()
            }
            ReadOutcome::Corrupt(e) => {
                warn!(
                    "{} is not a valid snapshot ({}), resetting to defaults",
                    self.path.display(),
                    e
                );
                match self.quarantine().await {
                    Ok(backup) => warn!("Unreadable data kept at {}", backup.display()),
                    Err(e) => error!("Failed to move aside {}: {}", self.path.display(), e),
                }
                self.persist_fallback().await
            }
        }
    }

    async fn save(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        self.write_atomic(snapshot).await
    }

    fn backend(&self) -> &'static str {
        "file"
    }
}

fn unix_nanos() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos()
}
