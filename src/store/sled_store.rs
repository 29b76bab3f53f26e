use async_trait::async_trait;
use tracing::{error, info, warn};

use super::SnapshotStore;
use crate::error::StoreError;
use crate::model::Snapshot;

const SNAPSHOT_KEY: &str = "snapshot";
const CORRUPT_KEY: &str = "snapshot.corrupt";

/// Persistent snapshot storage backed by sled. The whole dataset lives as
/// JSON under a single key.
pub struct SledStore {
    db: sled::Db,
    fallback: Snapshot,
}

impl SledStore {
    pub fn new(db: sled::Db) -> Self {
        Self {
            db,
            fallback: Snapshot::seed(),
        }
    }

    /// Open a sled database at the given directory path.
    pub fn open(data_dir: &str) -> Result<Self, StoreError> {
        let db = sled::open(data_dir)?;
        Ok(Self::new(db))
    }

    pub fn with_fallback(mut self, fallback: Snapshot) -> Self {
        self.fallback = fallback;
        self
    }
}

#[async_trait]
impl SnapshotStore for SledStore {
    async fn load(&self) -> Snapshot {
        loop {
            let current = match self.db.get(SNAPSHOT_KEY) {
                Ok(current) => current,
                Err(e) => {
                    error!("Failed to read snapshot from sled: {}; serving defaults", e);
                    return self.fallback.clone();
                }
            };

            match &current {
                Some(bytes) => match serde_json::from_slice(bytes) {
                    Ok(snapshot) => return snapshot,
                    Err(e) => warn!("Stored snapshot is unreadable ({}), resetting to defaults", e),
                },
                None => info!("No snapshot stored in sled yet, writing defaults"),
            }

            let payload = match serde_json::to_vec(&self.fallback) {
                Ok(payload) => payload,
                Err(e) => {
                    error!("Failed to encode default snapshot: {}", e);
                    return self.fallback.clone();
                }
            };

            // Reset only if the key still holds what was read, so a concurrent
            // save is never overwritten by the defaults.
            match self
                .db
                .compare_and_swap(SNAPSHOT_KEY, current.as_ref(), Some(payload))
            {
                Ok(Ok(())) => {
                    if let Some(bytes) = current {
                        if let Err(e) = self.db.insert(CORRUPT_KEY, bytes) {
                            error!("Failed to keep unreadable snapshot: {}", e);
                        }
                    }
                    if let Err(e) = self.db.flush() {
                        error!("Failed to flush defaults to sled: {}", e);
                    }
                    return self.fallback.clone();
                }
                Ok(Err(_)) => continue,
                Err(e) => {
                    error!("Failed to write defaults to sled: {}", e);
                    return self.fallback.clone();
                }
            }
        }
    }

    async fn save(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        let payload = serde_json::to_vec(snapshot)?;
        self.db.insert(SNAPSHOT_KEY, payload)?;
        self.db.flush()?;
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "sled"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_db() -> sled::Db {
        sled::Config::new().temporary(true).open().unwrap()
    }

    #[tokio::test]
    async fn empty_db_is_seeded() {
        let store = SledStore::new(temp_db());
        assert_eq!(store.load().await, Snapshot::seed());
        assert!(store.db.get(SNAPSHOT_KEY).unwrap().is_some());
    }

    #[tokio::test]
    async fn corrupt_value_is_kept_and_reset() {
        let db = temp_db();
        db.insert(SNAPSHOT_KEY, &b"garbage"[..]).unwrap();
        let store = SledStore::new(db).with_fallback(Snapshot::default());

        assert_eq!(store.load().await, Snapshot::default());
        assert_eq!(store.db.get(CORRUPT_KEY).unwrap().unwrap().as_ref(), b"garbage");
    }

    #[tokio::test]
    async fn save_then_load() {
        let store = SledStore::new(temp_db());
        let mut snapshot = Snapshot::seed();
        snapshot.items.pop();
        store.save(&snapshot).await.unwrap();
        assert_eq!(store.load().await, snapshot);
    }
}
