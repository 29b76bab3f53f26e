use async_trait::async_trait;
use tokio::sync::RwLock;

use super::SnapshotStore;
use crate::error::StoreError;
use crate::model::Snapshot;

/// In-memory snapshot storage backed by a `RwLock`. Nothing survives a restart.
pub struct MemoryStore {
    data: RwLock<Snapshot>,
}

impl MemoryStore {
    /// Starts from the seed data, as a fresh file store would.
    pub fn new() -> Self {
        Self::with_snapshot(Snapshot::seed())
    }

    pub fn with_snapshot(snapshot: Snapshot) -> Self {
        Self {
            data: RwLock::new(snapshot),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SnapshotStore for MemoryStore {
    async fn load(&self) -> Snapshot {
        self.data.read().await.clone()
    }

    async fn save(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        let mut data = self.data.write().await;
        *data = snapshot.clone();
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
