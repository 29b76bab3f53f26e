use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, error};

use crate::error::{Error, Result};
use crate::id::now;
use crate::model::{Item, ItemPatch, NewItem, Snapshot, Subscriber};
use crate::repository::{items, subscribers};
use crate::store::SnapshotStore;

/// Runs repository operations against a [`SnapshotStore`].
///
/// Every call loads the full snapshot. Mutations hold the writer lock across
/// load, change and save, so two writers in the same process can never
/// overwrite each other's change. Reads take no lock; a store that repairs
/// a broken copy during `load` must not let that repair clobber a newer save.
pub struct Catalog {
    store: Arc<dyn SnapshotStore>,
    writer: Mutex<()>,
}

impl Catalog {
    pub fn new(store: Arc<dyn SnapshotStore>) -> Self {
        Self {
            store,
            writer: Mutex::new(()),
        }
    }

    pub fn store(&self) -> &Arc<dyn SnapshotStore> {
        &self.store
    }

    pub async fn snapshot(&self) -> Snapshot {
        self.store.load().await
    }

    pub async fn active_items(&self) -> Vec<Item> {
        items::list_active(&self.store.load().await.items)
    }

    pub async fn all_items(&self) -> Vec<Item> {
        items::list_all(&self.store.load().await.items)
    }

    pub async fn item(&self, id: &str) -> Result<Item> {
        let snapshot = self.store.load().await;
        items::get(&snapshot.items, id).cloned()
    }

    pub async fn create_item(&self, fields: NewItem) -> Result<Item> {
        let item = self
            .mutate(|s| items::create(&mut s.items, fields, now()))
            .await?;
        debug!("Created item {} ({})", item.id, item.kind);
        Ok(item)
    }

    pub async fn update_item(&self, id: &str, patch: ItemPatch) -> Result<Item> {
        let item = self
            .mutate(|s| items::update(&mut s.items, id, patch))
            .await?;
        debug!("Updated item {}", item.id);
        Ok(item)
    }

    pub async fn delete_item(&self, id: &str) -> Result<Item> {
        let item = self.mutate(|s| items::delete(&mut s.items, id)).await?;
        debug!("Deleted item {}", item.id);
        Ok(item)
    }

    pub async fn subscribers(&self) -> Vec<Subscriber> {
        subscribers::list(&self.store.load().await.subscribers)
    }

    pub async fn subscribe(&self, email: &str) -> Result<Subscriber> {
        let subscriber = self
            .mutate(|s| subscribers::subscribe(&mut s.subscribers, email, now()))
            .await?;
        debug!("New subscriber {}", subscriber.id);
        Ok(subscriber)
    }

    pub async fn delete_subscriber(&self, id: &str) -> Result<Subscriber> {
        let subscriber = self
            .mutate(|s| subscribers::delete(&mut s.subscribers, id))
            .await?;
        debug!("Deleted subscriber {}", subscriber.id);
        Ok(subscriber)
    }

    /// Load, apply `op`, save. Nothing is written when `op` fails.
    async fn mutate<T>(&self, op: impl FnOnce(&mut Snapshot) -> Result<T>) -> Result<T> {
        let _guard = self.writer.lock().await;
        let mut snapshot = self.store.load().await;
        let out = op(&mut snapshot)?;
        if let Err(e) = self.store.save(&snapshot).await {
            error!("Failed to save snapshot to {} store: {}", self.store.backend(), e);
            return Err(Error::Storage(e));
        }
        Ok(out)
    }
}
