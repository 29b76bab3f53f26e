pub mod file;
pub mod memory;
#[cfg(feature = "sled")]
pub mod sled_store;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::model::Snapshot;

pub use file::JsonFileStore;
pub use memory::MemoryStore;
#[cfg(feature = "sled")]
pub use sled_store::SledStore;

/// Whole-snapshot storage. Implementations must be thread-safe.
///
/// `load` never fails: a missing or unreadable copy is replaced by the
/// fallback snapshot (normally [`Snapshot::seed`]) and that fallback is
/// persisted, so the store always holds a complete document. `load` may run
/// concurrently with `save`; a reset must only replace the copy it actually
/// found broken.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Read the full dataset.
    async fn load(&self) -> Snapshot;

    /// Replace the persisted dataset with `snapshot`.
    async fn save(&self, snapshot: &Snapshot) -> Result<(), StoreError>;

    /// Short backend name for logs and metrics.
    fn backend(&self) -> &'static str;
}
