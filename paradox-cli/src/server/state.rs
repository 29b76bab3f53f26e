use std::sync::Arc;

use paradox_lib::{
    Catalog, CredentialVerifier, JsonFileStore, MemoryStore, SledStore, SnapshotCredentials,
    SnapshotStore, StaticCredentials,
};

use super::config::{AdminConfig, ServerConfig, StorageBackend};
use super::metrics::MeteredStore;

/// Shared application state for the HTTP server.
///
/// Handlers hold no data of their own: every request goes through the
/// catalog, which re-reads the store.
pub struct AppState {
    pub catalog: Catalog,
    pub verifier: Arc<dyn CredentialVerifier>,
}

impl AppState {
    /// Build state over `store`. Logins check the snapshot's admin record
    /// unless `admin` supplies a configured pair.
    pub fn new(store: Arc<dyn SnapshotStore>, admin: Option<&AdminConfig>) -> Self {
        let store: Arc<dyn SnapshotStore> = Arc::new(MeteredStore::new(store));
        let verifier: Arc<dyn CredentialVerifier> = match admin {
            Some(admin) => Arc::new(StaticCredentials::new(&admin.username, &admin.password)),
            None => Arc::new(SnapshotCredentials::new(Arc::clone(&store))),
        };
        Self {
            catalog: Catalog::new(store),
            verifier,
        }
    }
}

/// Open the storage backend selected by the configuration.
pub fn open_store(config: &ServerConfig) -> Result<Arc<dyn SnapshotStore>, String> {
    let store: Arc<dyn SnapshotStore> = match config.storage {
        StorageBackend::File => Arc::new(JsonFileStore::new(&config.data_file)),
        StorageBackend::Sled => Arc::new(
            SledStore::open(&config.data_dir)
                .map_err(|e| format!("failed to open sled db at {}: {}", config.data_dir, e))?,
        ),
        StorageBackend::Memory => Arc::new(MemoryStore::new()),
    };
    Ok(store)
}
