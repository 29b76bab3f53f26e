//! Data layer of the Paradox showcase: a flat-file catalog of art, articles
//! and products, a mailing list, and a single admin credential.
//!
//! The whole dataset is one [`Snapshot`], loaded and saved as a unit through a
//! [`SnapshotStore`]. [`Catalog`] wraps the item and subscriber repositories
//! in that load/save cycle and serializes writers.
//!
//! ```no_run
//! use std::sync::Arc;
//! use paradox_lib::{Catalog, ItemKind, JsonFileStore, NewItem};
//!
//! # async fn demo() -> paradox_lib::Result<()> {
//! let catalog = Catalog::new(Arc::new(JsonFileStore::new("data.json")));
//! let item = catalog
//!     .create_item(NewItem {
//!         title: "Orbit".into(),
//!         kind: ItemKind::Art,
//!         content: String::new(),
//!         price: 0.0,
//!         image: String::new(),
//!     })
//!     .await?;
//! assert!(catalog.active_items().await.iter().any(|i| i.id == item.id));
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod catalog;
pub mod client;
pub mod error;
pub mod id;
pub mod model;
pub mod repository;
pub mod store;
pub mod wire;

pub use auth::{CredentialVerifier, SnapshotCredentials, StaticCredentials};
pub use catalog::Catalog;
pub use error::{Error, Result, StoreError};
pub use model::{
    AdminCredential, Item, ItemKind, ItemPatch, ItemStatus, NewItem, Snapshot, Subscriber,
};
#[cfg(feature = "sled")]
pub use store::SledStore;
pub use store::{JsonFileStore, MemoryStore, SnapshotStore};
