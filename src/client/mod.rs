#[cfg(feature = "client")]
mod api;
mod cache;

#[cfg(feature = "client")]
pub use api::{ApiClient, ClientError, SyncedClient};
pub use cache::{ClientCache, ItemScope};
