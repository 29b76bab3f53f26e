use std::io;

/// Failures of a [`crate::store::SnapshotStore`] backend.
#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("failed to serialize snapshot: {0}")]
    Serialize(#[from] serde_json::Error),
    #[cfg(feature = "sled")]
    #[error("sled error: {0}")]
    Sled(#[from] sled::Error),
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("{entity} not found")]
    NotFound { entity: &'static str },
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Conflict(String),
    #[error("Invalid credentials")]
    Unauthorized,
    #[error("storage failure: {0}")]
    Storage(#[from] StoreError),
}

impl Error {
    pub(crate) fn item_not_found() -> Self {
        Error::NotFound { entity: "Item" }
    }

    pub(crate) fn subscriber_not_found() -> Self {
        Error::NotFound { entity: "Subscriber" }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
