use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::id::session_token;
use crate::model::AdminCredential;
use crate::store::SnapshotStore;

/// Checks an admin login. On success returns an opaque session token.
#[async_trait]
pub trait CredentialVerifier: Send + Sync {
    async fn verify(&self, username: &str, password: &str) -> Result<String>;
}

/// Compares against the `admin` record of the current snapshot.
pub struct SnapshotCredentials {
    store: Arc<dyn SnapshotStore>,
}

impl SnapshotCredentials {
    pub fn new(store: Arc<dyn SnapshotStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl CredentialVerifier for SnapshotCredentials {
    async fn verify(&self, username: &str, password: &str) -> Result<String> {
        let snapshot = self.store.load().await;
        check(&snapshot.admin, username, password)
    }
}

/// A fixed credential pair supplied by configuration. Overrides the stored record.
pub struct StaticCredentials {
    credential: AdminCredential,
}

impl StaticCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            credential: AdminCredential {
                username: username.into(),
                password: password.into(),
            },
        }
    }
}

#[async_trait]
impl CredentialVerifier for StaticCredentials {
    async fn verify(&self, username: &str, password: &str) -> Result<String> {
        check(&self.credential, username, password)
    }
}

fn check(expected: &AdminCredential, username: &str, password: &str) -> Result<String> {
    if expected.username == username && expected.password == password {
        Ok(session_token())
    } else {
        Err(Error::Unauthorized)
    }
}
