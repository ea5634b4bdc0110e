//! Credential store — username to plaintext password.
//!
//! DESIGN
//! ======
//! The store is injected into `AppState` as `Arc<dyn CredentialStore>` so
//! tests can build a fresh one each. The in-memory implementation guards the
//! map with a single `RwLock`; `register` holds the write lock across the
//! existence check and the insert, so racing registrations of one username
//! produce exactly one winner.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use tokio::sync::RwLock;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CredentialError {
    #[error("username already exists: {0}")]
    AlreadyExists(String),
}

#[async_trait::async_trait]
pub trait CredentialStore: Send + Sync {
    /// Return the stored password for `username`, if any.
    async fn lookup(&self, username: &str) -> Option<String>;

    /// Insert a new credential. Fails without modifying the store when the
    /// username is already taken.
    async fn register(&self, username: &str, password: &str) -> Result<(), CredentialError>;

    /// Number of known usernames.
    async fn user_count(&self) -> usize;
}

/// Process-lifetime in-memory credential map.
#[derive(Debug, Default)]
pub struct MemoryCredentials {
    users: RwLock<HashMap<String, String>>,
}

impl MemoryCredentials {
    /// Build a store pre-seeded with `(username, password)` pairs. Later
    /// duplicates overwrite earlier ones.
    #[must_use]
    pub fn seeded<I, U, P>(seed: I) -> Self
    where
        I: IntoIterator<Item = (U, P)>,
        U: Into<String>,
        P: Into<String>,
    {
        let users = seed
            .into_iter()
            .map(|(u, p)| (u.into(), p.into()))
            .collect();
        Self { users: RwLock::new(users) }
    }
}

#[async_trait::async_trait]
impl CredentialStore for MemoryCredentials {
    async fn lookup(&self, username: &str) -> Option<String> {
        self.users.read().await.get(username).cloned()
    }

    async fn register(&self, username: &str, password: &str) -> Result<(), CredentialError> {
        let mut users = self.users.write().await;
        match users.entry(username.to_owned()) {
            Entry::Occupied(_) => Err(CredentialError::AlreadyExists(username.to_owned())),
            Entry::Vacant(slot) => {
                slot.insert(password.to_owned());
                Ok(())
            }
        }
    }

    async fn user_count(&self) -> usize {
        self.users.read().await.len()
    }
}

#[cfg(test)]
#[path = "credentials_test.rs"]
mod tests;
