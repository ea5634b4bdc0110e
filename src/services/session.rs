//! Session values and the server-side session store.
//!
//! ARCHITECTURE
//! ============
//! A `Session` is a plain value: handlers load it, hand it to the
//! authenticator, and save whatever comes back. The store maps an opaque
//! cookie token to the latest value and never exposes interior mutation.
//!
//! TRADE-OFFS
//! ==========
//! Entries expire on idle time only. Expired entries are invisible to `load`
//! immediately and reclaimed later by the sweeper task, so a slow sweep never
//! resurrects a stale login.

use std::collections::HashMap;
use std::fmt::Write;
use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::Rng;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

pub(crate) fn bytes_to_hex(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(s, "{b:02x}");
    }
    s
}

/// Generate a cryptographically random 32-byte hex token.
#[must_use]
pub fn generate_token() -> String {
    let bytes: [u8; 32] = rand::rng().random();
    bytes_to_hex(&bytes)
}

// =============================================================================
// FLASH MESSAGES
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashKind {
    Success,
    Info,
    Error,
}

impl FlashKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Info => "info",
            Self::Error => "error",
        }
    }
}

/// One-shot notification shown on the next rendered page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flash {
    pub kind: FlashKind,
    pub text: String,
}

impl Flash {
    #[must_use]
    pub fn new(kind: FlashKind, text: impl Into<String>) -> Self {
        Self { kind, text: text.into() }
    }
}

// =============================================================================
// SESSION
// =============================================================================

/// Per-client session record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    /// Authenticated username, if any.
    pub username: Option<String>,
    /// Pending flashes, oldest first.
    pub flashes: Vec<Flash>,
}

impl Session {
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    #[cfg(test)]
    #[must_use]
    pub fn authenticated(username: impl Into<String>) -> Self {
        Self { username: Some(username.into()), flashes: Vec::new() }
    }

    /// Append a flash, returning the updated session.
    #[must_use]
    pub fn with_flash(mut self, kind: FlashKind, text: impl Into<String>) -> Self {
        self.flashes.push(Flash::new(kind, text));
        self
    }

    /// Drain pending flashes, returning them with the emptied session.
    #[must_use]
    pub fn take_flashes(mut self) -> (Self, Vec<Flash>) {
        let flashes = std::mem::take(&mut self.flashes);
        (self, flashes)
    }

    /// True when there is nothing worth keeping server-side.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.username.is_none() && self.flashes.is_empty()
    }
}

// =============================================================================
// SESSION STORE
// =============================================================================

struct SessionEntry {
    session: Session,
    last_seen: Instant,
}

/// Token-keyed session map shared across handlers. Clone is cheap.
#[derive(Clone)]
pub struct SessionStore {
    entries: Arc<RwLock<HashMap<String, SessionEntry>>>,
    ttl: Duration,
}

impl SessionStore {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self { entries: Arc::new(RwLock::new(HashMap::new())), ttl }
    }

    /// Return the session for `token` unless unknown or idle past the TTL.
    /// A successful load refreshes the idle clock.
    pub async fn load(&self, token: &str) -> Option<Session> {
        let mut entries = self.entries.write().await;
        let entry = entries.get_mut(token)?;
        if entry.last_seen.elapsed() > self.ttl {
            entries.remove(token);
            return None;
        }
        entry.last_seen = Instant::now();
        Some(entry.session.clone())
    }

    pub async fn save(&self, token: &str, session: Session) {
        let entry = SessionEntry { session, last_seen: Instant::now() };
        self.entries.write().await.insert(token.to_owned(), entry);
    }

    /// Overwrite an existing live entry. Returns false, leaving the store
    /// untouched, when `token` is unknown, was removed, or has expired.
    pub async fn replace(&self, token: &str, session: Session) -> bool {
        let mut entries = self.entries.write().await;
        let Some(entry) = entries.get_mut(token) else {
            return false;
        };
        if entry.last_seen.elapsed() > self.ttl {
            entries.remove(token);
            return false;
        }
        *entry = SessionEntry { session, last_seen: Instant::now() };
        true
    }

    /// Returns true if an entry was removed.
    pub async fn remove(&self, token: &str) -> bool {
        self.entries.write().await.remove(token).is_some()
    }

    /// Drop idle-expired entries. Returns how many were removed.
    pub async fn sweep_expired(&self) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        let ttl = self.ttl;
        entries.retain(|_, entry| entry.last_seen.elapsed() <= ttl);
        before - entries.len()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    #[cfg(test)]
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

/// Spawn the background sweeper. Returns a handle for shutdown.
pub fn spawn_session_sweeper(store: SessionStore, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        loop {
            interval.tick().await;
            let removed = store.sweep_expired().await;
            if removed > 0 {
                let remaining = store.len().await;
                tracing::debug!(removed, remaining, "expired sessions swept");
            }
        }
    })
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
