//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor.
//! It holds the credential store, the server-side session map and the
//! parsed configuration. Each client's `Session` lives in the session map,
//! keyed by the token in its cookie.

use std::sync::Arc;

use crate::config::AppConfig;
use crate::services::credentials::{CredentialStore, MemoryCredentials};
use crate::services::session::SessionStore;

/// Shared application state, injected into Axum handlers via State extractor.
/// Clone is required by Axum; all inner fields are Arc-wrapped or Clone.
#[derive(Clone)]
pub struct AppState {
    pub credentials: Arc<dyn CredentialStore>,
    pub sessions: SessionStore,
    pub config: Arc<AppConfig>,
}

impl AppState {
    #[must_use]
    pub fn new(credentials: Arc<dyn CredentialStore>, config: AppConfig) -> Self {
        let sessions = SessionStore::new(config.session_ttl);
        Self { credentials, sessions, config: Arc::new(config) }
    }

    /// Build state with an in-memory store seeded from `config.seed_users`.
    #[must_use]
    pub fn from_config(config: AppConfig) -> Self {
        let credentials = MemoryCredentials::seeded(config.seed_users.clone());
        Self::new(Arc::new(credentials), config)
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================
