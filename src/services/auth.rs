//! Session authenticator — login, logout, registration, access checks.
//!
//! DESIGN
//! ======
//! Every operation takes the client's current `Session` by value and returns
//! the next one. Nothing here touches cookies or the session store; route
//! handlers persist whatever comes back.

use super::credentials::{CredentialError, CredentialStore};
use super::session::Session;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("invalid username or password")]
    InvalidCredentials,
    #[error("username already exists: {0}")]
    AlreadyExists(String),
    #[error("authentication required")]
    Unauthenticated,
    #[error("missing field: {0}")]
    MissingField(&'static str),
}

impl From<CredentialError> for AuthError {
    fn from(err: CredentialError) -> Self {
        match err {
            CredentialError::AlreadyExists(username) => Self::AlreadyExists(username),
        }
    }
}

/// Authentication state derived from a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    Anonymous,
    Authenticated(String),
}

impl AuthState {
    #[must_use]
    pub fn of(session: &Session) -> Self {
        match &session.username {
            Some(username) => Self::Authenticated(username.clone()),
            None => Self::Anonymous,
        }
    }
}

/// Result of a state-changing operation: the next session plus the outcome.
#[derive(Debug)]
pub struct Transition {
    pub session: Session,
    pub result: Result<(), AuthError>,
}

/// Check `password` against the store. On success the session becomes
/// `Authenticated(username)`; on failure it is returned untouched.
pub async fn submit_login(store: &dyn CredentialStore, session: Session, username: &str, password: &str) -> Transition {
    let username = username.trim();
    let matches = !username.is_empty()
        && store
            .lookup(username)
            .await
            .is_some_and(|stored| stored == password);

    if !matches {
        return Transition { session, result: Err(AuthError::InvalidCredentials) };
    }

    let session = Session { username: Some(username.to_owned()), ..session };
    Transition { session, result: Ok(()) }
}

/// Clear the username. Idempotent; pending flashes are kept.
#[must_use]
pub fn logout(session: Session) -> Session {
    Session { username: None, ..session }
}

/// Add a new credential to the store.
///
/// # Errors
///
/// `MissingField` for an empty username or password, `AlreadyExists` when
/// the username is taken.
pub async fn register(store: &dyn CredentialStore, username: &str, password: &str) -> Result<(), AuthError> {
    let username = username.trim();
    if username.is_empty() {
        return Err(AuthError::MissingField("username"));
    }
    if password.is_empty() {
        return Err(AuthError::MissingField("password"));
    }
    store.register(username, password).await?;
    Ok(())
}

/// Return the authenticated username.
///
/// # Errors
///
/// `Unauthenticated` when the session carries no username; the caller
/// should redirect to the login entry point.
pub fn require_authenticated(session: &Session) -> Result<&str, AuthError> {
    session.username.as_deref().ok_or(AuthError::Unauthenticated)
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
