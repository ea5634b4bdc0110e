//! Domain services used by HTTP routes.
//!
//! ARCHITECTURE
//! ============
//! Service modules own the authentication state machine and the in-memory
//! stores so route handlers can stay focused on cookie plumbing and HTML.

pub mod auth;
pub mod credentials;
pub mod session;
