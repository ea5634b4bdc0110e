//! Typed runtime configuration parsed from environment variables.
//!
//! DESIGN
//! ======
//! `AppConfig::from_env` reads the process environment once at startup.
//! Parsing goes through `from_lookup` so tests can feed a plain map instead
//! of mutating process-wide env state.

use std::time::Duration;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_SEED_USERS: &str = "Luis:Matematicas";
pub const DEFAULT_SESSION_TTL_SECS: u64 = 86_400;
pub const DEFAULT_SESSION_SWEEP_INTERVAL_SECS: u64 = 60;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },
    #[error("invalid SEED_USERS entry {0:?} (expected user:password)")]
    InvalidSeed(String),
    #[error("duplicate SEED_USERS username {0:?}")]
    DuplicateSeed(String),
}

/// Where `/logout` sends the client afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogoutRedirect {
    Login,
    Home,
}

impl LogoutRedirect {
    #[must_use]
    pub fn path(self) -> &'static str {
        match self {
            Self::Login => "/login",
            Self::Home => "/",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub port: u16,
    pub seed_users: Vec<(String, String)>,
    pub registration_enabled: bool,
    pub home_requires_auth: bool,
    pub logout_redirect: LogoutRedirect,
    pub cookie_secure: bool,
    pub session_ttl: Duration,
    pub session_sweep_interval: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            seed_users: vec![("Luis".to_owned(), "Matematicas".to_owned())],
            registration_enabled: true,
            home_requires_auth: false,
            logout_redirect: LogoutRedirect::Login,
            cookie_secure: false,
            session_ttl: Duration::from_secs(DEFAULT_SESSION_TTL_SECS),
            session_sweep_interval: Duration::from_secs(DEFAULT_SESSION_SWEEP_INTERVAL_SECS),
        }
    }
}

impl AppConfig {
    /// Build typed config from environment variables.
    ///
    /// Optional:
    /// - `PORT`: default 3000
    /// - `SEED_USERS`: comma-separated `user:password`, default `Luis:Matematicas`
    /// - `REGISTRATION_ENABLED`: default true
    /// - `HOME_REQUIRES_AUTH`: default false
    /// - `LOGOUT_REDIRECT`: `login` (default) or `home`
    /// - `COOKIE_SECURE`: default false
    /// - `SESSION_TTL_SECS`: default 86400
    /// - `SESSION_SWEEP_INTERVAL_SECS`: default 60
    ///
    /// # Errors
    ///
    /// Returns an error if any variable is present but malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build typed config from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns an error if any value is present but malformed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = parse_or("PORT", lookup("PORT"), DEFAULT_PORT)?;
        let seed_users = parse_seed_users(lookup("SEED_USERS").as_deref().unwrap_or(DEFAULT_SEED_USERS))?;
        let registration_enabled = bool_or("REGISTRATION_ENABLED", lookup("REGISTRATION_ENABLED"), true)?;
        let home_requires_auth = bool_or("HOME_REQUIRES_AUTH", lookup("HOME_REQUIRES_AUTH"), false)?;
        let logout_redirect = parse_logout_redirect(lookup("LOGOUT_REDIRECT").as_deref())?;
        let cookie_secure = bool_or("COOKIE_SECURE", lookup("COOKIE_SECURE"), false)?;
        let ttl_secs = parse_or("SESSION_TTL_SECS", lookup("SESSION_TTL_SECS"), DEFAULT_SESSION_TTL_SECS)?;
        let sweep_secs = parse_or(
            "SESSION_SWEEP_INTERVAL_SECS",
            lookup("SESSION_SWEEP_INTERVAL_SECS"),
            DEFAULT_SESSION_SWEEP_INTERVAL_SECS,
        )?;
        if sweep_secs == 0 {
            return Err(ConfigError::InvalidValue { key: "SESSION_SWEEP_INTERVAL_SECS", value: "0".into() });
        }

        Ok(Self {
            port,
            seed_users,
            registration_enabled,
            home_requires_auth,
            logout_redirect,
            cookie_secure,
            session_ttl: Duration::from_secs(ttl_secs),
            session_sweep_interval: Duration::from_secs(sweep_secs),
        })
    }
}

pub(crate) fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn bool_or(key: &'static str, raw: Option<String>, default: bool) -> Result<bool, ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) => parse_bool(&value).ok_or(ConfigError::InvalidValue { key, value }),
    }
}

fn parse_or<T>(key: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
{
    match raw {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidValue { key, value }),
    }
}

fn parse_logout_redirect(raw: Option<&str>) -> Result<LogoutRedirect, ConfigError> {
    match raw.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
        None | Some("login") => Ok(LogoutRedirect::Login),
        Some("home") => Ok(LogoutRedirect::Home),
        Some(other) => Err(ConfigError::InvalidValue { key: "LOGOUT_REDIRECT", value: other.to_owned() }),
    }
}

/// Parse `user:password,user2:password2`. Blank entries are skipped; the
/// password may itself contain `:`.
pub(crate) fn parse_seed_users(raw: &str) -> Result<Vec<(String, String)>, ConfigError> {
    let mut users: Vec<(String, String)> = Vec::new();
    for entry in raw.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let Some((user, password)) = entry.split_once(':') else {
            return Err(ConfigError::InvalidSeed(entry.to_owned()));
        };
        let user = user.trim();
        if user.is_empty() || password.is_empty() {
            return Err(ConfigError::InvalidSeed(entry.to_owned()));
        }
        if users.iter().any(|(existing, _)| existing == user) {
            return Err(ConfigError::DuplicateSeed(user.to_owned()));
        }
        users.push((user.to_owned(), password.to_owned()));
    }
    Ok(users)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
