use std::collections::HashMap;

use super::*;

fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
        .collect();
    move |key| map.get(key).cloned()
}

// =============================================================================
// from_lookup
// =============================================================================

#[test]
fn from_lookup_empty_uses_defaults() {
    let cfg = AppConfig::from_lookup(lookup_from(&[])).unwrap();
    assert_eq!(cfg, AppConfig::default());
    assert_eq!(cfg.seed_users, vec![("Luis".to_owned(), "Matematicas".to_owned())]);
}

#[test]
fn from_lookup_parses_overrides() {
    let cfg = AppConfig::from_lookup(lookup_from(&[
        ("PORT", "8080"),
        ("SEED_USERS", "ana:uno, beto:dos"),
        ("REGISTRATION_ENABLED", "off"),
        ("HOME_REQUIRES_AUTH", "YES"),
        ("LOGOUT_REDIRECT", "home"),
        ("COOKIE_SECURE", "1"),
        ("SESSION_TTL_SECS", "30"),
        ("SESSION_SWEEP_INTERVAL_SECS", "5"),
    ]))
    .unwrap();

    assert_eq!(cfg.port, 8080);
    assert_eq!(
        cfg.seed_users,
        vec![("ana".to_owned(), "uno".to_owned()), ("beto".to_owned(), "dos".to_owned())]
    );
    assert!(!cfg.registration_enabled);
    assert!(cfg.home_requires_auth);
    assert_eq!(cfg.logout_redirect, LogoutRedirect::Home);
    assert!(cfg.cookie_secure);
    assert_eq!(cfg.session_ttl, Duration::from_secs(30));
    assert_eq!(cfg.session_sweep_interval, Duration::from_secs(5));
}

#[test]
fn from_lookup_bad_port_errors() {
    let err = AppConfig::from_lookup(lookup_from(&[("PORT", "not-a-port")])).unwrap_err();
    assert_eq!(err, ConfigError::InvalidValue { key: "PORT", value: "not-a-port".into() });
}

#[test]
fn from_lookup_bad_bool_errors() {
    let err = AppConfig::from_lookup(lookup_from(&[("COOKIE_SECURE", "maybe")])).unwrap_err();
    assert!(err.to_string().contains("COOKIE_SECURE"));
}

#[test]
fn from_lookup_bad_logout_redirect_errors() {
    let err = AppConfig::from_lookup(lookup_from(&[("LOGOUT_REDIRECT", "dashboard")])).unwrap_err();
    assert!(err.to_string().contains("LOGOUT_REDIRECT"));
}

#[test]
fn from_lookup_zero_sweep_interval_errors() {
    let err = AppConfig::from_lookup(lookup_from(&[("SESSION_SWEEP_INTERVAL_SECS", "0")])).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidValue { key: "SESSION_SWEEP_INTERVAL_SECS", .. }));
}

// =============================================================================
// parse_bool
// =============================================================================

#[test]
fn parse_bool_variants() {
    for val in ["1", "true", "yes", "on", " TRUE ", "On"] {
        assert_eq!(parse_bool(val), Some(true), "expected true for {val:?}");
    }
    for val in ["0", "false", "no", "off", "False"] {
        assert_eq!(parse_bool(val), Some(false), "expected false for {val:?}");
    }
    assert_eq!(parse_bool(""), None);
    assert_eq!(parse_bool("maybe"), None);
}

// =============================================================================
// parse_seed_users
// =============================================================================

#[test]
fn parse_seed_users_allows_colon_in_password() {
    let users = parse_seed_users("root:a:b:c").unwrap();
    assert_eq!(users, vec![("root".to_owned(), "a:b:c".to_owned())]);
}

#[test]
fn parse_seed_users_skips_blank_entries() {
    let users = parse_seed_users(" , ana:x ,,").unwrap();
    assert_eq!(users.len(), 1);
}

#[test]
fn parse_seed_users_empty_string_is_empty_store() {
    assert!(parse_seed_users("").unwrap().is_empty());
}

#[test]
fn parse_seed_users_missing_colon_errors() {
    let err = parse_seed_users("ana").unwrap_err();
    assert_eq!(err, ConfigError::InvalidSeed("ana".into()));
}

#[test]
fn parse_seed_users_empty_password_errors() {
    assert!(matches!(parse_seed_users("ana:").unwrap_err(), ConfigError::InvalidSeed(_)));
}

#[test]
fn parse_seed_users_duplicate_errors() {
    let err = parse_seed_users("ana:x,ana:y").unwrap_err();
    assert_eq!(err, ConfigError::DuplicateSeed("ana".into()));
}

#[test]
fn logout_redirect_paths() {
    assert_eq!(LogoutRedirect::Login.path(), "/login");
    assert_eq!(LogoutRedirect::Home.path(), "/");
}
