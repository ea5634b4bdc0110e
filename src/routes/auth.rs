//! Auth routes: login, registration, logout, plus the session extractors.

use std::convert::Infallible;
use std::fmt::Write;

use axum::Form;
use axum::extract::{FromRef, FromRequestParts, Query, State};
use axum::http::StatusCode;
use axum::http::request::Parts;
use axum::response::{Html, IntoResponse, Json, Redirect, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use time::Duration;

use crate::services::auth::{self as auth_svc, AuthError};
use crate::services::session::{FlashKind, Session, generate_token};
use crate::state::AppState;
use crate::views::{self, PageContext};

pub(crate) const COOKIE_NAME: &str = "session_token";
const DEFAULT_LOGIN_TARGET: &str = "/dashboard";

// =============================================================================
// COOKIE TRANSPORT
// =============================================================================

fn session_cookie(token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((COOKIE_NAME, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .build()
}

fn clear_session_cookie(secure: bool) -> Cookie<'static> {
    Cookie::build((COOKIE_NAME, ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(Duration::ZERO)
        .build()
}

/// Where a client's session lives: the store token from its cookie, if the
/// store still knows it.
pub struct SessionHandle {
    token: Option<String>,
    stale_cookie: bool,
}

impl SessionHandle {
    /// Persist `session` for this client and return the cookie update.
    ///
    /// Empty sessions are dropped and their cookie cleared. `rotate` forces a
    /// fresh token, discarding the old one. Without `rotate`, a token that
    /// was removed or rotated away while this request ran is not recreated.
    pub async fn commit(self, state: &AppState, session: Session, rotate: bool) -> CookieJar {
        let secure = state.config.cookie_secure;
        let jar = CookieJar::new();

        if session.is_empty() {
            let removed = match &self.token {
                Some(token) => state.sessions.remove(token).await,
                None => false,
            };
            if removed || self.stale_cookie {
                return jar.add(clear_session_cookie(secure));
            }
            return jar;
        }

        match self.token {
            Some(token) if !rotate => {
                if state.sessions.replace(&token, session).await {
                    return jar.add(session_cookie(token, secure));
                }
                tracing::debug!("session ended mid-request; update dropped");
                jar
            }
            previous => {
                if let Some(old) = previous {
                    state.sessions.remove(&old).await;
                }
                let token = generate_token();
                state.sessions.save(&token, session).await;
                jar.add(session_cookie(token, secure))
            }
        }
    }

    /// Redirect to the login page, clearing the cookie if it pointed at no
    /// live session.
    pub(crate) fn login_redirect(&self, next: &str, secure: bool) -> LoginRedirect {
        LoginRedirect {
            next: next.to_owned(),
            clear_cookie: self.stale_cookie.then(|| clear_session_cookie(secure)),
        }
    }
}

/// The requesting client's session. Anonymous and empty when the cookie is
/// missing, unknown or expired.
pub struct ClientSession {
    pub handle: SessionHandle,
    pub session: Session,
}

impl<S> FromRequestParts<S> for ClientSession
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let cookie_token = jar
            .get(COOKIE_NAME)
            .map(Cookie::value)
            .filter(|t| !t.is_empty())
            .map(str::to_owned);

        let Some(token) = cookie_token else {
            return Ok(Self { handle: SessionHandle { token: None, stale_cookie: false }, session: Session::anonymous() });
        };

        let app_state = AppState::from_ref(state);
        match app_state.sessions.load(&token).await {
            Some(session) => Ok(Self { handle: SessionHandle { token: Some(token), stale_cookie: false }, session }),
            None => Ok(Self { handle: SessionHandle { token: None, stale_cookie: true }, session: Session::anonymous() }),
        }
    }
}

/// Authenticated client. Use as a handler parameter to require login;
/// anonymous clients are redirected to `/login?next=<path>`.
pub struct AuthUser {
    pub username: String,
    pub client: ClientSession,
}

pub struct LoginRedirect {
    next: String,
    clear_cookie: Option<Cookie<'static>>,
}

impl IntoResponse for LoginRedirect {
    fn into_response(self) -> Response {
        let redirect = Redirect::to(&login_url(&self.next));
        match self.clear_cookie {
            Some(cookie) => (CookieJar::new().add(cookie), redirect).into_response(),
            None => redirect.into_response(),
        }
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = LoginRedirect;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let client = match ClientSession::from_request_parts(parts, state).await {
            Ok(client) => client,
            Err(never) => match never {},
        };
        match auth_svc::require_authenticated(&client.session).map(str::to_owned) {
            Ok(username) => Ok(Self { username, client }),
            Err(_) => {
                tracing::debug!(path = parts.uri.path(), "unauthenticated access redirected to login");
                let secure = AppState::from_ref(state).config.cookie_secure;
                Err(client.handle.login_redirect(parts.uri.path(), secure))
            }
        }
    }
}

// =============================================================================
// HELPERS
// =============================================================================

pub(crate) fn auth_error_to_status(err: &AuthError) -> StatusCode {
    match err {
        AuthError::InvalidCredentials | AuthError::Unauthenticated => StatusCode::UNAUTHORIZED,
        AuthError::AlreadyExists(_) => StatusCode::CONFLICT,
        AuthError::MissingField(_) => StatusCode::BAD_REQUEST,
    }
}

/// Accept only same-origin absolute paths as post-login targets. Anything
/// outside visible ASCII is refused: browsers drop tabs and newlines from
/// URLs, and header values cannot carry them.
pub(crate) fn sanitize_next(next: Option<&str>) -> Option<&str> {
    let next = next?.trim();
    if next.starts_with('/')
        && !next.starts_with("//")
        && !next.contains('\\')
        && next.bytes().all(|b| b.is_ascii_graphic())
    {
        Some(next)
    } else {
        None
    }
}

fn encode_query_value(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for b in raw.bytes() {
        if b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.' | b'~' | b'/') {
            out.push(char::from(b));
        } else {
            let _ = write!(out, "%{b:02X}");
        }
    }
    out
}

pub(crate) fn login_url(next: &str) -> String {
    format!("/login?next={}", encode_query_value(next))
}

// =============================================================================
// HANDLERS
// =============================================================================

#[derive(Deserialize)]
pub struct NextQuery {
    next: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
    next: Option<String>,
}

#[derive(Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
}

/// `GET /login` — render the login form.
pub async fn login_form(State(state): State<AppState>, client: ClientSession, Query(query): Query<NextQuery>) -> Response {
    let ClientSession { handle, session } = client;
    let (session, flashes) = session.take_flashes();
    let next = sanitize_next(query.next.as_deref());
    let ctx = PageContext {
        username: session.username.as_deref(),
        flashes: &flashes,
        registration_enabled: state.config.registration_enabled,
    };
    let html = views::login_page(&ctx, None, "", next);
    let jar = handle.commit(&state, session, false).await;
    (jar, Html(html)).into_response()
}

/// `POST /login` — check credentials, rotate the session token on success.
pub async fn login(State(state): State<AppState>, client: ClientSession, Form(form): Form<LoginForm>) -> Response {
    let ClientSession { handle, session } = client;
    let transition = auth_svc::submit_login(state.credentials.as_ref(), session, &form.username, &form.password).await;

    match transition.result {
        Ok(()) => {
            let username = transition.session.username.clone().unwrap_or_default();
            tracing::info!(%username, "login succeeded");
            let session = transition
                .session
                .with_flash(FlashKind::Success, format!("Welcome, {username}!"));
            let target = sanitize_next(form.next.as_deref()).unwrap_or(DEFAULT_LOGIN_TARGET);
            let jar = handle.commit(&state, session, true).await;
            (jar, Redirect::to(target)).into_response()
        }
        Err(err) => {
            tracing::warn!(username = %form.username.trim(), "login failed");
            let status = auth_error_to_status(&err);
            let (session, flashes) = transition.session.take_flashes();
            let ctx = PageContext {
                username: session.username.as_deref(),
                flashes: &flashes,
                registration_enabled: state.config.registration_enabled,
            };
            let message = err.to_string();
            let html = views::login_page(&ctx, Some(&message), form.username.trim(), sanitize_next(form.next.as_deref()));
            let jar = handle.commit(&state, session, false).await;
            (status, jar, Html(html)).into_response()
        }
    }
}

/// `GET /register` — render the registration form.
pub async fn register_form(State(state): State<AppState>, client: ClientSession) -> Response {
    if !state.config.registration_enabled {
        return StatusCode::NOT_FOUND.into_response();
    }
    let ClientSession { handle, session } = client;
    let (session, flashes) = session.take_flashes();
    let ctx = PageContext { username: session.username.as_deref(), flashes: &flashes, registration_enabled: true };
    let html = views::register_page(&ctx, None, "");
    let jar = handle.commit(&state, session, false).await;
    (jar, Html(html)).into_response()
}

/// `POST /register` — add a credential, then send the client to `/login`.
pub async fn register(State(state): State<AppState>, client: ClientSession, Form(form): Form<RegisterForm>) -> Response {
    if !state.config.registration_enabled {
        return StatusCode::NOT_FOUND.into_response();
    }
    let ClientSession { handle, session } = client;

    match auth_svc::register(state.credentials.as_ref(), &form.username, &form.password).await {
        Ok(()) => {
            let username = form.username.trim();
            tracing::info!(%username, "user registered");
            let session = session.with_flash(FlashKind::Success, "Registration successful. Please log in.");
            let jar = handle.commit(&state, session, false).await;
            (jar, Redirect::to("/login")).into_response()
        }
        Err(err) => {
            tracing::info!(error = %err, "registration rejected");
            let status = auth_error_to_status(&err);
            let (session, flashes) = session.take_flashes();
            let ctx = PageContext { username: session.username.as_deref(), flashes: &flashes, registration_enabled: true };
            let message = err.to_string();
            let html = views::register_page(&ctx, Some(&message), form.username.trim());
            let jar = handle.commit(&state, session, false).await;
            (status, jar, Html(html)).into_response()
        }
    }
}

/// `GET|POST /logout` — clear the username and redirect per config.
pub async fn logout(State(state): State<AppState>, client: ClientSession) -> Response {
    let ClientSession { handle, session } = client;
    if let Some(username) = session.username.as_deref() {
        tracing::info!(%username, "logout");
    }
    let session = auth_svc::logout(session).with_flash(FlashKind::Info, "You have been logged out.");
    // New token: requests still holding the old one cannot write back a login.
    let jar = handle.commit(&state, session, true).await;
    (jar, Redirect::to(state.config.logout_redirect.path())).into_response()
}

/// `GET /api/auth/me` — return the current username.
pub async fn me(client: ClientSession) -> Response {
    match auth_svc::require_authenticated(&client.session) {
        Ok(username) => Json(serde_json::json!({ "username": username })).into_response(),
        Err(err) => (auth_error_to_status(&err), Json(serde_json::json!({ "error": err.to_string() }))).into_response(),
    }
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
