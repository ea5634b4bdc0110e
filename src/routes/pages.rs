//! Page routes: home and the protected dashboard.

use axum::extract::State;
use axum::response::{Html, IntoResponse, Response};

use super::auth::{AuthUser, ClientSession};
use crate::services::auth::AuthState;
use crate::state::AppState;
use crate::views::{self, PageContext};

/// `GET /` — home page. Protected only when `home_requires_auth` is set.
pub async fn home(State(state): State<AppState>, client: ClientSession) -> Response {
    if state.config.home_requires_auth && AuthState::of(&client.session) == AuthState::Anonymous {
        return client.handle.login_redirect("/", state.config.cookie_secure).into_response();
    }

    let ClientSession { handle, session } = client;
    let (session, flashes) = session.take_flashes();
    let ctx = PageContext {
        username: session.username.as_deref(),
        flashes: &flashes,
        registration_enabled: state.config.registration_enabled,
    };
    let html = views::home_page(&ctx);
    let jar = handle.commit(&state, session, false).await;
    (jar, Html(html)).into_response()
}

/// `GET /dashboard` — greets the authenticated user.
pub async fn dashboard(State(state): State<AppState>, auth: AuthUser) -> Response {
    let ClientSession { handle, session } = auth.client;
    let (session, flashes) = session.take_flashes();
    let ctx = PageContext {
        username: Some(&auth.username),
        flashes: &flashes,
        registration_enabled: state.config.registration_enabled,
    };
    let html = views::dashboard_page(&ctx, &auth.username);
    let jar = handle.commit(&state, session, false).await;
    (jar, Html(html)).into_response()
}
