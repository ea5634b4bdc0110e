mod config;
mod routes;
mod services;
mod state;
mod views;

#[tokio::main]
async fn main() {
    // A missing .env file is fine; real env vars still apply.
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt::init();

    let config = config::AppConfig::from_env().expect("invalid configuration");
    let port = config.port;
    let sweep_every = config.session_sweep_interval;

    let state = state::AppState::from_config(config);
    let users = state.credentials.user_count().await;
    tracing::info!(
        users,
        registration = state.config.registration_enabled,
        home_requires_auth = state.config.home_requires_auth,
        "credential store seeded"
    );

    // Spawn background session sweeper.
    let _sweeper = services::session::spawn_session_sweeper(state.sessions.clone(), sweep_every);

    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .expect("failed to bind");

    tracing::info!(%port, "gatekeeper listening");
    axum::serve(listener, app).await.expect("server failed");
}
