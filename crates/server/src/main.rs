//! Bazaar API server binary.
//!
//! Serves the commerce API on the configured address (default
//! `127.0.0.1:8008`).
//!
//! # Architecture
//!
//! - Axum HTTP API under `/api` with a JSON response envelope
//! - `PostgreSQL` via sqlx for persistence
//! - JWT bearer credentials checked by a per-operation authorization gate
//!
//! Migrations are NOT run automatically on startup. Run them explicitly
//! via: `cargo run -p bazaar-cli -- migrate`

use bazaar_server::config::AppConfig;
use bazaar_server::state::AppState;
use bazaar_server::{db, routes};

#[tokio::main]
async fn main() {
    let config = AppConfig::from_env().expect("Failed to load configuration");

    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "bazaar_server=info,tower_http=debug".into());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool = db::create_pool(&config.database_url)
        .await
        .expect("Failed to create database pool");
    tracing::info!("Database pool created");

    let state = AppState::postgres(&config, pool);
    let app = routes::app(state);

    let addr = config.socket_addr();
    tracing::info!("bazaar-server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
