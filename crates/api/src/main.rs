//! Layerworks API server binary.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use layerworks_api::config::AppConfig;
use layerworks_api::db::Database;
use layerworks_api::jwt::TokenIssuer;
use layerworks_api::notify::{Mailer, NotificationQueue, NullMailer, SmtpMailer};
use layerworks_api::state::AppState;
use layerworks_api::{build_router, sweeper};

#[tokio::main]
async fn main() {
    // Load configuration from environment
    let config = AppConfig::from_env().expect("Failed to load configuration");

    // Initialize tracing with EnvFilter
    // Defaults to info level for our crate if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "layerworks_api=info,tower_http=debug".into());

    // Use JSON format when LOG_FORMAT=json for structured log parsing
    let is_json = std::env::var("LOG_FORMAT").is_ok_and(|v| v == "json");
    let json_layer = is_json.then(|| tracing_subscriber::fmt::layer().json().flatten_event(true));
    let text_layer = (!is_json).then(tracing_subscriber::fmt::layer);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .init();

    let db = Database::new();
    let tokens = TokenIssuer::new(&config.jwt_secret);

    let mailer: Arc<dyn Mailer> = match config.email() {
        Some(email) => {
            let smtp = SmtpMailer::new(email).expect("Failed to build SMTP transport");
            tracing::info!(host = %email.smtp_host, "SMTP mailer configured");
            Arc::new(smtp)
        }
        None => {
            tracing::info!("SMTP not configured, notifications will be logged only");
            Arc::new(NullMailer)
        }
    };
    let notifications = NotificationQueue::spawn(mailer);

    sweeper::spawn_sweepers(db.clone());

    let state = AppState::new(config.clone(), db, tokens, notifications);
    let app = build_router(state);

    let addr = config.socket_addr();
    tracing::info!("api listening on http://{}", addr);

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
