//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors; request-level errors render through
//! `kernel::error::AppError`.

mod config;

use std::net::SocketAddr;
use std::time::Duration;

use auth::{PgAuthRepository, PgSessionStore, auth_router};
use axum::{
    Json, Router,
    http::{self, Method, header},
    routing::get,
};
use serde_json::{Value, json};
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::ServerConfig;

/// How often expired sessions and reset tokens are purged
const CLEANUP_INTERVAL: Duration = Duration::from_secs(3600);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api=info,auth=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env()?;
    tracing::info!(app_env = ?config.app_env, "Configuration loaded");

    // Database connection
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("../../../database/migrations")
        .run(&pool)
        .await?;

    tracing::info!("Migrations completed");

    let repo = PgAuthRepository::new(pool.clone());
    let sessions = PgSessionStore::new(pool.clone());

    // Errors here should not prevent server startup
    cleanup_expired(&repo, &sessions).await;
    spawn_cleanup_task(repo.clone(), sessions.clone());

    // CORS configuration
    let allowed_origins: Vec<http::HeaderValue> = config
        .frontend_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([header::CONTENT_TYPE, header::ACCEPT]))
        .allow_credentials(true);

    // Build router
    let app = Router::new()
        .route("/health", get(health))
        .nest("/api/auth", auth_router(repo, sessions, config.auth))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        );

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// GET /health
async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn cleanup_expired(repo: &PgAuthRepository, sessions: &PgSessionStore) {
    use auth::domain::repository::{ResetTokenRepository, SessionStore};

    if let Err(e) = SessionStore::cleanup_expired(sessions).await {
        tracing::warn!(error = %e, "Auth session cleanup failed, continuing anyway");
    }

    if let Err(e) = ResetTokenRepository::cleanup_expired(repo).await {
        tracing::warn!(error = %e, "Reset token cleanup failed, continuing anyway");
    }
}

fn spawn_cleanup_task(repo: PgAuthRepository, sessions: PgSessionStore) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(CLEANUP_INTERVAL);
        // First tick completes immediately; startup already cleaned up
        interval.tick().await;

        loop {
            interval.tick().await;
            cleanup_expired(&repo, &sessions).await;
        }
    });
}
