//! Auth Router

use axum::{
    Router, middleware,
    routing::{get, post},
};
use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::domain::repository::{CredentialStore, SessionStore};
use crate::infra::postgres::{PgAuthRepository, PgSessionStore};
use crate::presentation::handlers::{self, AuthAppState};
use crate::presentation::middleware::require_auth_session;

/// Create the Auth router backed by PostgreSQL
pub fn auth_router(repo: PgAuthRepository, sessions: PgSessionStore, config: AuthConfig) -> Router {
    auth_router_generic(repo, sessions, config)
}

/// Create a generic Auth router for any repository implementation
pub fn auth_router_generic<R, S>(repo: R, sessions: S, config: AuthConfig) -> Router
where
    R: CredentialStore,
    S: SessionStore + Clone + Send + Sync + 'static,
{
    let state = AuthAppState {
        repo: Arc::new(repo),
        sessions: Arc::new(sessions),
        config: Arc::new(config),
    };

    Router::new()
        .route("/register", post(handlers::register::<R, S>))
        .route("/login", post(handlers::login::<R, S>))
        .route("/logout", post(handlers::logout::<R, S>))
        .route(
            "/me",
            get(handlers::me::<R, S>).route_layer(middleware::from_fn_with_state(
                state.clone(),
                require_auth_session::<R, S>,
            )),
        )
        .route("/forgot-password", post(handlers::forgot_password::<R, S>))
        .route("/reset-password", post(handlers::reset_password::<R, S>))
        .with_state(state)
}
