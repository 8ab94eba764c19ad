//! Auth Middleware
//!
//! Middleware for requiring authentication on protected routes.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;

use crate::application::SessionAuthenticator;
use crate::domain::repository::{CredentialStore, SessionStore};
use crate::error::AuthError;
use crate::presentation::extract::AuthenticatedUser;
use crate::presentation::handlers::AuthAppState;

/// Reject the request with 401 unless it carries a live session.
///
/// On success the resolved [`AuthenticatedUser`] is available to the
/// handler as an extractor.
pub async fn require_auth_session<R, S>(
    State(state): State<AuthAppState<R, S>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError>
where
    R: CredentialStore,
    S: SessionStore + Clone + Send + Sync + 'static,
{
    let token = platform::cookie::extract_cookie(req.headers(), &state.config.session_cookie_name);

    let user_id = SessionAuthenticator::new(state.sessions.clone(), state.config.clone())
        .authenticate(token.as_deref())
        .await?;

    req.extensions_mut().insert(AuthenticatedUser(user_id));
    Ok(next.run(req).await)
}
