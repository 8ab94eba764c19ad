//! Logout Use Case
//!
//! Invalidates the caller's session.

use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::session::SessionAuthenticator;
use crate::domain::repository::SessionStore;
use crate::error::{AuthError, AuthResult};

/// Logout use case
pub struct LogoutUseCase<S>
where
    S: SessionStore,
{
    sessions: Arc<S>,
    config: Arc<AuthConfig>,
}

impl<S> LogoutUseCase<S>
where
    S: SessionStore,
{
    pub fn new(sessions: Arc<S>, config: Arc<AuthConfig>) -> Self {
        Self { sessions, config }
    }

    /// Destroy the session behind `session_token`, if any.
    ///
    /// Succeeds without a session. Fails only when the store does.
    pub async fn execute(&self, session_token: Option<&str>) -> AuthResult<()> {
        SessionAuthenticator::new(self.sessions.clone(), self.config.clone())
            .terminate(session_token)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to destroy session");
                AuthError::LogoutFailed
            })?;

        tracing::info!("User logged out");
        Ok(())
    }
}
