//! Login Use Case
//!
//! Authenticates a user and creates a session.

use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::session::SessionAuthenticator;
use crate::application::{EMAIL_AND_PASSWORD_REQUIRED, non_empty};
use crate::domain::entity::user::User;
use crate::domain::repository::{SessionStore, UserRepository};
use crate::domain::value_object::user_password::{RawPassword, UserPassword};
use crate::error::{AuthError, AuthResult};

/// Login input
pub struct LoginInput {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Login output
pub struct LoginOutput {
    pub user: User,
    /// Signed session cookie value
    pub session_token: String,
}

/// Login use case
pub struct LoginUseCase<U, S>
where
    U: UserRepository,
    S: SessionStore,
{
    user_repo: Arc<U>,
    sessions: Arc<S>,
    config: Arc<AuthConfig>,
}

impl<U, S> LoginUseCase<U, S>
where
    U: UserRepository,
    S: SessionStore,
{
    pub fn new(user_repo: Arc<U>, sessions: Arc<S>, config: Arc<AuthConfig>) -> Self {
        Self {
            user_repo,
            sessions,
            config,
        }
    }

    pub async fn execute(&self, input: LoginInput) -> AuthResult<LoginOutput> {
        let (Some(email), Some(password)) = (non_empty(input.email), non_empty(input.password))
        else {
            return Err(AuthError::MissingFields(EMAIL_AND_PASSWORD_REQUIRED));
        };

        // No format or policy check here: an unknown shape is just an
        // unknown account.
        let raw_password = RawPassword::candidate(password);
        let pepper = self.config.password_pepper.clone();

        let Some(user) = self.user_repo.find_by_email(&email).await? else {
            // Same Argon2 cost as a real check
            UserPassword::verify_dummy(raw_password, pepper).await?;
            return Err(AuthError::InvalidCredentials);
        };

        if !user.password_hash.verify_async(raw_password, pepper).await? {
            tracing::debug!(user_id = %user.user_id, "Password mismatch");
            return Err(AuthError::InvalidCredentials);
        }

        let session_token = SessionAuthenticator::new(self.sessions.clone(), self.config.clone())
            .establish(user.user_id)
            .await?;

        tracing::info!(user_id = %user.user_id, "User logged in");

        Ok(LoginOutput {
            user,
            session_token,
        })
    }
}
