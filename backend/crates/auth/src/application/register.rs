//! Register Use Case
//!
//! Creates an account and signs it in.

use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::session::SessionAuthenticator;
use crate::application::{EMAIL_AND_PASSWORD_REQUIRED, non_empty};
use crate::domain::entity::user::User;
use crate::domain::repository::{SessionStore, UserRepository};
use crate::domain::value_object::{
    email::Email,
    user_password::{RawPassword, UserPassword},
};
use crate::error::{AuthError, AuthResult};

/// Register input. Fields are optional so that absence is reported
/// as a 400 rather than a body rejection.
pub struct RegisterInput {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Register output
pub struct RegisterOutput {
    pub user: User,
    /// Signed session cookie value
    pub session_token: String,
}

/// Register use case
pub struct RegisterUseCase<U, S>
where
    U: UserRepository,
    S: SessionStore,
{
    user_repo: Arc<U>,
    sessions: Arc<S>,
    config: Arc<AuthConfig>,
}

impl<U, S> RegisterUseCase<U, S>
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

    pub async fn execute(&self, input: RegisterInput) -> AuthResult<RegisterOutput> {
        let (Some(email), Some(password)) = (non_empty(input.email), non_empty(input.password))
        else {
            return Err(AuthError::MissingFields(EMAIL_AND_PASSWORD_REQUIRED));
        };

        let email = Email::new(email)?;
        let raw_password = RawPassword::new(password)?;

        // Cheap pre-check; the unique constraint is still the authority
        if self.user_repo.exists_by_email(email.as_str()).await? {
            return Err(AuthError::EmailTaken);
        }

        let password_hash =
            UserPassword::hash(raw_password, self.config.password_pepper.clone()).await?;

        let user = User::new(email, password_hash);
        self.user_repo.create(&user).await?;

        let session_token = SessionAuthenticator::new(self.sessions.clone(), self.config.clone())
            .establish(user.user_id)
            .await?;

        tracing::info!(user_id = %user.user_id, "User registered");

        Ok(RegisterOutput {
            user,
            session_token,
        })
    }
}
