//! Reset Password Use Case
//!
//! Redeems a reset token for a new password.

use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::reset_token::ResetTokenIssuer;
use crate::application::{TOKEN_AND_PASSWORD_REQUIRED, non_empty};
use crate::domain::repository::ResetTokenRepository;
use crate::domain::value_object::user_password::RawPassword;
use crate::error::{AuthError, AuthResult};

/// Reset password input
pub struct ResetPasswordInput {
    pub token: Option<String>,
    pub password: Option<String>,
}

/// Reset password use case
pub struct ResetPasswordUseCase<T>
where
    T: ResetTokenRepository,
{
    token_repo: Arc<T>,
    config: Arc<AuthConfig>,
}

impl<T> ResetPasswordUseCase<T>
where
    T: ResetTokenRepository,
{
    pub fn new(token_repo: Arc<T>, config: Arc<AuthConfig>) -> Self {
        Self { token_repo, config }
    }

    /// Existing sessions are left alone.
    pub async fn execute(&self, input: ResetPasswordInput) -> AuthResult<()> {
        let (Some(token), Some(password)) = (non_empty(input.token), non_empty(input.password))
        else {
            return Err(AuthError::MissingFields(TOKEN_AND_PASSWORD_REQUIRED));
        };

        let raw_password = RawPassword::new(password)?;

        ResetTokenIssuer::new(self.token_repo.clone(), self.config.clone())
            .redeem(&token, raw_password)
            .await?;

        Ok(())
    }
}
