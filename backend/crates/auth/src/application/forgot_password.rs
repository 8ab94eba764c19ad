//! Forgot Password Use Case
//!
//! Issues a reset token for a registered email. The caller gets the same
//! answer whether or not the email is registered, after the same store
//! work: one lookup. Outside development the token write runs on its own
//! task after the response is decided.

use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::reset_token::ResetTokenIssuer;
use crate::application::{EMAIL_REQUIRED, non_empty};
use crate::domain::repository::{ResetTokenRepository, UserRepository};
use crate::error::{AuthError, AuthResult};

/// Forgot password output
pub struct ForgotPasswordOutput {
    /// Plaintext token, only when `AuthConfig::expose_reset_token` is set
    /// and the email matched an account
    pub token: Option<String>,
}

/// Forgot password use case
pub struct ForgotPasswordUseCase<R>
where
    R: UserRepository + ResetTokenRepository + Send + Sync + 'static,
{
    repo: Arc<R>,
    config: Arc<AuthConfig>,
}

impl<R> ForgotPasswordUseCase<R>
where
    R: UserRepository + ResetTokenRepository + Send + Sync + 'static,
{
    pub fn new(repo: Arc<R>, config: Arc<AuthConfig>) -> Self {
        Self { repo, config }
    }

    pub async fn execute(&self, email: Option<String>) -> AuthResult<ForgotPasswordOutput> {
        let email = non_empty(email).ok_or(AuthError::MissingFields(EMAIL_REQUIRED))?;

        let Some(user) = self.repo.find_by_email(&email).await? else {
            tracing::debug!("Password reset requested for unknown email");
            return Ok(ForgotPasswordOutput { token: None });
        };

        let issuer = ResetTokenIssuer::new(self.repo.clone(), self.config.clone());
        let user_id = user.user_id;

        if !self.config.expose_reset_token {
            tokio::spawn(async move {
                if let Err(e) = issuer.issue(user_id).await {
                    tracing::error!(user_id = %user_id, error = %e, "Failed to issue password reset token");
                }
            });
            return Ok(ForgotPasswordOutput { token: None });
        }

        let token = issuer.issue(user_id).await?;

        // Stand-in for the email that would carry the token
        tracing::debug!(user_id = %user_id, token = %token, "Password reset token (development)");

        Ok(ForgotPasswordOutput { token: Some(token) })
    }
}
