//! Password Reset Token Lifecycle
//!
//! At most one live token per user: issuing replaces, redeeming consumes.

use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::domain::entity::reset_token::ResetToken;
use crate::domain::repository::ResetTokenRepository;
use crate::domain::value_object::{
    user_id::UserId,
    user_password::{RawPassword, UserPassword},
};
use crate::error::{AuthError, AuthResult};

pub struct ResetTokenIssuer<T>
where
    T: ResetTokenRepository,
{
    token_repo: Arc<T>,
    config: Arc<AuthConfig>,
}

impl<T> ResetTokenIssuer<T>
where
    T: ResetTokenRepository,
{
    pub fn new(token_repo: Arc<T>, config: Arc<AuthConfig>) -> Self {
        Self { token_repo, config }
    }

    /// Mint a token for `user_id`, invalidating any earlier one.
    ///
    /// Returns the plaintext. Only its digest is stored.
    pub async fn issue(&self, user_id: UserId) -> AuthResult<String> {
        let ttl = self
            .config
            .reset_token_ttl()
            .ok_or_else(|| AuthError::Internal("Invalid reset token TTL".to_string()))?;

        let (token, plaintext) = ResetToken::issue(user_id, ttl);
        self.token_repo.replace_for_user(&token).await?;

        tracing::info!(
            user_id = %user_id,
            expires_at = %token.expires_at,
            "Password reset token issued"
        );

        Ok(plaintext)
    }

    /// Consume `token` and set the owner's password to `new_password`.
    ///
    /// The token is checked before hashing so a bad token costs no
    /// Argon2 work. The final consume is atomic, so when two requests
    /// race on the same token exactly one wins.
    pub async fn redeem(&self, token: &str, new_password: RawPassword) -> AuthResult<UserId> {
        let token_hash = ResetToken::hash_token(token);

        match self.token_repo.find_valid(&token_hash).await? {
            Some(stored) if !stored.is_expired() => {}
            _ => return Err(AuthError::InvalidResetToken),
        }

        let password_hash =
            UserPassword::hash(new_password, self.config.password_pepper.clone()).await?;

        let user_id = self
            .token_repo
            .redeem(&token_hash, &password_hash)
            .await?
            .ok_or(AuthError::InvalidResetToken)?;

        tracing::info!(user_id = %user_id, "Password reset completed");
        Ok(user_id)
    }
}
