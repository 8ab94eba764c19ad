//! Repository Traits
//!
//! Interfaces for data persistence. Implementations live in the
//! infrastructure layer (Postgres for production, in-memory for tests).

use crate::domain::entity::{reset_token::ResetToken, session::Session, user::User};
use crate::domain::value_object::{
    session_id::SessionId, user_id::UserId, user_password::UserPassword,
};
use crate::error::AuthResult;

/// User repository trait
#[trait_variant::make(UserRepository: Send)]
pub trait LocalUserRepository {
    /// Insert a new user.
    ///
    /// Fails with `AuthError::EmailTaken` if the email is already stored,
    /// even when a concurrent registration won the race.
    async fn create(&self, user: &User) -> AuthResult<()>;

    /// Find user by ID
    async fn find_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>>;

    /// Find user by exact (case-sensitive) email
    async fn find_by_email(&self, email: &str) -> AuthResult<Option<User>>;

    /// Check if email exists
    async fn exists_by_email(&self, email: &str) -> AuthResult<bool>;

    /// Overwrite the stored password digest. `UserNotFound` if absent.
    async fn update_password_hash(
        &self,
        user_id: &UserId,
        password_hash: &UserPassword,
    ) -> AuthResult<()>;
}

/// Password reset token repository trait
#[trait_variant::make(ResetTokenRepository: Send)]
pub trait LocalResetTokenRepository {
    /// Drop every token of `token.user_id` and store `token`, as one unit.
    async fn replace_for_user(&self, token: &ResetToken) -> AuthResult<()>;

    /// Find an unexpired token by digest
    async fn find_valid(&self, token_hash: &[u8]) -> AuthResult<Option<ResetToken>>;

    /// Atomically consume the token and set the owner's password.
    ///
    /// Returns `None` if the token was missing, expired, or already
    /// consumed by a concurrent request. On `None` nothing is written.
    async fn redeem(
        &self,
        token_hash: &[u8],
        new_password: &UserPassword,
    ) -> AuthResult<Option<UserId>>;

    /// Delete all tokens for a user
    async fn delete_for_user(&self, user_id: &UserId) -> AuthResult<u64>;

    /// Clean up expired tokens
    async fn cleanup_expired(&self) -> AuthResult<u64>;
}

/// Server-side session store
#[trait_variant::make(SessionStore: Send)]
pub trait LocalSessionStore {
    /// Load a live session. Expired records read as `None`.
    async fn get(&self, session_id: &SessionId) -> AuthResult<Option<Session>>;

    /// Insert or overwrite
    async fn set(&self, session_id: &SessionId, session: &Session) -> AuthResult<()>;

    /// Remove a session. Removing an unknown id is not an error.
    async fn destroy(&self, session_id: &SessionId) -> AuthResult<()>;

    /// Clean up expired sessions
    async fn cleanup_expired(&self) -> AuthResult<u64>;
}

/// Everything the credential flows need from persistence
pub trait CredentialStore:
    UserRepository + ResetTokenRepository + Clone + Send + Sync + 'static
{
}

impl<T> CredentialStore for T where
    T: UserRepository + ResetTokenRepository + Clone + Send + Sync + 'static
{
}
