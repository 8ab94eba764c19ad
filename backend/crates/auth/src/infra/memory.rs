//! In-Memory Repository Implementations
//!
//! Same contracts as the Postgres implementations, backed by mutex-guarded
//! maps. Used by tests and for running the service without a database.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;

use crate::domain::entity::{reset_token::ResetToken, session::Session, user::User};
use crate::domain::repository::{ResetTokenRepository, SessionStore, UserRepository};
use crate::domain::value_object::{
    session_id::SessionId, user_id::UserId, user_password::UserPassword,
};
use crate::error::{AuthError, AuthResult};

fn lock<T>(mutex: &Mutex<T>) -> AuthResult<MutexGuard<'_, T>> {
    mutex
        .lock()
        .map_err(|_| AuthError::Internal("In-memory store lock poisoned".to_string()))
}

#[derive(Default)]
struct CredentialState {
    users: HashMap<UserId, User>,
    /// Keyed by owner: at most one token per user
    reset_tokens: HashMap<UserId, ResetToken>,
}

/// In-memory credential store (users and reset tokens)
#[derive(Clone, Default)]
pub struct MemoryAuthRepository {
    state: Arc<Mutex<CredentialState>>,
}

impl MemoryAuthRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored reset tokens
    pub fn reset_token_count(&self) -> usize {
        self.state.lock().map(|s| s.reset_tokens.len()).unwrap_or(0)
    }
}

impl UserRepository for MemoryAuthRepository {
    async fn create(&self, user: &User) -> AuthResult<()> {
        let mut state = lock(&self.state)?;

        if state.users.values().any(|u| u.email == user.email) {
            return Err(AuthError::EmailTaken);
        }

        state.users.insert(user.user_id, user.clone());
        Ok(())
    }

    async fn find_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>> {
        Ok(lock(&self.state)?.users.get(user_id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> AuthResult<Option<User>> {
        Ok(lock(&self.state)?
            .users
            .values()
            .find(|u| u.email.as_str() == email)
            .cloned())
    }

    async fn exists_by_email(&self, email: &str) -> AuthResult<bool> {
        Ok(lock(&self.state)?
            .users
            .values()
            .any(|u| u.email.as_str() == email))
    }

    async fn update_password_hash(
        &self,
        user_id: &UserId,
        password_hash: &UserPassword,
    ) -> AuthResult<()> {
        lock(&self.state)?
            .users
            .get_mut(user_id)
            .ok_or(AuthError::UserNotFound)?
            .set_password(password_hash.clone());
        Ok(())
    }
}

impl ResetTokenRepository for MemoryAuthRepository {
    async fn replace_for_user(&self, token: &ResetToken) -> AuthResult<()> {
        lock(&self.state)?
            .reset_tokens
            .insert(token.user_id, token.clone());
        Ok(())
    }

    async fn find_valid(&self, token_hash: &[u8]) -> AuthResult<Option<ResetToken>> {
        let now = Utc::now();
        Ok(lock(&self.state)?
            .reset_tokens
            .values()
            .find(|t| t.token_hash == token_hash && !t.is_expired_at(now))
            .cloned())
    }

    async fn redeem(
        &self,
        token_hash: &[u8],
        new_password: &UserPassword,
    ) -> AuthResult<Option<UserId>> {
        let now = Utc::now();
        let mut state = lock(&self.state)?;

        let Some(user_id) = state
            .reset_tokens
            .values()
            .find(|t| t.token_hash == token_hash && !t.is_expired_at(now))
            .map(|t| t.user_id)
        else {
            return Ok(None);
        };

        let Some(user) = state.users.get_mut(&user_id) else {
            return Ok(None);
        };
        user.set_password(new_password.clone());

        state.reset_tokens.remove(&user_id);
        Ok(Some(user_id))
    }

    async fn delete_for_user(&self, user_id: &UserId) -> AuthResult<u64> {
        let removed = lock(&self.state)?.reset_tokens.remove(user_id);
        Ok(u64::from(removed.is_some()))
    }

    async fn cleanup_expired(&self) -> AuthResult<u64> {
        let now = Utc::now();
        let mut state = lock(&self.state)?;
        let before = state.reset_tokens.len();
        state.reset_tokens.retain(|_, t| !t.is_expired_at(now));
        Ok((before - state.reset_tokens.len()) as u64)
    }
}

/// In-memory session store
#[derive(Clone, Default)]
pub struct MemorySessionStore {
    sessions: Arc<Mutex<HashMap<SessionId, Session>>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored sessions, expired ones included
    pub fn len(&self) -> usize {
        self.sessions.lock().map(|s| s.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SessionStore for MemorySessionStore {
    async fn get(&self, session_id: &SessionId) -> AuthResult<Option<Session>> {
        Ok(lock(&self.sessions)?
            .get(session_id)
            .filter(|s| !s.is_expired())
            .cloned())
    }

    async fn set(&self, session_id: &SessionId, session: &Session) -> AuthResult<()> {
        lock(&self.sessions)?.insert(session_id.clone(), session.clone());
        Ok(())
    }

    async fn destroy(&self, session_id: &SessionId) -> AuthResult<()> {
        lock(&self.sessions)?.remove(session_id);
        Ok(())
    }

    async fn cleanup_expired(&self) -> AuthResult<u64> {
        let mut sessions = lock(&self.sessions)?;
        let before = sessions.len();
        sessions.retain(|_, s| !s.is_expired());
        Ok((before - sessions.len()) as u64)
    }
}
