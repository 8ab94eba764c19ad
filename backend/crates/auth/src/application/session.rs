//! Session Authentication
//!
//! Issues and checks the session cookie. The cookie value is
//! `<session_id>.<hmac>` where the HMAC-SHA256 is keyed with
//! `AuthConfig::session_secret`; the session itself lives in a
//! [`SessionStore`].

use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::application::config::AuthConfig;
use crate::domain::entity::session::Session;
use crate::domain::repository::SessionStore;
use crate::domain::value_object::{session_id::SessionId, user_id::UserId};
use crate::error::{AuthError, AuthResult};

type HmacSha256 = Hmac<Sha256>;

/// Binds request cookies to server-side sessions
pub struct SessionAuthenticator<S>
where
    S: SessionStore,
{
    sessions: Arc<S>,
    config: Arc<AuthConfig>,
}

impl<S> SessionAuthenticator<S>
where
    S: SessionStore,
{
    pub fn new(sessions: Arc<S>, config: Arc<AuthConfig>) -> Self {
        Self { sessions, config }
    }

    /// Open a session for `user_id` and return the signed cookie value
    pub async fn establish(&self, user_id: UserId) -> AuthResult<String> {
        let ttl = self
            .config
            .session_ttl()
            .ok_or_else(|| AuthError::Internal("Invalid session TTL".to_string()))?;

        let session_id = SessionId::generate();
        let session = Session::new(user_id, ttl);
        self.sessions.set(&session_id, &session).await?;

        tracing::debug!(user_id = %user_id, "Session established");
        self.sign(&session_id)
    }

    /// Resolve a cookie value to the user it was issued for.
    ///
    /// Absent, tampered and unknown cookies come back as
    /// `AuthenticationRequired`. So do expired ones, since
    /// `SessionStore::get` never returns an expired session.
    pub async fn authenticate(&self, token: Option<&str>) -> AuthResult<UserId> {
        let session_id = token
            .and_then(|t| self.verify(t))
            .ok_or(AuthError::AuthenticationRequired)?;

        let session = self
            .sessions
            .get(&session_id)
            .await?
            .ok_or(AuthError::AuthenticationRequired)?;

        Ok(session.user_id)
    }

    /// Destroy the session behind a cookie value.
    ///
    /// A missing or forged cookie has no session to destroy and succeeds.
    /// Only a store failure is an error.
    pub async fn terminate(&self, token: Option<&str>) -> AuthResult<()> {
        match token.and_then(|t| self.verify(t)) {
            Some(session_id) => self.sessions.destroy(&session_id).await,
            None => Ok(()),
        }
    }

    /// Signed cookie value for a session id
    pub fn sign(&self, session_id: &SessionId) -> AuthResult<String> {
        let mut mac = HmacSha256::new_from_slice(&self.config.session_secret)
            .map_err(|e| AuthError::Internal(format!("Invalid session secret: {e}")))?;
        mac.update(session_id.as_str().as_bytes());
        let signature = mac.finalize().into_bytes();

        Ok(format!("{}.{}", session_id, URL_SAFE_NO_PAD.encode(signature)))
    }

    /// Check the signature and recover the session id
    fn verify(&self, token: &str) -> Option<SessionId> {
        let (session_id, signature_b64) = token.split_once('.')?;
        let signature = URL_SAFE_NO_PAD.decode(signature_b64).ok()?;

        let mut mac = HmacSha256::new_from_slice(&self.config.session_secret).ok()?;
        mac.update(session_id.as_bytes());
        mac.verify_slice(&signature).ok()?;

        SessionId::parse(session_id)
    }
}
