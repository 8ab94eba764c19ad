//! Session Entity
//!
//! Server-side session record, keyed by [`SessionId`] in the session store.
//!
//! [`SessionId`]: crate::domain::value_object::session_id::SessionId

use chrono::{DateTime, Duration, Utc};

use crate::domain::value_object::user_id::UserId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Account this session is bound to
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
    /// Absolute expiry (no sliding renewal)
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Create a new session
    pub fn new(user_id: UserId, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            user_id,
            created_at: now,
            expires_at: now + ttl,
        }
    }

    /// Check if session is expired
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}
