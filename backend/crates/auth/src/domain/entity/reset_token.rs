//! Password Reset Token Entity
//!
//! The plaintext token only exists in the issuing response. Storage keeps
//! its SHA-256 digest, so a leaked table cannot be replayed.

use chrono::{DateTime, Duration, Utc};

use crate::domain::value_object::user_id::{ResetTokenId, UserId};

/// 256 bits of entropy per token
const RESET_TOKEN_BYTES: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResetToken {
    pub id: ResetTokenId,
    pub user_id: UserId,
    /// SHA-256 of the plaintext token
    pub token_hash: Vec<u8>,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl ResetToken {
    /// Mint a token for `user_id`.
    ///
    /// Returns the record to persist and the plaintext to hand out.
    pub fn issue(user_id: UserId, ttl: Duration) -> (Self, String) {
        let plaintext = platform::crypto::random_token(RESET_TOKEN_BYTES);
        let now = Utc::now();

        let token = Self {
            id: ResetTokenId::new(),
            user_id,
            token_hash: Self::hash_token(&plaintext),
            expires_at: now + ttl,
            created_at: now,
        };

        (token, plaintext)
    }

    /// Digest used as the lookup key
    pub fn hash_token(plaintext: &str) -> Vec<u8> {
        platform::crypto::sha256(plaintext.as_bytes()).to_vec()
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}
