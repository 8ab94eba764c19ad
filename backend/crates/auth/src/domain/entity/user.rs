//! User Entity

use chrono::{DateTime, Utc};

use crate::domain::value_object::{email::Email, user_id::UserId, user_password::UserPassword};

/// A registered account.
#[derive(Debug, Clone)]
pub struct User {
    /// Internal UUID identifier
    pub user_id: UserId,
    /// Login identity, stored exactly as registered
    pub email: Email,
    /// Argon2id digest. Never serialized to clients.
    pub password_hash: UserPassword,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new user
    pub fn new(email: Email, password_hash: UserPassword) -> Self {
        let now = Utc::now();

        Self {
            user_id: UserId::new(),
            email,
            password_hash,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace the stored digest
    pub fn set_password(&mut self, password_hash: UserPassword) {
        self.password_hash = password_hash;
        self.updated_at = Utc::now();
    }
}
