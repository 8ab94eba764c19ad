//! User Password Value Object
//!
//! Delegates to `platform::password` for the cryptography. Hashing and
//! verification are CPU-bound, so the async variants here move the work
//! onto tokio's blocking pool instead of stalling the request executor.

use kernel::error::app_error::{AppError, AppResult};
use platform::password::{ClearTextPassword, HashedPassword, PasswordPolicyError};
use std::fmt;

// ============================================================================
// Raw Password (User Input)
// ============================================================================

/// Raw password from user input. Zeroized on drop.
pub struct RawPassword(ClearTextPassword);

impl RawPassword {
    /// Validate a password that is about to be stored (register, reset).
    pub fn new(raw: String) -> AppResult<Self> {
        let clear_text = ClearTextPassword::new(raw).map_err(|e| match e {
            PasswordPolicyError::EmptyOrWhitespace => {
                AppError::bad_request("Password cannot be empty")
            }
            PasswordPolicyError::InvalidCharacter => {
                AppError::bad_request("Password contains invalid characters")
            }
            // TooShort / TooLong carry their own user-facing text
            other => AppError::bad_request(other.to_string()),
        })?;

        Ok(Self(clear_text))
    }

    /// Wrap a password presented at login. No policy is applied.
    pub fn candidate(raw: String) -> Self {
        Self(ClearTextPassword::candidate(raw))
    }
}

impl fmt::Debug for RawPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RawPassword").field(&"[REDACTED]").finish()
    }
}

// ============================================================================
// User Password (Hashed, for storage)
// ============================================================================

/// Stored password digest (Argon2id PHC string)
#[derive(Clone, PartialEq, Eq)]
pub struct UserPassword(HashedPassword);

impl UserPassword {
    /// Hash synchronously. Prefer [`UserPassword::hash`] from async code.
    pub fn from_raw(raw: &RawPassword, pepper: Option<&[u8]>) -> AppResult<Self> {
        let hashed = raw
            .0
            .hash(pepper)
            .map_err(|e| AppError::internal("Password hashing failed").with_source(e))?;

        Ok(Self(hashed))
    }

    /// Hash on the blocking pool
    pub async fn hash(raw: RawPassword, pepper: Option<Vec<u8>>) -> AppResult<Self> {
        tokio::task::spawn_blocking(move || Self::from_raw(&raw, pepper.as_deref()))
            .await
            .map_err(|e| AppError::internal("Hashing task failed").with_source(e))?
    }

    /// Verify on the blocking pool
    pub async fn verify_async(&self, raw: RawPassword, pepper: Option<Vec<u8>>) -> AppResult<bool> {
        let hashed = self.clone();
        tokio::task::spawn_blocking(move || hashed.verify(&raw, pepper.as_deref()))
            .await
            .map_err(|e| AppError::internal("Verification task failed").with_source(e))
    }

    /// Burn one verification worth of work for an account that does not
    /// exist. Always resolves to `false`.
    pub async fn verify_dummy(raw: RawPassword, pepper: Option<Vec<u8>>) -> AppResult<bool> {
        tokio::task::spawn_blocking(move || {
            platform::password::verify_dummy(&raw.0, pepper.as_deref())
        })
        .await
        .map_err(|e| AppError::internal("Verification task failed").with_source(e))
    }

    /// Wrap a digest read back from the database.
    ///
    /// Not parsed here: a corrupt digest fails verification instead of
    /// failing the whole lookup.
    pub fn from_db(phc_string: impl Into<String>) -> Self {
        Self(HashedPassword::from_stored(phc_string))
    }

    /// Get PHC string for database storage
    pub fn as_phc_string(&self) -> &str {
        self.0.as_phc_string()
    }

    /// Verify a raw password against this hash (constant time)
    pub fn verify(&self, raw: &RawPassword, pepper: Option<&[u8]>) -> bool {
        self.0.verify(&raw.0, pepper)
    }
}

impl fmt::Debug for UserPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserPassword")
            .field("hash", &"[HASH]")
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use platform::password::{MAX_PASSWORD_LENGTH, MIN_PASSWORD_LENGTH};

    #[test]
    fn test_raw_password_validation() {
        assert!(RawPassword::new("password123".to_string()).is_ok());

        let short_pass = "a".repeat(MIN_PASSWORD_LENGTH - 1);
        let err = RawPassword::new(short_pass).unwrap_err();
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.message(), "Password must be at least 8 characters");

        let long_pass = "a".repeat(MAX_PASSWORD_LENGTH + 1);
        assert!(RawPassword::new(long_pass).is_err());

        assert!(RawPassword::new("".to_string()).is_err());
    }

    #[test]
    fn test_candidate_skips_policy() {
        let raw = RawPassword::candidate("short".to_string());
        let hashed = UserPassword::from_raw(&raw, None).unwrap();
        assert!(hashed.verify(&RawPassword::candidate("short".to_string()), None));
    }

    #[tokio::test]
    async fn test_async_hash_and_verify() {
        let hashed = UserPassword::hash(RawPassword::new("TestPassword123!".to_string()).unwrap(), None)
            .await
            .unwrap();

        let ok = hashed
            .verify_async(RawPassword::candidate("TestPassword123!".to_string()), None)
            .await
            .unwrap();
        assert!(ok);

        let wrong = hashed
            .verify_async(RawPassword::candidate("WrongPassword123!".to_string()), None)
            .await
            .unwrap();
        assert!(!wrong);
    }

    #[tokio::test]
    async fn test_verify_dummy_is_false() {
        let result = UserPassword::verify_dummy(RawPassword::candidate("anything".to_string()), None)
            .await
            .unwrap();
        assert!(!result);
    }

    #[test]
    fn test_corrupt_digest_from_db() {
        let stored = UserPassword::from_db("garbage");
        assert!(!stored.verify(&RawPassword::candidate("password123".to_string()), None));
    }

    #[test]
    fn test_debug_redaction() {
        let raw = RawPassword::new("SecretPassword123!".to_string()).unwrap();
        let debug = format!("{:?}", raw);
        assert!(debug.contains("REDACTED"));
        assert!(!debug.contains("Secret"));

        let hashed = UserPassword::from_raw(&raw, None).unwrap();
        let debug = format!("{:?}", hashed);
        assert!(debug.contains("HASH"));
    }
}
