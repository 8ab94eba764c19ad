//! Password Hashing and Verification
//!
//! - Argon2id hashing with a per-password random salt and fixed cost
//!   parameters (m=19 MiB, t=2, p=1)
//! - Zeroization of clear text on drop
//! - Verification never errors: malformed digests simply fail to verify
//!
//! Hashing is CPU-bound on purpose. Async callers should run it on a
//! blocking thread (`tokio::task::spawn_blocking`).

use std::fmt;
use std::sync::OnceLock;

use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};
use rand::rngs::OsRng;
use thiserror::Error;
use unicode_normalization::UnicodeNormalization;
use zeroize::{Zeroize, ZeroizeOnDrop};

// ============================================================================
// Constants
// ============================================================================

/// Minimum password length in characters
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Maximum password length in characters
pub const MAX_PASSWORD_LENGTH: usize = 128;

// ============================================================================
// Error Types
// ============================================================================

/// Password policy violation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PasswordPolicyError {
    #[error("Password must be at least {min} characters")]
    TooShort { min: usize, actual: usize },

    #[error("Password must be at most {max} characters")]
    TooLong { max: usize, actual: usize },

    #[error("Password cannot be empty or contain only whitespace")]
    EmptyOrWhitespace,

    #[error("Password contains invalid control characters")]
    InvalidCharacter,
}

/// Argon2 refused to hash (parameter or salt failure)
#[derive(Debug, Error)]
#[error("Password hashing failed: {0}")]
pub struct PasswordHashError(String);

// ============================================================================
// Clear Text Password (Zeroized on drop)
// ============================================================================

/// Clear text password, erased from memory when dropped.
///
/// Not `Clone`, and `Debug` output is redacted.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct ClearTextPassword(String);

impl ClearTextPassword {
    /// Normalize (NFKC) and validate a new password.
    ///
    /// Used when a password is being *set*: registration and reset.
    pub fn new(raw: String) -> Result<Self, PasswordPolicyError> {
        let password = Self::candidate(raw);
        let normalized = password.0.as_str();

        if normalized.trim().is_empty() {
            return Err(PasswordPolicyError::EmptyOrWhitespace);
        }

        // Unicode scalar values, not bytes
        let char_count = normalized.chars().count();

        if char_count < MIN_PASSWORD_LENGTH {
            return Err(PasswordPolicyError::TooShort {
                min: MIN_PASSWORD_LENGTH,
                actual: char_count,
            });
        }

        if char_count > MAX_PASSWORD_LENGTH {
            return Err(PasswordPolicyError::TooLong {
                max: MAX_PASSWORD_LENGTH,
                actual: char_count,
            });
        }

        if normalized
            .chars()
            .any(|ch| ch.is_control() && ch != '\t' && ch != '\n')
        {
            return Err(PasswordPolicyError::InvalidCharacter);
        }

        Ok(password)
    }

    /// Normalize without applying the policy.
    ///
    /// Used for passwords presented at login, so that tightening the policy
    /// never locks out accounts created under an older one.
    pub fn candidate(raw: String) -> Self {
        let mut raw = raw;
        let normalized: String = raw.nfkc().collect();
        raw.zeroize();
        Self(normalized)
    }

    fn peppered(&self, pepper: Option<&[u8]>) -> Vec<u8> {
        let mut bytes = self.0.as_bytes().to_vec();
        if let Some(p) = pepper {
            bytes.extend_from_slice(p);
        }
        bytes
    }

    /// Hash the password using Argon2id
    ///
    /// ## Arguments
    /// * `pepper` - Optional application-wide secret appended before hashing
    pub fn hash(&self, pepper: Option<&[u8]>) -> Result<HashedPassword, PasswordHashError> {
        let mut password_bytes = self.peppered(pepper);

        // 128-bit random salt
        let salt = SaltString::generate(OsRng);

        let result = Argon2::default()
            .hash_password(&password_bytes, &salt)
            .map(|hash| HashedPassword {
                hash: hash.to_string(),
            })
            .map_err(|e| PasswordHashError(e.to_string()));

        password_bytes.zeroize();
        result
    }
}

impl fmt::Debug for ClearTextPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ClearTextPassword")
            .field(&"[REDACTED]")
            .finish()
    }
}

// ============================================================================
// Hashed Password (Safe to store)
// ============================================================================

/// Argon2id hash in PHC string format
/// (`$argon2id$v=19$m=19456,t=2,p=1$<salt>$<hash>`).
#[derive(Clone, PartialEq, Eq)]
pub struct HashedPassword {
    hash: String,
}

impl HashedPassword {
    /// Wrap a stored digest without parsing it.
    ///
    /// A corrupt value is not an error here; it just never verifies.
    pub fn from_stored(s: impl Into<String>) -> Self {
        Self { hash: s.into() }
    }

    /// Get the PHC string for storage
    pub fn as_phc_string(&self) -> &str {
        &self.hash
    }

    /// Verify a password against this hash.
    ///
    /// Returns `false` for a wrong password *and* for a malformed digest.
    /// The digest comparison inside argon2 is constant time.
    pub fn verify(&self, password: &ClearTextPassword, pepper: Option<&[u8]>) -> bool {
        let parsed_hash = match PasswordHash::new(&self.hash) {
            Ok(h) => h,
            Err(_) => return false,
        };

        let mut password_bytes = password.peppered(pepper);
        let ok = Argon2::default()
            .verify_password(&password_bytes, &parsed_hash)
            .is_ok();
        password_bytes.zeroize();
        ok
    }
}

impl fmt::Debug for HashedPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashedPassword")
            .field("hash", &"[HASH]")
            .finish()
    }
}

// ============================================================================
// Timing equalization
// ============================================================================

static DUMMY_HASH: OnceLock<Option<HashedPassword>> = OnceLock::new();

/// Spend the same work as a real verification, against a throwaway hash.
///
/// Call this when there is no stored hash to check (unknown account) so the
/// response time does not reveal whether the account exists. Always `false`.
pub fn verify_dummy(password: &ClearTextPassword, pepper: Option<&[u8]>) -> bool {
    let dummy = DUMMY_HASH.get_or_init(|| {
        ClearTextPassword::candidate(crate::crypto::random_token(24))
            .hash(None)
            .ok()
    });

    if let Some(hash) = dummy {
        let _ = hash.verify(password, pepper);
    }
    false
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_too_short() {
        let result = ClearTextPassword::new("short".to_string());
        assert!(matches!(
            result,
            Err(PasswordPolicyError::TooShort { min: 8, actual: 5 })
        ));
    }

    #[test]
    fn test_password_too_long() {
        let long_password = "a".repeat(MAX_PASSWORD_LENGTH + 1);
        let result = ClearTextPassword::new(long_password);
        assert!(matches!(result, Err(PasswordPolicyError::TooLong { .. })));
    }

    #[test]
    fn test_password_whitespace_only() {
        let result = ClearTextPassword::new("        ".to_string());
        assert!(matches!(
            result,
            Err(PasswordPolicyError::EmptyOrWhitespace)
        ));
        let result = ClearTextPassword::new(String::new());
        assert!(matches!(
            result,
            Err(PasswordPolicyError::EmptyOrWhitespace)
        ));
    }

    #[test]
    fn test_password_control_character() {
        let result = ClearTextPassword::new("abc\u{0007}defgh".to_string());
        assert!(matches!(result, Err(PasswordPolicyError::InvalidCharacter)));
    }

    #[test]
    fn test_simple_passwords_are_accepted() {
        assert!(ClearTextPassword::new("password123".to_string()).is_ok());
        assert!(ClearTextPassword::new("パスワード安全です!".to_string()).is_ok());
    }

    #[test]
    fn test_nfkc_normalization() {
        // Fullwidth "ＡＢＣ" normalizes to "ABC"
        let fullwidth = ClearTextPassword::candidate("ＡＢＣdefgh1".to_string());
        let ascii = ClearTextPassword::candidate("ABCdefgh1".to_string());
        let hashed = ascii.hash(None).unwrap();
        assert!(hashed.verify(&fullwidth, None));
    }

    #[test]
    fn test_hash_and_verify() {
        let password = ClearTextPassword::candidate("TestPassword123!".to_string());
        let hashed = password.hash(None).unwrap();

        assert!(hashed.verify(&password, None));

        let wrong_password = ClearTextPassword::candidate("WrongPassword123!".to_string());
        assert!(!hashed.verify(&wrong_password, None));
    }

    #[test]
    fn test_hash_is_salted() {
        let password = ClearTextPassword::candidate("TestPassword123!".to_string());
        let a = password.hash(None).unwrap();
        let b = password.hash(None).unwrap();
        assert_ne!(a.as_phc_string(), b.as_phc_string());
        assert!(a.as_phc_string().starts_with("$argon2id$"));
    }

    #[test]
    fn test_hash_with_pepper() {
        let password = ClearTextPassword::candidate("TestPassword123!".to_string());
        let pepper = b"my_secret_pepper";
        let hashed = password.hash(Some(pepper)).unwrap();

        assert!(hashed.verify(&password, Some(pepper)));
        assert!(!hashed.verify(&password, None));
        assert!(!hashed.verify(&password, Some(b"wrong_pepper")));
    }

    #[test]
    fn test_stored_digest_verifies() {
        let password = ClearTextPassword::candidate("TestPassword123!".to_string());
        let hashed = password.hash(None).unwrap();

        let restored = HashedPassword::from_stored(hashed.as_phc_string());
        assert!(restored.verify(&password, None));
    }

    #[test]
    fn test_malformed_digest_never_verifies() {
        let password = ClearTextPassword::candidate("TestPassword123!".to_string());
        assert!(!HashedPassword::from_stored("not_a_valid_hash").verify(&password, None));
        assert!(!HashedPassword::from_stored("").verify(&password, None));
    }

    #[test]
    fn test_verify_dummy_is_false() {
        let password = ClearTextPassword::candidate("TestPassword123!".to_string());
        assert!(!verify_dummy(&password, None));
    }

    #[test]
    fn test_debug_redaction() {
        let password = ClearTextPassword::candidate("secret".to_string());
        let debug_output = format!("{:?}", password);
        assert!(debug_output.contains("REDACTED"));
        assert!(!debug_output.contains("secret"));
    }
}
