//! Email Value Object
//!
//! Represents a syntactically valid email address.
//! The address is kept exactly as the user typed it: lookups are
//! case-sensitive against the stored value.

use kernel::error::app_error::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Maximum email length (per RFC 5321)
const EMAIL_MAX_LENGTH: usize = 254;

/// Email address value object
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Email(String);

impl Email {
    /// Create a new email with validation
    pub fn new(email: impl Into<String>) -> AppResult<Self> {
        let email = email.into();

        if email.len() > EMAIL_MAX_LENGTH || !Self::is_valid_format(&email) {
            return Err(AppError::bad_request("Please enter a valid email address"));
        }

        Ok(Self(email))
    }

    /// `local@domain.tld` with no whitespace and exactly one `@`
    fn is_valid_format(email: &str) -> bool {
        if email.chars().any(char::is_whitespace) {
            return false;
        }

        let Some((local, domain)) = email.split_once('@') else {
            return false;
        };

        if local.is_empty() || local.len() > 64 || domain.contains('@') {
            return false;
        }

        // Domain needs a dot with something on both sides
        match domain.rsplit_once('.') {
            Some((name, tld)) => !name.is_empty() && !tld.is_empty(),
            None => false,
        }
    }

    /// Create from database value (assumed already validated)
    pub fn from_db(email: impl Into<String>) -> Self {
        Self(email.into())
    }

    /// Get the email as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Email {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
