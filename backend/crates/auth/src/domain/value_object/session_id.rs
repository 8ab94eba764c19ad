//! Session ID Value Object
//!
//! Opaque server-side session key. 256 random bits, base64url encoded,
//! so it is safe inside a cookie value and never contains a `.`.

use derive_more::Display;

/// Random bytes behind a session id
const SESSION_ID_BYTES: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Display)]
pub struct SessionId(String);

impl SessionId {
    /// Fresh random session id
    pub fn generate() -> Self {
        Self(platform::crypto::random_token(SESSION_ID_BYTES))
    }

    /// Parse an id presented by a client. Returns `None` unless it has
    /// exactly the shape [`SessionId::generate`] produces.
    pub fn parse(s: &str) -> Option<Self> {
        let bytes = platform::crypto::from_base64url(s).ok()?;
        (bytes.len() == SESSION_ID_BYTES).then(|| Self(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
