//! Shared error value used across crate boundaries.
//!
//! Value objects report failures as [`AppError`]; the auth layer decides how
//! they surface over HTTP.

use std::borrow::Cow;
use std::error::Error;
use std::fmt;

use super::kind::ErrorKind;

/// An error with a client-safe `message` and an optional `source`.
///
/// The source is kept for logs and never rendered into a response.
///
/// ```rust
/// use kernel::error::{app_error::AppError, kind::ErrorKind};
///
/// let err = AppError::bad_request("Please enter a valid email address");
/// assert_eq!(err.kind(), ErrorKind::BadRequest);
/// assert_eq!(err.status_code(), 400);
/// ```
pub struct AppError {
    kind: ErrorKind,
    message: Cow<'static, str>,
    source: Option<Box<dyn Error + Send + Sync + 'static>>,
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn new(kind: ErrorKind, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Rejected input. The message is shown to the client as-is.
    pub fn bad_request(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::BadRequest, message)
    }

    pub fn internal(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::InternalServerError, message)
    }

    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn status_code(&self) -> u16 {
        self.kind.status_code()
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Debug for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppError")
            .field("kind", &self.kind)
            .field("message", &self.message)
            .field("source", &self.source)
            .finish()
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)
    }
}

impl Error for AppError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn Error + 'static))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bad_request_keeps_message() {
        let err = AppError::bad_request("Please enter a valid email address");
        assert_eq!(err.kind(), ErrorKind::BadRequest);
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.message(), "Please enter a valid email address");
        assert!(err.source().is_none());
    }

    #[test]
    fn test_source_stays_out_of_message() {
        let io_err = std::io::Error::other("connection reset");
        let err = AppError::internal("Internal server error").with_source(io_err);
        assert_eq!(err.status_code(), 500);
        assert_eq!(err.message(), "Internal server error");
        assert_eq!(
            err.source().map(|s| s.to_string()).as_deref(),
            Some("connection reset")
        );
    }

    #[test]
    fn test_display_includes_kind() {
        let err = AppError::new(ErrorKind::Conflict, "Email already registered");
        assert_eq!(err.to_string(), "[Conflict] Email already registered");
    }
}
