//! Auth Error Types
//!
//! Auth-specific error variants that render through the unified
//! `kernel::error::AppError` envelope. Server-side failures are logged
//! with their detail and reach the client only as a generic message.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

/// Auth-specific result type alias
pub type AuthResult<T> = Result<T, AuthError>;

/// Client-facing text for every 5xx
const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// Auth-specific error variants
#[derive(Debug, Error)]
pub enum AuthError {
    /// A required request field is absent or empty
    #[error("{0}")]
    MissingFields(&'static str),

    /// Field present but rejected (email format, password policy)
    #[error("{0}")]
    Validation(String),

    /// Request body is not the JSON we expect
    #[error("Malformed request body: {0}")]
    MalformedBody(String),

    /// Reset token unknown, expired, or already used
    #[error("Invalid or expired token")]
    InvalidResetToken,

    /// Email already registered
    #[error("Email already registered")]
    EmailTaken,

    /// Unknown email or wrong password. Deliberately indistinguishable.
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// No valid session
    #[error("Authentication required")]
    AuthenticationRequired,

    /// Session points at an account that no longer exists
    #[error("User not found")]
    UserNotFound,

    /// The session store refused to destroy the session
    #[error("Failed to logout")]
    LogoutFailed,

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.kind().status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::MissingFields(_)
            | AuthError::Validation(_)
            | AuthError::MalformedBody(_)
            | AuthError::InvalidResetToken => ErrorKind::BadRequest,
            AuthError::EmailTaken => ErrorKind::Conflict,
            AuthError::InvalidCredentials | AuthError::AuthenticationRequired => {
                ErrorKind::Unauthorized
            }
            AuthError::UserNotFound => ErrorKind::NotFound,
            AuthError::LogoutFailed | AuthError::Database(_) | AuthError::Internal(_) => {
                ErrorKind::InternalServerError
            }
        }
    }

    /// Message shown to the client
    pub fn client_message(&self) -> String {
        match self {
            AuthError::MalformedBody(_) => "Invalid request body".to_string(),
            AuthError::Database(_) | AuthError::Internal(_) => INTERNAL_ERROR_MESSAGE.to_string(),
            other => other.to_string(),
        }
    }

    /// Convert to AppError
    pub fn to_app_error(&self) -> AppError {
        AppError::new(self.kind(), self.client_message())
    }

    /// Log the error with appropriate level.
    ///
    /// Server errors carry their detail here; the client only ever sees
    /// the generic message.
    fn log(&self) {
        if self.kind().is_server_error() {
            tracing::error!(error = %self, "Auth request failed");
            return;
        }

        match self {
            AuthError::InvalidCredentials => {
                tracing::warn!("Invalid login attempt");
            }
            AuthError::InvalidResetToken => {
                tracing::warn!("Invalid password reset token presented");
            }
            _ => {
                tracing::debug!(error = %self, "Auth error");
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

impl From<AppError> for AuthError {
    /// Value objects report through `AppError`. Client errors keep their
    /// message, anything else becomes internal.
    fn from(err: AppError) -> Self {
        if err.kind() == ErrorKind::BadRequest {
            return AuthError::Validation(err.message().to_string());
        }

        match std::error::Error::source(&err) {
            Some(source) => AuthError::Internal(format!("{err}: {source}")),
            None => AuthError::Internal(err.to_string()),
        }
    }
}

impl From<JsonRejection> for AuthError {
    fn from(rejection: JsonRejection) -> Self {
        AuthError::MalformedBody(rejection.body_text())
    }
}
