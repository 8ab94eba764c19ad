//! API DTOs (Data Transfer Objects)
//!
//! Request fields are `Option` so a missing field is a 400 with a
//! specific message instead of a generic body rejection.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::entity::user::User;

pub const LOGGED_OUT_MESSAGE: &str = "Logged out successfully";
pub const RESET_REQUESTED_MESSAGE: &str = "If the email exists, a password reset link has been sent";
pub const PASSWORD_RESET_MESSAGE: &str = "Password reset successfully";

// ============================================================================
// Requests
// ============================================================================

/// Register / login request
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialsRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Forgot password request
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForgotPasswordRequest {
    pub email: Option<String>,
}

/// Reset password request
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub token: Option<String>,
    pub password: Option<String>,
}

// ============================================================================
// Responses
// ============================================================================

/// Public view of a user. Never carries the password hash.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub id: Uuid,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserDto {
    fn from(user: &User) -> Self {
        Self {
            id: user.user_id.into_uuid(),
            email: user.email.as_str().to_string(),
            created_at: user.created_at,
        }
    }
}

/// `{ "success": true, "user": { ... } }`
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub success: bool,
    pub user: UserDto,
}

impl UserResponse {
    pub fn new(user: &User) -> Self {
        Self {
            success: true,
            user: user.into(),
        }
    }
}

/// `{ "success": true, "message": "..." }`
#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: &'static str,
}

impl MessageResponse {
    pub fn new(message: &'static str) -> Self {
        Self {
            success: true,
            message,
        }
    }
}

/// Forgot password response. `token` only appears in development.
#[derive(Debug, Clone, Serialize)]
pub struct ForgotPasswordResponse {
    pub success: bool,
    pub message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}
