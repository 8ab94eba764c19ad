//! Application Layer
//!
//! Use cases and application services.

pub mod config;
pub mod current_user;
pub mod forgot_password;
pub mod login;
pub mod logout;
pub mod register;
pub mod reset_password;
pub mod reset_token;
pub mod session;

// Re-exports
pub use config::{AppEnv, AuthConfig};
pub use current_user::CurrentUserUseCase;
pub use forgot_password::{ForgotPasswordOutput, ForgotPasswordUseCase};
pub use login::{LoginInput, LoginOutput, LoginUseCase};
pub use logout::LogoutUseCase;
pub use register::{RegisterInput, RegisterOutput, RegisterUseCase};
pub use reset_password::{ResetPasswordInput, ResetPasswordUseCase};
pub use reset_token::ResetTokenIssuer;
pub use session::SessionAuthenticator;

pub(crate) const EMAIL_AND_PASSWORD_REQUIRED: &str = "Email and password are required";
pub(crate) const EMAIL_REQUIRED: &str = "Email is required";
pub(crate) const TOKEN_AND_PASSWORD_REQUIRED: &str = "Token and password are required";

/// Empty strings count as missing
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
