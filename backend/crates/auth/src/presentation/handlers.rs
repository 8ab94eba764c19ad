//! HTTP Handlers

use axum::Json;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use std::sync::Arc;

use platform::cookie::extract_cookie;

use crate::application::config::AuthConfig;
use crate::application::{
    CurrentUserUseCase, ForgotPasswordUseCase, LoginInput, LoginUseCase, LogoutUseCase,
    RegisterInput, RegisterUseCase, ResetPasswordInput, ResetPasswordUseCase,
};
use crate::domain::repository::{CredentialStore, SessionStore};
use crate::error::AuthResult;
use crate::presentation::dto::{
    CredentialsRequest, ForgotPasswordRequest, ForgotPasswordResponse, LOGGED_OUT_MESSAGE,
    MessageResponse, PASSWORD_RESET_MESSAGE, RESET_REQUESTED_MESSAGE, ResetPasswordRequest,
    UserResponse,
};
use crate::presentation::extract::{ApiJson, AuthenticatedUser};

/// Shared state for auth handlers
#[derive(Clone)]
pub struct AuthAppState<R, S>
where
    R: CredentialStore,
    S: SessionStore + Clone + Send + Sync + 'static,
{
    pub repo: Arc<R>,
    pub sessions: Arc<S>,
    pub config: Arc<AuthConfig>,
}

// ============================================================================
// Register
// ============================================================================

/// POST /api/auth/register
pub async fn register<R, S>(
    State(state): State<AuthAppState<R, S>>,
    ApiJson(req): ApiJson<CredentialsRequest>,
) -> AuthResult<Response>
where
    R: CredentialStore,
    S: SessionStore + Clone + Send + Sync + 'static,
{
    let use_case = RegisterUseCase::new(
        state.repo.clone(),
        state.sessions.clone(),
        state.config.clone(),
    );

    let output = use_case
        .execute(RegisterInput {
            email: req.email,
            password: req.password,
        })
        .await?;

    let cookie = build_session_cookie(&state.config, &output.session_token);

    Ok((
        StatusCode::CREATED,
        [(header::SET_COOKIE, cookie)],
        Json(UserResponse::new(&output.user)),
    )
        .into_response())
}

// ============================================================================
// Login
// ============================================================================

/// POST /api/auth/login
pub async fn login<R, S>(
    State(state): State<AuthAppState<R, S>>,
    ApiJson(req): ApiJson<CredentialsRequest>,
) -> AuthResult<Response>
where
    R: CredentialStore,
    S: SessionStore + Clone + Send + Sync + 'static,
{
    let use_case = LoginUseCase::new(
        state.repo.clone(),
        state.sessions.clone(),
        state.config.clone(),
    );

    let output = use_case
        .execute(LoginInput {
            email: req.email,
            password: req.password,
        })
        .await?;

    let cookie = build_session_cookie(&state.config, &output.session_token);

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(UserResponse::new(&output.user)),
    )
        .into_response())
}

// ============================================================================
// Logout
// ============================================================================

/// POST /api/auth/logout
pub async fn logout<R, S>(
    State(state): State<AuthAppState<R, S>>,
    headers: HeaderMap,
) -> AuthResult<Response>
where
    R: CredentialStore,
    S: SessionStore + Clone + Send + Sync + 'static,
{
    let token = extract_cookie(&headers, &state.config.session_cookie_name);

    LogoutUseCase::new(state.sessions.clone(), state.config.clone())
        .execute(token.as_deref())
        .await?;

    let cookie = build_clear_cookie(&state.config);

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(MessageResponse::new(LOGGED_OUT_MESSAGE)),
    )
        .into_response())
}

// ============================================================================
// Current User
// ============================================================================

/// GET /api/auth/me (behind `require_auth_session`)
pub async fn me<R, S>(
    State(state): State<AuthAppState<R, S>>,
    AuthenticatedUser(user_id): AuthenticatedUser,
) -> AuthResult<Json<UserResponse>>
where
    R: CredentialStore,
    S: SessionStore + Clone + Send + Sync + 'static,
{
    let user = CurrentUserUseCase::new(state.repo.clone())
        .execute(&user_id)
        .await?;

    Ok(Json(UserResponse::new(&user)))
}

// ============================================================================
// Password Reset
// ============================================================================

/// POST /api/auth/forgot-password
pub async fn forgot_password<R, S>(
    State(state): State<AuthAppState<R, S>>,
    ApiJson(req): ApiJson<ForgotPasswordRequest>,
) -> AuthResult<Json<ForgotPasswordResponse>>
where
    R: CredentialStore,
    S: SessionStore + Clone + Send + Sync + 'static,
{
    let output = ForgotPasswordUseCase::new(state.repo.clone(), state.config.clone())
        .execute(req.email)
        .await?;

    Ok(Json(ForgotPasswordResponse {
        success: true,
        message: RESET_REQUESTED_MESSAGE,
        token: output.token,
    }))
}

/// POST /api/auth/reset-password
pub async fn reset_password<R, S>(
    State(state): State<AuthAppState<R, S>>,
    ApiJson(req): ApiJson<ResetPasswordRequest>,
) -> AuthResult<Json<MessageResponse>>
where
    R: CredentialStore,
    S: SessionStore + Clone + Send + Sync + 'static,
{
    ResetPasswordUseCase::new(state.repo.clone(), state.config.clone())
        .execute(ResetPasswordInput {
            token: req.token,
            password: req.password,
        })
        .await?;

    Ok(Json(MessageResponse::new(PASSWORD_RESET_MESSAGE)))
}

// ============================================================================
// Cookies
// ============================================================================

fn build_session_cookie(config: &AuthConfig, token: &str) -> String {
    config.cookie_config().build_set_cookie(token)
}

fn build_clear_cookie(config: &AuthConfig) -> String {
    config.cookie_config().build_delete_cookie()
}
