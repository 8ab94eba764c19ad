//! End-to-end flows through the router with in-memory stores

use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use chrono::Duration;
use serde_json::{Value, json};
use tower::ServiceExt;

use crate::application::{AuthConfig, ForgotPasswordUseCase, LogoutUseCase, SessionAuthenticator};
use crate::domain::entity::reset_token::ResetToken;
use crate::domain::entity::session::Session;
use crate::domain::repository::{ResetTokenRepository, SessionStore, UserRepository};
use crate::domain::value_object::{session_id::SessionId, user_id::UserId};
use crate::error::{AuthError, AuthResult};
use crate::infra::memory::{MemoryAuthRepository, MemorySessionStore};
use crate::presentation::router::auth_router_generic;

// ============================================================================
// Harness
// ============================================================================

struct Harness {
    router: Router,
    repo: MemoryAuthRepository,
    sessions: MemorySessionStore,
}

fn harness_with(config: AuthConfig) -> Harness {
    let repo = MemoryAuthRepository::new();
    let sessions = MemorySessionStore::new();
    let router = auth_router_generic(repo.clone(), sessions.clone(), config);
    Harness {
        router,
        repo,
        sessions,
    }
}

fn harness() -> Harness {
    harness_with(AuthConfig::development())
}

struct Reply {
    status: StatusCode,
    set_cookie: Option<String>,
    body: Value,
}

impl Reply {
    /// `name=value` part of Set-Cookie, ready for a Cookie header
    fn cookie_pair(&self) -> String {
        let set_cookie = self.set_cookie.as_deref().expect("no Set-Cookie header");
        set_cookie.split(';').next().unwrap().to_string()
    }
}

async fn send(router: &Router, method: &str, uri: &str, cookie: Option<&str>, body: Option<Value>) -> Reply {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .map(|v| v.to_str().unwrap().to_string());
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    Reply {
        status,
        set_cookie,
        body,
    }
}

async fn post(router: &Router, uri: &str, body: Value) -> Reply {
    send(router, "POST", uri, None, Some(body)).await
}

async fn register(router: &Router, email: &str, password: &str) -> Reply {
    post(router, "/register", json!({ "email": email, "password": password })).await
}

async fn login(router: &Router, email: &str, password: &str) -> Reply {
    post(router, "/login", json!({ "email": email, "password": password })).await
}

async fn me(router: &Router, cookie: Option<&str>) -> Reply {
    send(router, "GET", "/me", cookie, None).await
}

fn assert_error(reply: &Reply, status: StatusCode, message: &str) {
    assert_eq!(reply.status, status);
    assert_eq!(reply.body, json!({ "success": false, "error": message }));
}

// ============================================================================
// Register
// ============================================================================

#[tokio::test]
async fn test_register_creates_user_and_session() {
    let h = harness();
    let reply = register(&h.router, "alice@example.com", "password123").await;

    assert_eq!(reply.status, StatusCode::CREATED);
    assert_eq!(reply.body["success"], true);
    assert_eq!(reply.body["user"]["email"], "alice@example.com");
    assert!(reply.body["user"]["id"].is_string());
    assert!(reply.body["user"]["createdAt"].is_string());
    assert!(reply.body["user"].get("password").is_none());
    assert!(reply.body["user"].get("passwordHash").is_none());

    let set_cookie = reply.set_cookie.clone().unwrap();
    assert!(set_cookie.starts_with("auth_session="));
    assert!(set_cookie.contains("HttpOnly"));
    assert!(set_cookie.contains("SameSite=Lax"));
    assert!(set_cookie.contains("Max-Age=604800"));
    assert_eq!(h.sessions.len(), 1);

    let stored = h.repo.find_by_email("alice@example.com").await.unwrap().unwrap();
    assert!(stored.password_hash.as_phc_string().starts_with("$argon2id$"));

    // The new session is already authenticated
    let whoami = me(&h.router, Some(reply.cookie_pair().as_str())).await;
    assert_eq!(whoami.status, StatusCode::OK);
    assert_eq!(whoami.body["user"]["email"], "alice@example.com");
}

#[tokio::test]
async fn test_register_missing_fields() {
    let h = harness();
    let expected = "Email and password are required";

    let reply = post(&h.router, "/register", json!({ "email": "alice@example.com" })).await;
    assert_error(&reply, StatusCode::BAD_REQUEST, expected);

    let reply = post(&h.router, "/register", json!({ "password": "password123" })).await;
    assert_error(&reply, StatusCode::BAD_REQUEST, expected);

    let reply = register(&h.router, "", "password123").await;
    assert_error(&reply, StatusCode::BAD_REQUEST, expected);

    assert_eq!(h.sessions.len(), 0);
}

#[tokio::test]
async fn test_register_rejects_bad_input() {
    let h = harness();

    let reply = register(&h.router, "not-an-email", "password123").await;
    assert_error(&reply, StatusCode::BAD_REQUEST, "Please enter a valid email address");

    let reply = register(&h.router, "alice@example.com", "short").await;
    assert_error(&reply, StatusCode::BAD_REQUEST, "Password must be at least 8 characters");

    assert!(h.repo.find_by_email("alice@example.com").await.unwrap().is_none());
}

#[tokio::test]
async fn test_register_duplicate_email() {
    let h = harness();
    register(&h.router, "alice@example.com", "password123").await;

    let reply = register(&h.router, "alice@example.com", "otherpassword").await;
    assert_error(&reply, StatusCode::CONFLICT, "Email already registered");
    assert!(reply.set_cookie.is_none());

    // Emails are matched exactly
    let reply = register(&h.router, "Alice@example.com", "password123").await;
    assert_eq!(reply.status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_malformed_body_uses_error_envelope() {
    let h = harness();
    let request = Request::builder()
        .method("POST")
        .uri("/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let response = h.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["success"], false);
    assert!(body["error"].is_string());
}

async fn post_raw(router: &Router, uri: &str, content_type: Option<&str>, body: &'static str) -> Reply {
    let mut builder = Request::builder().method("POST").uri(uri);
    if let Some(content_type) = content_type {
        builder = builder.header(header::CONTENT_TYPE, content_type);
    }
    let response = router
        .clone()
        .oneshot(builder.body(Body::from(body)).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    Reply {
        status,
        set_cookie: None,
        body: serde_json::from_slice(&bytes).unwrap(),
    }
}

#[tokio::test]
async fn test_bodyless_requests_report_missing_fields() {
    let h = harness();

    let reply = post_raw(&h.router, "/register", None, "").await;
    assert_error(&reply, StatusCode::BAD_REQUEST, "Email and password are required");

    let reply = post_raw(&h.router, "/login", Some("application/json"), "").await;
    assert_error(&reply, StatusCode::BAD_REQUEST, "Email and password are required");

    let reply = post_raw(&h.router, "/forgot-password", None, "").await;
    assert_error(&reply, StatusCode::BAD_REQUEST, "Email is required");

    let reply = post_raw(&h.router, "/reset-password", Some("application/json"), "").await;
    assert_error(&reply, StatusCode::BAD_REQUEST, "Token and password are required");
}

#[tokio::test]
async fn test_non_json_body_reads_as_empty() {
    let h = harness();
    let reply = post_raw(
        &h.router,
        "/login",
        Some("text/plain"),
        r#"{"email":"alice@example.com","password":"password123"}"#,
    )
    .await;
    assert_error(&reply, StatusCode::BAD_REQUEST, "Email and password are required");
}

// ============================================================================
// Login / Logout / Me
// ============================================================================

#[tokio::test]
async fn test_login_success() {
    let h = harness();
    register(&h.router, "alice@example.com", "password123").await;

    let reply = login(&h.router, "alice@example.com", "password123").await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["success"], true);
    assert_eq!(reply.body["user"]["email"], "alice@example.com");

    let whoami = me(&h.router, Some(reply.cookie_pair().as_str())).await;
    assert_eq!(whoami.status, StatusCode::OK);
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let h = harness();
    register(&h.router, "alice@example.com", "password123").await;
    let sessions_before = h.sessions.len();

    let wrong_password = login(&h.router, "alice@example.com", "wrongpassword").await;
    let unknown_email = login(&h.router, "bob@example.com", "password123").await;

    assert_error(&wrong_password, StatusCode::UNAUTHORIZED, "Invalid email or password");
    assert_error(&unknown_email, StatusCode::UNAUTHORIZED, "Invalid email or password");
    assert_eq!(wrong_password.body, unknown_email.body);
    assert!(wrong_password.set_cookie.is_none());
    assert!(unknown_email.set_cookie.is_none());
    assert_eq!(h.sessions.len(), sessions_before);
}

#[tokio::test]
async fn test_login_missing_fields() {
    let h = harness();
    let reply = post(&h.router, "/login", json!({})).await;
    assert_error(&reply, StatusCode::BAD_REQUEST, "Email and password are required");
}

#[tokio::test]
async fn test_me_requires_session() {
    let h = harness();

    let reply = me(&h.router, None).await;
    assert_error(&reply, StatusCode::UNAUTHORIZED, "Authentication required");

    let reply = me(&h.router, Some("auth_session=forged.value")).await;
    assert_error(&reply, StatusCode::UNAUTHORIZED, "Authentication required");
}

#[tokio::test]
async fn test_me_with_session_for_missing_user() {
    let config = AuthConfig::development();
    let sessions = MemorySessionStore::new();
    let router = auth_router_generic(MemoryAuthRepository::new(), sessions.clone(), config.clone());

    // Session outlives its account
    let token = SessionAuthenticator::new(Arc::new(sessions), Arc::new(config))
        .establish(UserId::new())
        .await
        .unwrap();

    let reply = me(&router, Some(format!("auth_session={token}").as_str())).await;
    assert_error(&reply, StatusCode::NOT_FOUND, "User not found");
}

#[tokio::test]
async fn test_logout_destroys_session() {
    let h = harness();
    let registered = register(&h.router, "alice@example.com", "password123").await;
    let cookie = registered.cookie_pair();

    let reply = send(&h.router, "POST", "/logout", Some(cookie.as_str()), None).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(
        reply.body,
        json!({ "success": true, "message": "Logged out successfully" })
    );
    let cleared = reply.set_cookie.unwrap();
    assert!(cleared.starts_with("auth_session=;"));
    assert!(cleared.contains("Max-Age=0"));
    assert!(h.sessions.is_empty());

    let whoami = me(&h.router, Some(cookie.as_str())).await;
    assert_eq!(whoami.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_without_session_succeeds() {
    let h = harness();
    let reply = send(&h.router, "POST", "/logout", None, None).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["message"], "Logged out successfully");
}

/// Session store whose every operation fails
#[derive(Clone)]
struct FailingSessionStore;

impl SessionStore for FailingSessionStore {
    async fn get(&self, _session_id: &SessionId) -> AuthResult<Option<Session>> {
        Err(AuthError::Internal("session store offline".to_string()))
    }

    async fn set(&self, _session_id: &SessionId, _session: &Session) -> AuthResult<()> {
        Err(AuthError::Internal("session store offline".to_string()))
    }

    async fn destroy(&self, _session_id: &SessionId) -> AuthResult<()> {
        Err(AuthError::Internal("session store offline".to_string()))
    }

    async fn cleanup_expired(&self) -> AuthResult<u64> {
        Err(AuthError::Internal("session store offline".to_string()))
    }
}

#[tokio::test]
async fn test_logout_store_failure() {
    let config = Arc::new(AuthConfig::development());

    // A validly signed cookie, so the store is actually consulted
    let signer = SessionAuthenticator::new(Arc::new(MemorySessionStore::new()), config.clone());
    let token = signer.sign(&SessionId::generate()).unwrap();

    let result = LogoutUseCase::new(Arc::new(FailingSessionStore), config.clone())
        .execute(Some(token.as_str()))
        .await;
    assert!(matches!(result, Err(AuthError::LogoutFailed)));

    let router = auth_router_generic(MemoryAuthRepository::new(), FailingSessionStore, (*config).clone());
    let reply = send(&router, "POST", "/logout", Some(format!("auth_session={token}").as_str()), None).await;
    assert_error(&reply, StatusCode::INTERNAL_SERVER_ERROR, "Failed to logout");
}

#[tokio::test]
async fn test_register_with_failing_session_store_hides_detail() {
    let router = auth_router_generic(
        MemoryAuthRepository::new(),
        FailingSessionStore,
        AuthConfig::development(),
    );
    let reply = register(&router, "alice@example.com", "password123").await;
    assert_error(&reply, StatusCode::INTERNAL_SERVER_ERROR, "Internal server error");
}

// ============================================================================
// Password Reset
// ============================================================================

async fn forgot(router: &Router, email: &str) -> Reply {
    post(router, "/forgot-password", json!({ "email": email })).await
}

async fn reset(router: &Router, token: &str, password: &str) -> Reply {
    post(router, "/reset-password", json!({ "token": token, "password": password })).await
}

#[tokio::test]
async fn test_full_reset_flow() {
    let h = harness();
    let registered = register(&h.router, "alice@example.com", "password123").await;
    let old_cookie = registered.cookie_pair();

    let reply = forgot(&h.router, "alice@example.com").await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["success"], true);
    assert_eq!(
        reply.body["message"],
        "If the email exists, a password reset link has been sent"
    );
    let token = reply.body["token"].as_str().unwrap().to_string();

    let reply = reset(&h.router, &token, "newpassword456").await;
    assert_eq!(
        reply.body,
        json!({ "success": true, "message": "Password reset successfully" })
    );

    assert_eq!(
        login(&h.router, "alice@example.com", "password123").await.status,
        StatusCode::UNAUTHORIZED
    );
    assert_eq!(
        login(&h.router, "alice@example.com", "newpassword456").await.status,
        StatusCode::OK
    );

    // Single use
    let reply = reset(&h.router, &token, "anotherpassword789").await;
    assert_error(&reply, StatusCode::BAD_REQUEST, "Invalid or expired token");
    assert_eq!(
        login(&h.router, "alice@example.com", "newpassword456").await.status,
        StatusCode::OK
    );

    // Existing sessions survive a reset
    assert_eq!(me(&h.router, Some(old_cookie.as_str())).await.status, StatusCode::OK);
}

#[tokio::test]
async fn test_reissue_invalidates_previous_token() {
    let h = harness();
    register(&h.router, "alice@example.com", "password123").await;

    let first = forgot(&h.router, "alice@example.com").await.body["token"]
        .as_str()
        .unwrap()
        .to_string();
    let second = forgot(&h.router, "alice@example.com").await.body["token"]
        .as_str()
        .unwrap()
        .to_string();
    assert_ne!(first, second);
    assert_eq!(h.repo.reset_token_count(), 1);

    let reply = reset(&h.router, &first, "newpassword456").await;
    assert_error(&reply, StatusCode::BAD_REQUEST, "Invalid or expired token");

    let reply = reset(&h.router, &second, "newpassword456").await;
    assert_eq!(reply.status, StatusCode::OK);
}

#[tokio::test]
async fn test_expired_token_is_rejected() {
    let h = harness();
    register(&h.router, "alice@example.com", "password123").await;
    let user = h.repo.find_by_email("alice@example.com").await.unwrap().unwrap();

    let (token, plaintext) = ResetToken::issue(user.user_id, Duration::minutes(-1));
    h.repo.replace_for_user(&token).await.unwrap();

    let reply = reset(&h.router, &plaintext, "newpassword456").await;
    assert_error(&reply, StatusCode::BAD_REQUEST, "Invalid or expired token");
    assert_eq!(
        login(&h.router, "alice@example.com", "password123").await.status,
        StatusCode::OK
    );
}

#[tokio::test]
async fn test_reset_validation() {
    let h = harness();

    let reply = post(&h.router, "/reset-password", json!({ "token": "abc" })).await;
    assert_error(&reply, StatusCode::BAD_REQUEST, "Token and password are required");

    let reply = reset(&h.router, "not-a-token", "newpassword456").await;
    assert_error(&reply, StatusCode::BAD_REQUEST, "Invalid or expired token");

    register(&h.router, "alice@example.com", "password123").await;
    let token = forgot(&h.router, "alice@example.com").await.body["token"]
        .as_str()
        .unwrap()
        .to_string();

    // Policy failure leaves the token usable
    let reply = reset(&h.router, &token, "short").await;
    assert_error(&reply, StatusCode::BAD_REQUEST, "Password must be at least 8 characters");
    let reply = reset(&h.router, &token, "newpassword456").await;
    assert_eq!(reply.status, StatusCode::OK);
}

#[tokio::test]
async fn test_forgot_password_is_uniform() {
    let h = harness_with(AuthConfig {
        expose_reset_token: false,
        ..AuthConfig::development()
    });
    register(&h.router, "alice@example.com", "password123").await;

    let known = forgot(&h.router, "alice@example.com").await;
    let unknown = forgot(&h.router, "nobody@example.com").await;

    assert_eq!(known.status, StatusCode::OK);
    assert_eq!(unknown.status, StatusCode::OK);
    assert_eq!(known.body, unknown.body);
    assert!(known.body.get("token").is_none());

    // A token was still issued for the real account
    wait_for_reset_tokens(&h.repo, 1).await;
}

/// Token writes can land after the response; poll until they do
async fn wait_for_reset_tokens(repo: &MemoryAuthRepository, expected: usize) {
    for _ in 0..100 {
        if repo.reset_token_count() == expected {
            return;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    assert_eq!(repo.reset_token_count(), expected);
}

#[tokio::test]
async fn test_forgot_password_requires_email() {
    let h = harness();
    let reply = post(&h.router, "/forgot-password", json!({})).await;
    assert_error(&reply, StatusCode::BAD_REQUEST, "Email is required");
}

#[tokio::test]
async fn test_forgot_password_unknown_email_issues_nothing() {
    let repo = MemoryAuthRepository::new();
    let output = ForgotPasswordUseCase::new(Arc::new(repo.clone()), Arc::new(AuthConfig::development()))
        .execute(Some("nobody@example.com".to_string()))
        .await
        .unwrap();

    assert!(output.token.is_none());
    assert_eq!(repo.reset_token_count(), 0);
}

#[tokio::test]
async fn test_concurrent_redeem_has_one_winner() {
    let h = harness();
    register(&h.router, "alice@example.com", "password123").await;
    let token = forgot(&h.router, "alice@example.com").await.body["token"]
        .as_str()
        .unwrap()
        .to_string();

    let (a, b) = tokio::join!(
        reset(&h.router, &token, "firstpassword1"),
        reset(&h.router, &token, "secondpassword2"),
    );

    let mut statuses = [a.status, b.status];
    statuses.sort_by_key(|s| s.as_u16());
    assert_eq!(statuses, [StatusCode::OK, StatusCode::BAD_REQUEST]);
}
