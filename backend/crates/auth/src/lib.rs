//! Auth (Authentication) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, value objects, repository traits
//! - `application/` - Use cases and application services
//! - `infra/` - Postgres and in-memory implementations
//! - `presentation/` - HTTP handlers, DTOs, router
//!
//! ## Features
//! - Email + password registration and login
//! - Server-side sessions behind an HMAC-signed cookie
//! - Password reset through single-use, expiring tokens
//!
//! ## Security Model
//! - Passwords hashed with Argon2id, optional pepper
//! - Login does not reveal whether an email is registered
//! - Forgot-password answers identically for known and unknown emails
//! - Reset tokens stored as SHA-256 digests, one live token per user

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

#[cfg(test)]
mod tests;

// Re-exports for convenience
pub use application::config::{AppEnv, AuthConfig};
pub use error::{AuthError, AuthResult};
pub use infra::memory::{MemoryAuthRepository, MemorySessionStore};
pub use infra::postgres::{PgAuthRepository, PgSessionStore};
pub use presentation::router::{auth_router, auth_router_generic};

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};
