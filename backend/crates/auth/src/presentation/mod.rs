//! Presentation Layer
//!
//! HTTP handlers, DTOs, router, and middleware.

pub mod dto;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod router;

pub use extract::{ApiJson, AuthenticatedUser};
pub use handlers::AuthAppState;
pub use middleware::require_auth_session;
pub use router::{auth_router, auth_router_generic};
