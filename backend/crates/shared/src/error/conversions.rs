//! Error conversions
//!
//! HTTP rendering of [`AppError`] as the shared error envelope.

#[allow(unused_imports)]
use super::app_error::AppError;

// ============================================================================
// Axum conversions (feature-gated)
// ============================================================================

/// Body of every failed API response: `{"success": false, "error": "..."}`
#[cfg(feature = "axum")]
#[derive(Debug, serde::Serialize)]
pub struct ErrorEnvelope<'a> {
    pub success: bool,
    pub error: &'a str,
}

#[cfg(feature = "axum")]
impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        use axum::Json;
        use axum::http::StatusCode;

        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let body = ErrorEnvelope {
            success: false,
            error: self.message(),
        };

        (status, Json(body)).into_response()
    }
}
