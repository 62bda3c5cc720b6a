//! API request and response types

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use serde::Serialize;
use tracing::error;
use tracing::warn;

use crate::errors::ProfRagError;

/// Standard API response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Error surfaced to the caller before any reply text has been sent
#[derive(Debug)]
pub struct ApiError(pub ProfRagError);

impl ApiError {
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match &self.0 {
            ProfRagError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ProfRagError::EmbeddingProviderError(_)
            | ProfRagError::RetrievalProviderError(_)
            | ProfRagError::CompletionProviderError(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ProfRagError> for ApiError {
    fn from(err: ProfRagError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed ({}): {}", status, self.0);
        } else {
            warn!("Rejected request ({}): {}", status, self.0);
        }

        (status, Json(ApiResponse::<()>::error(self.0.to_string()))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (
                ProfRagError::InvalidRequest("empty".into()),
                StatusCode::BAD_REQUEST,
            ),
            (
                ProfRagError::EmbeddingProviderError("down".into()),
                StatusCode::BAD_GATEWAY,
            ),
            (
                ProfRagError::RetrievalProviderError("down".into()),
                StatusCode::BAD_GATEWAY,
            ),
            (
                ProfRagError::CompletionProviderError("down".into()),
                StatusCode::BAD_GATEWAY,
            ),
            (
                ProfRagError::ConfigError("missing key".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(ApiError::from(err).status(), expected);
        }
    }

    #[test]
    fn test_error_envelope() {
        let body = serde_json::to_value(ApiResponse::<()>::error("bad input")).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"success": false, "data": null, "error": "bad input"})
        );
    }
}
