//! Error and envelope types for the REST surface.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Serialize;

use crate::domain::errors::DomainError;

/// Successful responses wrap their payload in `{success, data}`.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub data: T,
}

/// Wrap a payload in the success envelope.
pub fn ok<T: Serialize>(data: T) -> Json<Envelope<T>> {
    Json(Envelope {
        success: true,
        data,
    })
}

/// Failure body: `{error: {message, code}}`.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub message: String,
    pub code: String,
}

/// Domain errors carried across the HTTP boundary.
#[derive(Debug)]
pub struct ApiError(pub DomainError);

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            DomainError::Validation(_) => StatusCode::BAD_REQUEST,
            DomainError::NotFound { .. } => StatusCode::NOT_FOUND,
            DomainError::InvalidState { .. } | DomainError::Conflict(_) => StatusCode::CONFLICT,
            DomainError::Database(_) | DomainError::Serialization(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        // Expected outcomes are debug-level noise; failures are worth a log line
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self.0, "request failed");
        } else {
            tracing::debug!(error = %self.0, code = self.0.code(), "request rejected");
        }

        let body = ErrorBody {
            error: ErrorDetail {
                message: self.0.to_string(),
                code: self.0.code().to_string(),
            },
        };
        (status, Json(body)).into_response()
    }
}
