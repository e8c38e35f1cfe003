//! Bearer-token authentication.
//!
//! Token issuance lives in the admin CLI; this extractor only resolves an
//! `Authorization: Bearer` header to a caller.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};

use crate::adapters::http::error::{ErrorBody, ErrorDetail};
use crate::adapters::http::server::AppState;
use crate::domain::models::User;

/// The authenticated caller, resolved from the bearer token.
pub struct AuthUser(pub User);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or_else(|| unauthorized("Missing bearer token"))?;

        match state.users.get_by_token(token).await {
            Ok(Some(user)) => Ok(AuthUser(user)),
            Ok(None) => Err(unauthorized("Invalid token")),
            Err(err) => {
                tracing::error!(error = %err, "token lookup failed");
                Err(unauthorized("Invalid token"))
            }
        }
    }
}

fn unauthorized(message: &str) -> Response {
    let body = ErrorBody {
        error: ErrorDetail {
            message: message.to_string(),
            code: "UNAUTHORIZED".to_string(),
        },
    };
    (StatusCode::UNAUTHORIZED, Json(body)).into_response()
}
