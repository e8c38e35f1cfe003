//! Label endpoints. Labels are shared reference data; creation is an
//! administrative concern handled by the CLI.

use axum::extract::State;
use axum::response::Json;
use serde::Serialize;
use uuid::Uuid;

use crate::adapters::http::auth::AuthUser;
use crate::adapters::http::error::{ok, ApiError, Envelope};
use crate::adapters::http::server::AppState;
use crate::domain::models::Label;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelResponse {
    pub id: Uuid,
    pub name: String,
    pub color: String,
    pub created_at: String,
}

impl From<Label> for LabelResponse {
    fn from(l: Label) -> Self {
        Self {
            id: l.id,
            name: l.name,
            color: l.color,
            created_at: l.created_at.to_rfc3339(),
        }
    }
}

pub async fn list(
    State(state): State<AppState>,
    AuthUser(_caller): AuthUser,
) -> Result<Json<Envelope<Vec<LabelResponse>>>, ApiError> {
    let labels = state.labels.list().await?;
    Ok(ok(labels.into_iter().map(LabelResponse::from).collect()))
}
