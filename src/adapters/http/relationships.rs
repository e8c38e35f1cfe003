//! Relationship endpoints. Pairing is administrative; the API only lists
//! the caller's own pairings so the client can scope its queries.

use axum::extract::State;
use axum::response::Json;
use serde::Serialize;
use uuid::Uuid;

use crate::adapters::http::auth::AuthUser;
use crate::adapters::http::error::{ok, ApiError, Envelope};
use crate::adapters::http::server::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationshipResponse {
    pub id: Uuid,
    pub leader_id: Uuid,
    pub ic_id: Uuid,
    /// The other party from the caller's point of view.
    pub counterparty_id: Uuid,
    pub created_at: String,
}

pub async fn list(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
) -> Result<Json<Envelope<Vec<RelationshipResponse>>>, ApiError> {
    let relationships = state.relationships.list_for_user(caller.id).await?;
    let response = relationships
        .into_iter()
        .filter_map(|r| {
            r.counterparty(caller.id).map(|counterparty_id| RelationshipResponse {
                id: r.id,
                leader_id: r.leader_id,
                ic_id: r.ic_id,
                counterparty_id,
                created_at: r.created_at.to_rfc3339(),
            })
        })
        .collect();
    Ok(ok(response))
}
