//! Thought endpoints. Thoughts are private to their owner.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::adapters::http::auth::AuthUser;
use crate::adapters::http::error::{ok, ApiError, Envelope};
use crate::adapters::http::server::AppState;
use crate::adapters::http::topics::TopicResponse;
use crate::domain::models::Thought;
use crate::services::ThoughtUpdate;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRequest {
    pub title: String,
    #[serde(default)]
    pub content: Option<Value>,
    #[serde(default)]
    pub label_id: Option<Uuid>,
    #[serde(default)]
    pub about_ic_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<Value>,
    #[serde(default)]
    pub label_id: Option<Uuid>,
    #[serde(default)]
    pub about_ic_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromoteRequest {
    #[serde(default)]
    pub label_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThoughtResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub about_ic_id: Option<Uuid>,
    pub title: String,
    pub content: Option<Value>,
    pub label_id: Option<Uuid>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Thought> for ThoughtResponse {
    fn from(t: Thought) -> Self {
        Self {
            id: t.id,
            user_id: t.user_id,
            about_ic_id: t.about_ic_id,
            title: t.title,
            content: t.content,
            label_id: t.label_id,
            created_at: t.created_at.to_rfc3339(),
            updated_at: t.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PromoteResponse {
    pub topic: TopicResponse,
    pub thought_deleted: bool,
}

pub async fn list(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
) -> Result<Json<Envelope<Vec<ThoughtResponse>>>, ApiError> {
    let thoughts = state.promotions.list_thoughts(&caller).await?;
    Ok(ok(thoughts.into_iter().map(ThoughtResponse::from).collect()))
}

pub async fn detail(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Envelope<ThoughtResponse>>, ApiError> {
    let thought = state.promotions.get_thought(&caller, id).await?;
    Ok(ok(thought.into()))
}

pub async fn create(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Json(req): Json<CreateRequest>,
) -> Result<(StatusCode, Json<Envelope<ThoughtResponse>>), ApiError> {
    let thought = state
        .promotions
        .create_thought(&caller, req.title, req.content, req.label_id, req.about_ic_id)
        .await?;
    Ok((StatusCode::CREATED, ok(thought.into())))
}

pub async fn update(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateRequest>,
) -> Result<Json<Envelope<ThoughtResponse>>, ApiError> {
    let thought = state
        .promotions
        .update_thought(
            &caller,
            id,
            ThoughtUpdate {
                title: req.title,
                content: req.content,
                label_id: req.label_id,
                about_ic_id: req.about_ic_id,
            },
        )
        .await?;
    Ok(ok(thought.into()))
}

pub async fn remove(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Envelope<Value>>, ApiError> {
    state.promotions.delete_thought(&caller, id).await?;
    Ok(ok(serde_json::json!({ "id": id, "deleted": true })))
}

pub async fn promote(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<PromoteRequest>,
) -> Result<(StatusCode, Json<Envelope<PromoteResponse>>), ApiError> {
    let outcome = state.promotions.promote(&caller, id, req.label_id).await?;
    Ok((
        StatusCode::CREATED,
        ok(PromoteResponse {
            topic: outcome.topic.into(),
            thought_deleted: outcome.thought_deleted,
        }),
    ))
}
