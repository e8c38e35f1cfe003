//! Topic endpoints.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::adapters::http::auth::AuthUser;
use crate::adapters::http::error::{ok, ApiError, Envelope};
use crate::adapters::http::meetings::MeetingResponse;
use crate::adapters::http::server::AppState;
use crate::domain::errors::DomainError;
use crate::domain::models::{Meeting, MeetingTopic, Topic, TopicStatus};
use crate::services::{TopicQuery, TopicUpdate};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub label_id: Option<Uuid>,
    #[serde(default)]
    pub about_ic_id: Option<Uuid>,
    #[serde(default)]
    pub include_counterparty: bool,
}

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
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderRequest {
    pub sort_order: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub about_ic_id: Option<Uuid>,
    pub title: String,
    pub content: Option<Value>,
    pub label_id: Option<Uuid>,
    pub status: String,
    pub sort_order: i64,
    pub discussed_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Topic> for TopicResponse {
    fn from(t: Topic) -> Self {
        Self {
            id: t.id,
            user_id: t.user_id,
            about_ic_id: t.about_ic_id,
            title: t.title,
            content: t.content,
            label_id: t.label_id,
            status: t.status.as_str().to_string(),
            sort_order: t.sort_order,
            discussed_at: t.discussed_at.map(|dt| dt.to_rfc3339()),
            created_at: t.created_at.to_rfc3339(),
            updated_at: t.updated_at.to_rfc3339(),
        }
    }
}

/// One row of a topic's meeting history.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicAttachmentResponse {
    pub meeting_id: Uuid,
    pub added_by_id: Uuid,
    pub resolution: Option<String>,
    pub sort_order: i64,
    pub meeting: MeetingResponse,
}

impl From<(MeetingTopic, Meeting)> for TopicAttachmentResponse {
    fn from((entry, meeting): (MeetingTopic, Meeting)) -> Self {
        Self {
            meeting_id: entry.meeting_id,
            added_by_id: entry.added_by,
            resolution: entry.resolution.map(|r| r.as_str().to_string()),
            sort_order: entry.sort_order,
            meeting: meeting.into(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicDetailResponse {
    #[serde(flatten)]
    pub topic: TopicResponse,
    pub meeting_topics: Vec<TopicAttachmentResponse>,
}

pub async fn list(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Query(params): Query<ListParams>,
) -> Result<Json<Envelope<Vec<TopicResponse>>>, ApiError> {
    let status = params
        .status
        .as_deref()
        .map(|s| {
            TopicStatus::from_str(s)
                .ok_or_else(|| DomainError::Validation(format!("Invalid status: {s}")))
        })
        .transpose()?;

    let topics = state
        .topics
        .list(
            &caller,
            TopicQuery {
                status,
                label_id: params.label_id,
                about_ic_id: params.about_ic_id,
                include_counterparty: params.include_counterparty,
            },
        )
        .await?;

    Ok(ok(topics.into_iter().map(TopicResponse::from).collect()))
}

pub async fn detail(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Envelope<TopicDetailResponse>>, ApiError> {
    let topic = state.topics.get(&caller, id).await?;
    let attachments = state.meetings.topic_attachments(id).await?;

    Ok(ok(TopicDetailResponse {
        topic: topic.into(),
        meeting_topics: attachments
            .into_iter()
            .map(TopicAttachmentResponse::from)
            .collect(),
    }))
}

pub async fn create(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Json(req): Json<CreateRequest>,
) -> Result<(StatusCode, Json<Envelope<TopicResponse>>), ApiError> {
    let topic = state
        .topics
        .create(&caller, req.title, req.content, req.label_id, req.about_ic_id)
        .await?;
    Ok((StatusCode::CREATED, ok(topic.into())))
}

pub async fn update(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateRequest>,
) -> Result<Json<Envelope<TopicResponse>>, ApiError> {
    let topic = state
        .topics
        .update(
            &caller,
            id,
            TopicUpdate {
                title: req.title,
                content: req.content,
                label_id: req.label_id,
            },
        )
        .await?;
    Ok(ok(topic.into()))
}

pub async fn remove(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Envelope<Value>>, ApiError> {
    state.topics.delete(&caller, id).await?;
    Ok(ok(serde_json::json!({ "id": id, "deleted": true })))
}

pub async fn archive(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Envelope<TopicResponse>>, ApiError> {
    let topic = state.topics.archive(&caller, id).await?;
    Ok(ok(topic.into()))
}

pub async fn reorder(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<ReorderRequest>,
) -> Result<Json<Envelope<TopicResponse>>, ApiError> {
    let topic = state.topics.reorder(&caller, id, req.sort_order).await?;
    Ok(ok(topic.into()))
}
