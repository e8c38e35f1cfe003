//! Meeting endpoints.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::adapters::http::auth::AuthUser;
use crate::adapters::http::error::{ok, ApiError, Envelope};
use crate::adapters::http::server::AppState;
use crate::adapters::http::topics::TopicResponse;
use crate::domain::errors::DomainError;
use crate::domain::models::{Frequency, Meeting, MeetingNotes, MeetingStatus, Resolution};
use crate::services::{AgendaEntry, MeetingUpdate};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    #[serde(default)]
    pub ic_id: Option<Uuid>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub upcoming: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRequest {
    pub ic_id: Uuid,
    pub scheduled_at: DateTime<Utc>,
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub ic_id: Uuid,
    pub frequency: String,
    pub day_of_week: u8,
    pub time: String,
    pub count: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRequest {
    #[serde(default)]
    pub scheduled_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachRequest {
    pub topic_id: Uuid,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgendaEntryRequest {
    #[serde(default)]
    pub resolution: Option<String>,
    #[serde(default)]
    pub sort_order: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct NotesRequest {
    pub content: Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingResponse {
    pub id: Uuid,
    pub relationship_id: Uuid,
    pub title: Option<String>,
    pub scheduled_at: String,
    pub status: String,
    pub created_by: Uuid,
    pub completed_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Meeting> for MeetingResponse {
    fn from(m: Meeting) -> Self {
        Self {
            id: m.id,
            relationship_id: m.relationship_id,
            title: m.title,
            scheduled_at: m.scheduled_at.to_rfc3339(),
            status: m.status.as_str().to_string(),
            created_by: m.created_by,
            completed_at: m.completed_at.map(|dt| dt.to_rfc3339()),
            created_at: m.created_at.to_rfc3339(),
            updated_at: m.updated_at.to_rfc3339(),
        }
    }
}

/// An upcoming meeting, flagged when it is the caller's next one.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpcomingMeetingResponse {
    #[serde(flatten)]
    pub meeting: MeetingResponse,
    pub is_next: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingListResponse {
    pub upcoming: Vec<UpcomingMeetingResponse>,
    pub past: Vec<MeetingResponse>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgendaEntryResponse {
    pub topic_id: Uuid,
    pub added_by_id: Uuid,
    pub resolution: Option<String>,
    pub sort_order: i64,
    pub topic: TopicResponse,
}

impl From<AgendaEntry> for AgendaEntryResponse {
    fn from(e: AgendaEntry) -> Self {
        Self {
            topic_id: e.entry.topic_id,
            added_by_id: e.entry.added_by,
            resolution: e.entry.resolution.map(|r| r.as_str().to_string()),
            sort_order: e.entry.sort_order,
            topic: e.topic.into(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotesResponse {
    pub meeting_id: Uuid,
    pub content: Value,
    pub last_edited_by: Option<Uuid>,
    pub last_edited_at: String,
}

impl From<MeetingNotes> for NotesResponse {
    fn from(n: MeetingNotes) -> Self {
        Self {
            meeting_id: n.meeting_id,
            content: n.content,
            last_edited_by: n.last_edited_by,
            last_edited_at: n.last_edited_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingDetailResponse {
    #[serde(flatten)]
    pub meeting: MeetingResponse,
    pub topics: Vec<AgendaEntryResponse>,
    pub notes: Option<NotesResponse>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteResponse {
    pub id: Uuid,
    pub status: String,
    pub unresolved_topics: u64,
}

pub async fn list(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Query(params): Query<ListParams>,
) -> Result<Json<Envelope<MeetingListResponse>>, ApiError> {
    let status = params
        .status
        .as_deref()
        .map(|s| {
            MeetingStatus::from_str(s)
                .ok_or_else(|| DomainError::Validation(format!("Invalid status: {s}")))
        })
        .transpose()?;

    let meetings = state.meetings.list(&caller, params.ic_id, status).await?;
    let now = Utc::now();

    let (upcoming, past): (Vec<Meeting>, Vec<Meeting>) = meetings.into_iter().partition(|m| {
        m.status == MeetingStatus::Scheduled && m.scheduled_at >= now
    });

    let upcoming: Vec<UpcomingMeetingResponse> = upcoming
        .into_iter()
        .enumerate()
        .map(|(i, m)| UpcomingMeetingResponse {
            meeting: m.into(),
            is_next: i == 0,
        })
        .collect();
    // History reads newest-first
    let past: Vec<MeetingResponse> = past.into_iter().rev().map(MeetingResponse::from).collect();

    let response = match params.upcoming {
        Some(true) => MeetingListResponse {
            upcoming,
            past: Vec::new(),
        },
        Some(false) => MeetingListResponse {
            upcoming: Vec::new(),
            past,
        },
        None => MeetingListResponse { upcoming, past },
    };

    Ok(ok(response))
}

pub async fn create(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Json(req): Json<CreateRequest>,
) -> Result<(StatusCode, Json<Envelope<MeetingResponse>>), ApiError> {
    let meeting = state
        .meetings
        .create(&caller, req.ic_id, req.scheduled_at, req.title)
        .await?;
    Ok((StatusCode::CREATED, ok(meeting.into())))
}

pub async fn generate(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Json(req): Json<GenerateRequest>,
) -> Result<(StatusCode, Json<Envelope<Vec<MeetingResponse>>>), ApiError> {
    let frequency = Frequency::from_str(&req.frequency)
        .ok_or_else(|| DomainError::Validation(format!("Invalid frequency: {}", req.frequency)))?;

    let meetings = state
        .meetings
        .generate(
            &caller,
            req.ic_id,
            frequency,
            req.day_of_week,
            &req.time,
            req.count,
        )
        .await?;
    Ok((
        StatusCode::CREATED,
        ok(meetings.into_iter().map(MeetingResponse::from).collect()),
    ))
}

pub async fn detail(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Envelope<MeetingDetailResponse>>, ApiError> {
    let detail = state.meetings.get_detail(&caller, id).await?;
    Ok(ok(MeetingDetailResponse {
        meeting: detail.meeting.into(),
        topics: detail
            .agenda
            .into_iter()
            .map(AgendaEntryResponse::from)
            .collect(),
        notes: detail.notes.map(NotesResponse::from),
    }))
}

pub async fn update(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateRequest>,
) -> Result<Json<Envelope<MeetingResponse>>, ApiError> {
    let meeting = state
        .meetings
        .update(
            &caller,
            id,
            MeetingUpdate {
                scheduled_at: req.scheduled_at,
                title: req.title,
            },
        )
        .await?;
    Ok(ok(meeting.into()))
}

pub async fn cancel(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Envelope<MeetingResponse>>, ApiError> {
    let meeting = state.meetings.cancel(&caller, id).await?;
    Ok(ok(meeting.into()))
}

pub async fn complete(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Envelope<CompleteResponse>>, ApiError> {
    let outcome = state.meetings.complete(&caller, id).await?;
    Ok(ok(CompleteResponse {
        id: outcome.meeting.id,
        status: outcome.meeting.status.as_str().to_string(),
        unresolved_topics: outcome.unresolved_topics,
    }))
}

pub async fn attach_topic(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<AttachRequest>,
) -> Result<(StatusCode, Json<Envelope<Value>>), ApiError> {
    let entry = state
        .meetings
        .attach_topic(&caller, id, req.topic_id)
        .await?;
    Ok((
        StatusCode::CREATED,
        ok(serde_json::json!({
            "meetingId": entry.meeting_id,
            "topicId": entry.topic_id,
            "addedById": entry.added_by,
            "sortOrder": entry.sort_order,
        })),
    ))
}

pub async fn detach_topic(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path((id, topic_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Envelope<Value>>, ApiError> {
    state.meetings.detach_topic(&caller, id, topic_id).await?;
    Ok(ok(serde_json::json!({ "topicId": topic_id, "detached": true })))
}

pub async fn update_agenda_entry(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path((id, topic_id)): Path<(Uuid, Uuid)>,
    Json(req): Json<AgendaEntryRequest>,
) -> Result<Json<Envelope<Value>>, ApiError> {
    let resolution = req
        .resolution
        .as_deref()
        .map(|s| {
            Resolution::from_str(s)
                .ok_or_else(|| DomainError::Validation(format!("Invalid resolution: {s}")))
        })
        .transpose()?;

    let entry = state
        .meetings
        .update_agenda_entry(&caller, id, topic_id, resolution, req.sort_order)
        .await?;
    Ok(ok(serde_json::json!({
        "meetingId": entry.meeting_id,
        "topicId": entry.topic_id,
        "resolution": entry.resolution.map(|r| r.as_str()),
        "sortOrder": entry.sort_order,
    })))
}

pub async fn get_notes(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Envelope<Option<NotesResponse>>>, ApiError> {
    let notes = state.meetings.get_notes(&caller, id).await?;
    Ok(ok(notes.map(NotesResponse::from)))
}

pub async fn update_notes(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<NotesRequest>,
) -> Result<Json<Envelope<NotesResponse>>, ApiError> {
    let notes = state
        .meetings
        .update_notes(&caller, id, req.content)
        .await?;
    Ok(ok(notes.into()))
}
