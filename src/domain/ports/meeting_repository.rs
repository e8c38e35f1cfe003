use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::models::{Meeting, MeetingNotes, MeetingStatus, MeetingTopic, Resolution};

/// Filters for querying meetings.
#[derive(Default, Debug, Clone)]
pub struct MeetingFilter {
    /// Owning relationship
    pub relationship_id: Option<Uuid>,
    /// Restrict to relationships involving this user (either side)
    pub involving_user: Option<Uuid>,
    /// Meeting status
    pub status: Option<MeetingStatus>,
    /// Only meetings at or after this instant
    pub scheduled_after: Option<DateTime<Utc>>,
    /// Only meetings before this instant
    pub scheduled_before: Option<DateTime<Utc>>,
}

/// Outcome of completing a meeting.
#[derive(Debug, Clone)]
pub struct CompletionOutcome {
    /// The completed meeting
    pub meeting: Meeting,
    /// Agenda entries that had no resolution set; informational, not an error
    pub unresolved_topics: u64,
}

/// Repository port for meeting, agenda, and notes persistence.
///
/// The attach, detach, complete, and cancel operations are the only places
/// where the meeting/topic cross-entity invariant is touched; each executes
/// as a single transaction against both tables.
#[async_trait]
pub trait MeetingRepository: Send + Sync {
    /// Insert a new meeting.
    async fn create(&self, meeting: &Meeting) -> DomainResult<()>;

    /// Insert a batch of generated meetings.
    async fn create_many(&self, meetings: &[Meeting]) -> DomainResult<()>;

    /// Get a meeting by ID.
    async fn get(&self, id: Uuid) -> DomainResult<Option<Meeting>>;

    /// Update an existing meeting (reschedule, retitle).
    async fn update(&self, meeting: &Meeting) -> DomainResult<()>;

    /// List meetings with optional filters, ordered by scheduled time.
    async fn list(&self, filter: MeetingFilter) -> DomainResult<Vec<Meeting>>;

    /// Agenda entries for a meeting, in display order.
    async fn agenda(&self, meeting_id: Uuid) -> DomainResult<Vec<MeetingTopic>>;

    /// The topic's attachment to a non-cancelled meeting, if any.
    async fn active_attachment(&self, topic_id: Uuid) -> DomainResult<Option<MeetingTopic>>;

    /// All attachments for a topic, including to cancelled meetings.
    async fn attachments_for_topic(&self, topic_id: Uuid) -> DomainResult<Vec<MeetingTopic>>;

    /// Atomically attach a backlog topic to a scheduled meeting.
    ///
    /// Creates the agenda row at the end of the agenda ordering and flips
    /// the topic to scheduled. A concurrent attach for the same topic fails
    /// with `Conflict`; an already-attached topic fails with
    /// `InvalidState`.
    async fn attach_topic(
        &self,
        meeting_id: Uuid,
        topic_id: Uuid,
        added_by: Uuid,
    ) -> DomainResult<MeetingTopic>;

    /// Atomically detach a topic, reverting it to backlog when no other
    /// active attachment remains.
    async fn detach_topic(&self, meeting_id: Uuid, topic_id: Uuid) -> DomainResult<()>;

    /// Update an agenda entry's resolution and/or display order.
    async fn update_agenda_entry(
        &self,
        meeting_id: Uuid,
        topic_id: Uuid,
        resolution: Option<Resolution>,
        sort_order: Option<i64>,
    ) -> DomainResult<MeetingTopic>;

    /// Atomically complete a scheduled meeting, transitioning every
    /// still-attached topic to discussed.
    async fn complete(&self, meeting_id: Uuid) -> DomainResult<CompletionOutcome>;

    /// Atomically cancel a scheduled meeting, detaching every topic back to
    /// the backlog.
    async fn cancel(&self, meeting_id: Uuid) -> DomainResult<Meeting>;

    /// Get the shared notes document, if one has been written.
    async fn get_notes(&self, meeting_id: Uuid) -> DomainResult<Option<MeetingNotes>>;

    /// Write the shared notes document; last write wins.
    async fn upsert_notes(&self, notes: &MeetingNotes) -> DomainResult<()>;
}
