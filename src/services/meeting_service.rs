//! Meeting lifecycle, agenda membership, and recurring generation.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{
    Frequency, Meeting, MeetingNotes, MeetingStatus, MeetingTopic, Relationship, Resolution,
    Topic, User,
};
use crate::domain::ports::{
    CompletionOutcome, MeetingFilter, MeetingRepository, RelationshipRepository, TopicRepository,
};
use crate::services::schedule;

/// Partial update for a scheduled meeting.
#[derive(Default, Debug, Clone)]
pub struct MeetingUpdate {
    pub scheduled_at: Option<DateTime<Utc>>,
    pub title: Option<String>,
}

/// One agenda line with its topic resolved.
#[derive(Debug, Clone)]
pub struct AgendaEntry {
    pub entry: MeetingTopic,
    pub topic: Topic,
}

/// A meeting with its agenda and notes, as shown on the detail screen.
#[derive(Debug, Clone)]
pub struct MeetingDetail {
    pub meeting: Meeting,
    pub agenda: Vec<AgendaEntry>,
    pub notes: Option<MeetingNotes>,
}

pub struct MeetingService {
    meetings: Arc<dyn MeetingRepository>,
    topics: Arc<dyn TopicRepository>,
    relationships: Arc<dyn RelationshipRepository>,
}

impl MeetingService {
    pub fn new(
        meetings: Arc<dyn MeetingRepository>,
        topics: Arc<dyn TopicRepository>,
        relationships: Arc<dyn RelationshipRepository>,
    ) -> Self {
        Self {
            meetings,
            topics,
            relationships,
        }
    }

    /// Create a single meeting between the caller (a leader) and one of
    /// their ICs.
    pub async fn create(
        &self,
        caller: &User,
        ic_id: Uuid,
        scheduled_at: DateTime<Utc>,
        title: Option<String>,
    ) -> DomainResult<Meeting> {
        let relationship = self
            .relationships
            .get_pair(caller.id, ic_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Relationship", ic_id))?;

        let mut meeting = Meeting::new(relationship.id, caller.id, scheduled_at);
        meeting.title = title;
        self.meetings.create(&meeting).await?;
        Ok(meeting)
    }

    /// Generate a run of recurring meetings starting from the wall clock.
    pub async fn generate(
        &self,
        caller: &User,
        ic_id: Uuid,
        frequency: Frequency,
        day_of_week: u8,
        time: &str,
        count: u32,
    ) -> DomainResult<Vec<Meeting>> {
        self.generate_at(Utc::now(), caller, ic_id, frequency, day_of_week, time, count)
            .await
    }

    /// Same as [`generate`](Self::generate) with an injected clock.
    #[allow(clippy::too_many_arguments)]
    pub async fn generate_at(
        &self,
        now: DateTime<Utc>,
        caller: &User,
        ic_id: Uuid,
        frequency: Frequency,
        day_of_week: u8,
        time: &str,
        count: u32,
    ) -> DomainResult<Vec<Meeting>> {
        let relationship = self
            .relationships
            .get_pair(caller.id, ic_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Relationship", ic_id))?;

        let occurrences = schedule::compute_occurrences(now, frequency, day_of_week, time, count)?;
        let meetings: Vec<Meeting> = occurrences
            .into_iter()
            .map(|at| Meeting::new(relationship.id, caller.id, at))
            .collect();

        self.meetings.create_many(&meetings).await?;
        Ok(meetings)
    }

    /// Fetch a meeting with its agenda and notes.
    pub async fn get_detail(&self, caller: &User, id: Uuid) -> DomainResult<MeetingDetail> {
        let (meeting, _) = self.get_visible(caller, id).await?;

        let mut agenda = Vec::new();
        for entry in self.meetings.agenda(id).await? {
            let topic = self
                .topics
                .get(entry.topic_id)
                .await?
                .ok_or_else(|| DomainError::not_found("Topic", entry.topic_id))?;
            agenda.push(AgendaEntry { entry, topic });
        }
        let notes = self.meetings.get_notes(id).await?;

        Ok(MeetingDetail {
            meeting,
            agenda,
            notes,
        })
    }

    /// List meetings the caller is party to, optionally narrowed to one IC
    /// or one status.
    pub async fn list(
        &self,
        caller: &User,
        ic_id: Option<Uuid>,
        status: Option<MeetingStatus>,
    ) -> DomainResult<Vec<Meeting>> {
        let relationship_id = match ic_id {
            Some(ic_id) => Some(
                self.relationships
                    .get_pair(caller.id, ic_id)
                    .await?
                    .ok_or_else(|| DomainError::not_found("Relationship", ic_id))?
                    .id,
            ),
            None => None,
        };

        self.meetings
            .list(MeetingFilter {
                relationship_id,
                involving_user: Some(caller.id),
                status,
                ..Default::default()
            })
            .await
    }

    /// Reschedule or retitle a meeting that has not happened yet.
    pub async fn update(
        &self,
        caller: &User,
        id: Uuid,
        changes: MeetingUpdate,
    ) -> DomainResult<Meeting> {
        let (mut meeting, _) = self.get_visible(caller, id).await?;
        if meeting.status != MeetingStatus::Scheduled {
            return Err(DomainError::invalid_state(
                "Meeting",
                id,
                format!("cannot reschedule a {} meeting", meeting.status.as_str()),
            ));
        }

        if let Some(scheduled_at) = changes.scheduled_at {
            meeting.scheduled_at = scheduled_at;
        }
        if let Some(title) = changes.title {
            meeting.title = Some(title);
        }
        meeting.updated_at = Utc::now();

        self.meetings.update(&meeting).await?;
        Ok(meeting)
    }

    /// Put a topic on the meeting's agenda, scheduling it.
    pub async fn attach_topic(
        &self,
        caller: &User,
        meeting_id: Uuid,
        topic_id: Uuid,
    ) -> DomainResult<MeetingTopic> {
        let (_, relationship) = self.get_visible(caller, meeting_id).await?;

        let topic = self
            .topics
            .get(topic_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Topic", topic_id))?;
        // Agenda topics come from either party of the relationship
        if !relationship.involves(topic.user_id) {
            return Err(DomainError::not_found("Topic", topic_id));
        }

        self.meetings
            .attach_topic(meeting_id, topic_id, caller.id)
            .await
    }

    /// Take a topic off the agenda, returning it to the backlog. Once the
    /// meeting has completed its agenda is discussion history and stays put.
    pub async fn detach_topic(
        &self,
        caller: &User,
        meeting_id: Uuid,
        topic_id: Uuid,
    ) -> DomainResult<()> {
        let (meeting, _) = self.get_visible(caller, meeting_id).await?;
        if meeting.status != MeetingStatus::Scheduled {
            return Err(DomainError::invalid_state(
                "Meeting",
                meeting_id,
                format!("cannot modify the agenda of a {} meeting", meeting.status.as_str()),
            ));
        }
        self.meetings.detach_topic(meeting_id, topic_id).await
    }

    /// Set a resolution or move an agenda line; legal only while the
    /// meeting is still scheduled.
    pub async fn update_agenda_entry(
        &self,
        caller: &User,
        meeting_id: Uuid,
        topic_id: Uuid,
        resolution: Option<Resolution>,
        sort_order: Option<i64>,
    ) -> DomainResult<MeetingTopic> {
        let (meeting, _) = self.get_visible(caller, meeting_id).await?;
        if meeting.status != MeetingStatus::Scheduled {
            return Err(DomainError::invalid_state(
                "Meeting",
                meeting_id,
                format!("cannot edit the agenda of a {} meeting", meeting.status.as_str()),
            ));
        }
        self.meetings
            .update_agenda_entry(meeting_id, topic_id, resolution, sort_order)
            .await
    }

    /// Mark the meeting held; every attached topic becomes discussed.
    pub async fn complete(&self, caller: &User, id: Uuid) -> DomainResult<CompletionOutcome> {
        self.get_visible(caller, id).await?;
        self.meetings.complete(id).await
    }

    /// Cancel the meeting; attached topics fall back to the backlog.
    pub async fn cancel(&self, caller: &User, id: Uuid) -> DomainResult<Meeting> {
        self.get_visible(caller, id).await?;
        self.meetings.cancel(id).await
    }

    /// All attachments for a topic with their meetings, newest history
    /// included. Callers gate topic visibility before asking.
    pub async fn topic_attachments(
        &self,
        topic_id: Uuid,
    ) -> DomainResult<Vec<(MeetingTopic, Meeting)>> {
        let mut out = Vec::new();
        for entry in self.meetings.attachments_for_topic(topic_id).await? {
            if let Some(meeting) = self.meetings.get(entry.meeting_id).await? {
                out.push((entry, meeting));
            }
        }
        Ok(out)
    }

    pub async fn get_notes(&self, caller: &User, id: Uuid) -> DomainResult<Option<MeetingNotes>> {
        self.get_visible(caller, id).await?;
        self.meetings.get_notes(id).await
    }

    /// Replace the shared notes blob; last write wins. Frozen once the
    /// meeting is completed.
    pub async fn update_notes(
        &self,
        caller: &User,
        id: Uuid,
        content: Value,
    ) -> DomainResult<MeetingNotes> {
        let (meeting, _) = self.get_visible(caller, id).await?;
        if meeting.status == MeetingStatus::Completed {
            return Err(DomainError::invalid_state(
                "Meeting",
                id,
                "notes are frozen once the meeting is completed",
            ));
        }

        let notes = MeetingNotes {
            meeting_id: id,
            content,
            last_edited_by: Some(caller.id),
            last_edited_at: Utc::now(),
        };
        self.meetings.upsert_notes(&notes).await?;
        Ok(notes)
    }

    async fn get_visible(&self, caller: &User, id: Uuid) -> DomainResult<(Meeting, Relationship)> {
        let meeting = self
            .meetings
            .get(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Meeting", id))?;
        let relationship = self
            .relationships
            .get(meeting.relationship_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Meeting", id))?;
        // Outsiders see not-found, never a permission error
        if !relationship.involves(caller.id) {
            return Err(DomainError::not_found("Meeting", id));
        }
        Ok((meeting, relationship))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    use crate::adapters::sqlite::{
        create_migrated_test_pool, SqliteMeetingRepository, SqliteRelationshipRepository,
        SqliteTopicRepository, SqliteUserRepository,
    };
    use crate::domain::models::{Role, TopicStatus};
    use crate::domain::ports::UserRepository;

    struct Harness {
        service: MeetingService,
        topics: Arc<SqliteTopicRepository>,
        leader: User,
        ic: User,
        outsider: User,
    }

    async fn setup() -> Harness {
        let pool = create_migrated_test_pool().await.unwrap();
        let users = SqliteUserRepository::new(pool.clone());

        let leader = User::new("Lead", "lead@example.com", Role::Leader);
        let ic = User::new("Report", "report@example.com", Role::Ic);
        let outsider = User::new("Other", "other@example.com", Role::Leader);
        users.create(&leader).await.unwrap();
        users.create(&ic).await.unwrap();
        users.create(&outsider).await.unwrap();

        let relationships = SqliteRelationshipRepository::new(pool.clone());
        relationships
            .create(&Relationship::new(leader.id, ic.id))
            .await
            .unwrap();

        let topics = Arc::new(SqliteTopicRepository::new(pool.clone()));
        Harness {
            service: MeetingService::new(
                Arc::new(SqliteMeetingRepository::new(pool)),
                topics.clone(),
                Arc::new(relationships),
            ),
            topics,
            leader,
            ic,
            outsider,
        }
    }

    #[tokio::test]
    async fn test_create_requires_relationship() {
        let h = setup().await;
        let err = h
            .service
            .create(&h.outsider, h.ic.id, Utc::now(), None)
            .await;
        assert!(matches!(err, Err(DomainError::NotFound { .. })));

        let meeting = h
            .service
            .create(&h.leader, h.ic.id, Utc::now(), Some("Weekly sync".into()))
            .await
            .unwrap();
        assert_eq!(meeting.status, MeetingStatus::Scheduled);
        assert_eq!(meeting.title.as_deref(), Some("Weekly sync"));
    }

    #[tokio::test]
    async fn test_generate_uses_injected_clock() {
        let h = setup().await;
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap();

        let meetings = h
            .service
            .generate_at(now, &h.leader, h.ic.id, Frequency::Weekly, 1, "10:00", 3)
            .await
            .unwrap();

        let expected = vec![
            Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 1, 8, 10, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap(),
        ];
        let actual: Vec<_> = meetings.iter().map(|m| m.scheduled_at).collect();
        assert_eq!(actual, expected);

        let listed = h.service.list(&h.ic, None, None).await.unwrap();
        assert_eq!(listed.len(), 3);
        assert!(listed.iter().all(|m| m.status == MeetingStatus::Scheduled));
    }

    #[tokio::test]
    async fn test_outsider_cannot_see_meeting() {
        let h = setup().await;
        let meeting = h
            .service
            .create(&h.leader, h.ic.id, Utc::now(), None)
            .await
            .unwrap();

        assert!(matches!(
            h.service.get_detail(&h.outsider, meeting.id).await,
            Err(DomainError::NotFound { .. })
        ));
        assert!(h.service.list(&h.outsider, None, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_rejected_after_completion() {
        let h = setup().await;
        let meeting = h
            .service
            .create(&h.leader, h.ic.id, Utc::now(), None)
            .await
            .unwrap();
        h.service.complete(&h.leader, meeting.id).await.unwrap();

        let err = h
            .service
            .update(
                &h.leader,
                meeting.id,
                MeetingUpdate {
                    scheduled_at: Some(Utc::now()),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(err, Err(DomainError::InvalidState { .. })));
    }

    #[tokio::test]
    async fn test_notes_frozen_after_completion() {
        let h = setup().await;
        let meeting = h
            .service
            .create(&h.leader, h.ic.id, Utc::now(), None)
            .await
            .unwrap();

        let notes = h
            .service
            .update_notes(&h.ic, meeting.id, serde_json::json!([{"type": "paragraph"}]))
            .await
            .unwrap();
        assert_eq!(notes.last_edited_by, Some(h.ic.id));

        h.service.complete(&h.leader, meeting.id).await.unwrap();
        let err = h
            .service
            .update_notes(&h.leader, meeting.id, serde_json::json!([]))
            .await;
        assert!(matches!(err, Err(DomainError::InvalidState { .. })));

        // Reads still work on the frozen record
        let detail = h.service.get_detail(&h.ic, meeting.id).await.unwrap();
        assert!(detail.notes.is_some());
    }

    #[tokio::test]
    async fn test_agenda_round_trip_through_service() {
        let h = setup().await;
        let meeting = h
            .service
            .create(&h.leader, h.ic.id, Utc::now(), None)
            .await
            .unwrap();

        let topic = crate::domain::models::Topic::new(h.ic.id, "Career path");
        h.topics.create(&topic).await.unwrap();

        h.service
            .attach_topic(&h.leader, meeting.id, topic.id)
            .await
            .unwrap();

        let detail = h.service.get_detail(&h.ic, meeting.id).await.unwrap();
        assert_eq!(detail.agenda.len(), 1);
        assert_eq!(detail.agenda[0].topic.status, TopicStatus::Scheduled);

        h.service
            .update_agenda_entry(&h.ic, meeting.id, topic.id, Some(Resolution::Done), None)
            .await
            .unwrap();

        let outcome = h.service.complete(&h.leader, meeting.id).await.unwrap();
        assert_eq!(outcome.unresolved_topics, 0);
    }

    #[tokio::test]
    async fn test_detach_rejected_after_completion() {
        let h = setup().await;
        let meeting = h
            .service
            .create(&h.leader, h.ic.id, Utc::now(), None)
            .await
            .unwrap();

        let topic = crate::domain::models::Topic::new(h.ic.id, "On the record");
        h.topics.create(&topic).await.unwrap();
        h.service
            .attach_topic(&h.leader, meeting.id, topic.id)
            .await
            .unwrap();
        h.service.complete(&h.leader, meeting.id).await.unwrap();

        let err = h.service.detach_topic(&h.ic, meeting.id, topic.id).await;
        assert!(matches!(err, Err(DomainError::InvalidState { .. })));

        // The discussion record survives intact
        let detail = h.service.get_detail(&h.ic, meeting.id).await.unwrap();
        assert_eq!(detail.agenda.len(), 1);
        assert_eq!(detail.agenda[0].topic.status, TopicStatus::Discussed);
    }

    #[tokio::test]
    async fn test_attach_foreign_topic_is_not_found() {
        let h = setup().await;
        let meeting = h
            .service
            .create(&h.leader, h.ic.id, Utc::now(), None)
            .await
            .unwrap();

        let foreign = crate::domain::models::Topic::new(h.outsider.id, "Not ours");
        h.topics.create(&foreign).await.unwrap();

        let err = h
            .service
            .attach_topic(&h.leader, meeting.id, foreign.id)
            .await;
        assert!(matches!(err, Err(DomainError::NotFound { .. })));
    }
}
