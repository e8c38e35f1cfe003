//! SQLite implementation of the MeetingRepository.
//!
//! Attach, detach, complete, and cancel are the four operations that touch
//! both the meetings and topics tables; each runs as a single transaction
//! so the topic-status invariant cannot be observed half-applied.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::adapters::sqlite::{parse_datetime, parse_optional_datetime, parse_uuid};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{Meeting, MeetingNotes, MeetingStatus, MeetingTopic, Resolution};
use crate::domain::ports::{CompletionOutcome, MeetingFilter, MeetingRepository};

#[derive(Clone)]
pub struct SqliteMeetingRepository {
    pool: SqlitePool,
}

impl SqliteMeetingRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MeetingRepository for SqliteMeetingRepository {
    async fn create(&self, meeting: &Meeting) -> DomainResult<()> {
        sqlx::query(
            r#"INSERT INTO meetings (id, relationship_id, title, scheduled_at, status,
               created_by, completed_at, created_at, updated_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(meeting.id.to_string())
        .bind(meeting.relationship_id.to_string())
        .bind(&meeting.title)
        .bind(meeting.scheduled_at.to_rfc3339())
        .bind(meeting.status.as_str())
        .bind(meeting.created_by.to_string())
        .bind(meeting.completed_at.map(|t| t.to_rfc3339()))
        .bind(meeting.created_at.to_rfc3339())
        .bind(meeting.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn create_many(&self, meetings: &[Meeting]) -> DomainResult<()> {
        let mut tx = self.pool.begin().await?;
        for meeting in meetings {
            sqlx::query(
                r#"INSERT INTO meetings (id, relationship_id, title, scheduled_at, status,
                   created_by, completed_at, created_at, updated_at)
                   VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
            )
            .bind(meeting.id.to_string())
            .bind(meeting.relationship_id.to_string())
            .bind(&meeting.title)
            .bind(meeting.scheduled_at.to_rfc3339())
            .bind(meeting.status.as_str())
            .bind(meeting.created_by.to_string())
            .bind(meeting.completed_at.map(|t| t.to_rfc3339()))
            .bind(meeting.created_at.to_rfc3339())
            .bind(meeting.updated_at.to_rfc3339())
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn get(&self, id: Uuid) -> DomainResult<Option<Meeting>> {
        let row: Option<MeetingRow> = sqlx::query_as("SELECT * FROM meetings WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;
        row.map(TryInto::try_into).transpose()
    }

    async fn update(&self, meeting: &Meeting) -> DomainResult<()> {
        let result = sqlx::query(
            r#"UPDATE meetings SET title = ?, scheduled_at = ?, status = ?,
               completed_at = ?, updated_at = ? WHERE id = ?"#,
        )
        .bind(&meeting.title)
        .bind(meeting.scheduled_at.to_rfc3339())
        .bind(meeting.status.as_str())
        .bind(meeting.completed_at.map(|t| t.to_rfc3339()))
        .bind(meeting.updated_at.to_rfc3339())
        .bind(meeting.id.to_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("Meeting", meeting.id));
        }
        Ok(())
    }

    async fn list(&self, filter: MeetingFilter) -> DomainResult<Vec<Meeting>> {
        let mut query = String::from(
            "SELECT meetings.* FROM meetings
             JOIN relationships r ON r.id = meetings.relationship_id
             WHERE 1=1",
        );
        let mut bindings: Vec<String> = Vec::new();

        if let Some(relationship_id) = &filter.relationship_id {
            query.push_str(" AND meetings.relationship_id = ?");
            bindings.push(relationship_id.to_string());
        }
        if let Some(user_id) = &filter.involving_user {
            query.push_str(" AND (r.leader_id = ? OR r.ic_id = ?)");
            bindings.push(user_id.to_string());
            bindings.push(user_id.to_string());
        }
        if let Some(status) = &filter.status {
            query.push_str(" AND meetings.status = ?");
            bindings.push(status.as_str().to_string());
        }
        if let Some(after) = &filter.scheduled_after {
            query.push_str(" AND meetings.scheduled_at >= ?");
            bindings.push(after.to_rfc3339());
        }
        if let Some(before) = &filter.scheduled_before {
            query.push_str(" AND meetings.scheduled_at < ?");
            bindings.push(before.to_rfc3339());
        }

        query.push_str(" ORDER BY meetings.scheduled_at");

        let mut q = sqlx::query_as::<_, MeetingRow>(&query);
        for binding in &bindings {
            q = q.bind(binding);
        }

        let rows: Vec<MeetingRow> = q.fetch_all(&self.pool).await?;
        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn agenda(&self, meeting_id: Uuid) -> DomainResult<Vec<MeetingTopic>> {
        let rows: Vec<MeetingTopicRow> = sqlx::query_as(
            "SELECT * FROM meeting_topics WHERE meeting_id = ? ORDER BY sort_order",
        )
        .bind(meeting_id.to_string())
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn active_attachment(&self, topic_id: Uuid) -> DomainResult<Option<MeetingTopic>> {
        let row: Option<MeetingTopicRow> = sqlx::query_as(
            r#"SELECT mt.* FROM meeting_topics mt
               JOIN meetings m ON m.id = mt.meeting_id
               WHERE mt.topic_id = ? AND m.status != 'cancelled'"#,
        )
        .bind(topic_id.to_string())
        .fetch_optional(&self.pool)
        .await?;
        row.map(TryInto::try_into).transpose()
    }

    async fn attachments_for_topic(&self, topic_id: Uuid) -> DomainResult<Vec<MeetingTopic>> {
        let rows: Vec<MeetingTopicRow> = sqlx::query_as(
            "SELECT * FROM meeting_topics WHERE topic_id = ? ORDER BY created_at",
        )
        .bind(topic_id.to_string())
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn attach_topic(
        &self,
        meeting_id: Uuid,
        topic_id: Uuid,
        added_by: Uuid,
    ) -> DomainResult<MeetingTopic> {
        let mut tx = self.pool.begin().await?;

        let meeting: Option<(String,)> = sqlx::query_as("SELECT status FROM meetings WHERE id = ?")
            .bind(meeting_id.to_string())
            .fetch_optional(&mut *tx)
            .await?;
        match meeting.as_ref() {
            None => return Err(DomainError::not_found("Meeting", meeting_id)),
            Some((status,)) if status != "scheduled" => {
                return Err(DomainError::invalid_state(
                    "Meeting",
                    meeting_id,
                    format!("cannot modify the agenda of a {status} meeting"),
                ));
            }
            Some(_) => {}
        }

        let topic: Option<(String,)> = sqlx::query_as("SELECT status FROM topics WHERE id = ?")
            .bind(topic_id.to_string())
            .fetch_optional(&mut *tx)
            .await?;
        let Some((topic_status,)) = topic else {
            return Err(DomainError::not_found("Topic", topic_id));
        };

        let active: (i64,) = sqlx::query_as(
            r#"SELECT COUNT(*) FROM meeting_topics mt
               JOIN meetings m ON m.id = mt.meeting_id
               WHERE mt.topic_id = ? AND m.status != 'cancelled'"#,
        )
        .bind(topic_id.to_string())
        .fetch_one(&mut *tx)
        .await?;
        if active.0 > 0 {
            return Err(DomainError::invalid_state(
                "Topic",
                topic_id,
                "already attached to a meeting",
            ));
        }

        // Status guard doubles as the race arbiter: of two concurrent
        // attaches, exactly one flips backlog -> scheduled here.
        let flipped = sqlx::query(
            "UPDATE topics SET status = 'scheduled', updated_at = ? WHERE id = ? AND status = 'backlog'",
        )
        .bind(Utc::now().to_rfc3339())
        .bind(topic_id.to_string())
        .execute(&mut *tx)
        .await?;
        if flipped.rows_affected() == 0 {
            if topic_status == "backlog" {
                return Err(DomainError::Conflict(format!(
                    "Topic {topic_id} was scheduled by a concurrent request"
                )));
            }
            return Err(DomainError::invalid_state(
                "Topic",
                topic_id,
                format!("cannot schedule a {topic_status} topic"),
            ));
        }

        let next_order: (i64,) = sqlx::query_as(
            "SELECT COALESCE(MAX(sort_order), -1) + 1 FROM meeting_topics WHERE meeting_id = ?",
        )
        .bind(meeting_id.to_string())
        .fetch_one(&mut *tx)
        .await?;

        let entry = MeetingTopic {
            meeting_id,
            topic_id,
            added_by,
            resolution: None,
            sort_order: next_order.0,
            created_at: Utc::now(),
        };

        sqlx::query(
            r#"INSERT INTO meeting_topics (meeting_id, topic_id, added_by, resolution,
               sort_order, created_at)
               VALUES (?, ?, ?, ?, ?, ?)"#,
        )
        .bind(entry.meeting_id.to_string())
        .bind(entry.topic_id.to_string())
        .bind(entry.added_by.to_string())
        .bind(entry.resolution.map(|r| r.as_str()))
        .bind(entry.sort_order)
        .bind(entry.created_at.to_rfc3339())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(entry)
    }

    async fn detach_topic(&self, meeting_id: Uuid, topic_id: Uuid) -> DomainResult<()> {
        let mut tx = self.pool.begin().await?;

        let deleted = sqlx::query(
            "DELETE FROM meeting_topics WHERE meeting_id = ? AND topic_id = ?",
        )
        .bind(meeting_id.to_string())
        .bind(topic_id.to_string())
        .execute(&mut *tx)
        .await?;
        if deleted.rows_affected() == 0 {
            return Err(DomainError::not_found("Topic", topic_id));
        }

        let remaining: (i64,) = sqlx::query_as(
            r#"SELECT COUNT(*) FROM meeting_topics mt
               JOIN meetings m ON m.id = mt.meeting_id
               WHERE mt.topic_id = ? AND m.status != 'cancelled'"#,
        )
        .bind(topic_id.to_string())
        .fetch_one(&mut *tx)
        .await?;

        if remaining.0 == 0 {
            sqlx::query(
                "UPDATE topics SET status = 'backlog', updated_at = ? WHERE id = ? AND status = 'scheduled'",
            )
            .bind(Utc::now().to_rfc3339())
            .bind(topic_id.to_string())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn update_agenda_entry(
        &self,
        meeting_id: Uuid,
        topic_id: Uuid,
        resolution: Option<Resolution>,
        sort_order: Option<i64>,
    ) -> DomainResult<MeetingTopic> {
        let row: Option<MeetingTopicRow> = sqlx::query_as(
            "SELECT * FROM meeting_topics WHERE meeting_id = ? AND topic_id = ?",
        )
        .bind(meeting_id.to_string())
        .bind(topic_id.to_string())
        .fetch_optional(&self.pool)
        .await?;
        let Some(row) = row else {
            return Err(DomainError::not_found("Topic", topic_id));
        };
        let mut entry: MeetingTopic = row.try_into()?;

        if let Some(resolution) = resolution {
            entry.resolution = Some(resolution);
        }
        if let Some(sort_order) = sort_order {
            entry.sort_order = sort_order;
        }

        sqlx::query(
            "UPDATE meeting_topics SET resolution = ?, sort_order = ? WHERE meeting_id = ? AND topic_id = ?",
        )
        .bind(entry.resolution.map(|r| r.as_str()))
        .bind(entry.sort_order)
        .bind(meeting_id.to_string())
        .bind(topic_id.to_string())
        .execute(&self.pool)
        .await?;

        Ok(entry)
    }

    async fn complete(&self, meeting_id: Uuid) -> DomainResult<CompletionOutcome> {
        let mut tx = self.pool.begin().await?;
        let now = Utc::now();

        let flipped = sqlx::query(
            r#"UPDATE meetings SET status = 'completed', completed_at = ?, updated_at = ?
               WHERE id = ? AND status = 'scheduled'"#,
        )
        .bind(now.to_rfc3339())
        .bind(now.to_rfc3339())
        .bind(meeting_id.to_string())
        .execute(&mut *tx)
        .await?;
        if flipped.rows_affected() == 0 {
            return Err(Self::status_guard_error(&mut tx, meeting_id, "complete").await?);
        }

        sqlx::query(
            r#"UPDATE topics SET status = 'discussed', discussed_at = ?, updated_at = ?
               WHERE status = 'scheduled'
                 AND id IN (SELECT topic_id FROM meeting_topics WHERE meeting_id = ?)"#,
        )
        .bind(now.to_rfc3339())
        .bind(now.to_rfc3339())
        .bind(meeting_id.to_string())
        .execute(&mut *tx)
        .await?;

        let unresolved: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM meeting_topics WHERE meeting_id = ? AND resolution IS NULL",
        )
        .bind(meeting_id.to_string())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        let meeting = self
            .get(meeting_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Meeting", meeting_id))?;

        Ok(CompletionOutcome {
            meeting,
            unresolved_topics: unresolved.0 as u64,
        })
    }

    async fn cancel(&self, meeting_id: Uuid) -> DomainResult<Meeting> {
        let mut tx = self.pool.begin().await?;
        let now = Utc::now();

        let flipped = sqlx::query(
            r#"UPDATE meetings SET status = 'cancelled', updated_at = ?
               WHERE id = ? AND status = 'scheduled'"#,
        )
        .bind(now.to_rfc3339())
        .bind(meeting_id.to_string())
        .execute(&mut *tx)
        .await?;
        if flipped.rows_affected() == 0 {
            return Err(Self::status_guard_error(&mut tx, meeting_id, "cancel").await?);
        }

        sqlx::query(
            r#"UPDATE topics SET status = 'backlog', updated_at = ?
               WHERE status = 'scheduled'
                 AND id IN (SELECT topic_id FROM meeting_topics WHERE meeting_id = ?)"#,
        )
        .bind(now.to_rfc3339())
        .bind(meeting_id.to_string())
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM meeting_topics WHERE meeting_id = ?")
            .bind(meeting_id.to_string())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        self.get(meeting_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Meeting", meeting_id))
    }

    async fn get_notes(&self, meeting_id: Uuid) -> DomainResult<Option<MeetingNotes>> {
        let row: Option<MeetingNotesRow> =
            sqlx::query_as("SELECT * FROM meeting_notes WHERE meeting_id = ?")
                .bind(meeting_id.to_string())
                .fetch_optional(&self.pool)
                .await?;
        row.map(TryInto::try_into).transpose()
    }

    async fn upsert_notes(&self, notes: &MeetingNotes) -> DomainResult<()> {
        sqlx::query(
            r#"INSERT INTO meeting_notes (meeting_id, content, last_edited_by, last_edited_at)
               VALUES (?, ?, ?, ?)
               ON CONFLICT(meeting_id) DO UPDATE SET
                   content = excluded.content,
                   last_edited_by = excluded.last_edited_by,
                   last_edited_at = excluded.last_edited_at"#,
        )
        .bind(notes.meeting_id.to_string())
        .bind(notes.content.to_string())
        .bind(notes.last_edited_by.map(|id| id.to_string()))
        .bind(notes.last_edited_at.to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

impl SqliteMeetingRepository {
    /// Distinguish not-found from wrong-status after a guarded UPDATE
    /// affected zero rows. Runs on the open transaction: the pool may have
    /// no free connection while the transaction holds one.
    async fn status_guard_error(
        tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
        meeting_id: Uuid,
        action: &str,
    ) -> DomainResult<DomainError> {
        let status: Option<(String,)> = sqlx::query_as("SELECT status FROM meetings WHERE id = ?")
            .bind(meeting_id.to_string())
            .fetch_optional(&mut **tx)
            .await?;
        Ok(match status {
            None => DomainError::not_found("Meeting", meeting_id),
            Some((status,)) => DomainError::invalid_state(
                "Meeting",
                meeting_id,
                format!("cannot {action} a {status} meeting"),
            ),
        })
    }
}

#[derive(sqlx::FromRow)]
struct MeetingRow {
    id: String,
    relationship_id: String,
    title: Option<String>,
    scheduled_at: String,
    status: String,
    created_by: String,
    completed_at: Option<String>,
    created_at: String,
    updated_at: String,
}

impl TryFrom<MeetingRow> for Meeting {
    type Error = DomainError;

    fn try_from(row: MeetingRow) -> Result<Self, Self::Error> {
        let status = MeetingStatus::from_str(&row.status)
            .ok_or_else(|| DomainError::Serialization(format!("Invalid status: {}", row.status)))?;

        Ok(Meeting {
            id: parse_uuid(&row.id)?,
            relationship_id: parse_uuid(&row.relationship_id)?,
            title: row.title,
            scheduled_at: parse_datetime(&row.scheduled_at)?,
            status,
            created_by: parse_uuid(&row.created_by)?,
            completed_at: parse_optional_datetime(row.completed_at)?,
            created_at: parse_datetime(&row.created_at)?,
            updated_at: parse_datetime(&row.updated_at)?,
        })
    }
}

#[derive(sqlx::FromRow)]
struct MeetingTopicRow {
    meeting_id: String,
    topic_id: String,
    added_by: String,
    resolution: Option<String>,
    sort_order: i64,
    created_at: String,
}

impl TryFrom<MeetingTopicRow> for MeetingTopic {
    type Error = DomainError;

    fn try_from(row: MeetingTopicRow) -> Result<Self, Self::Error> {
        let resolution = row
            .resolution
            .map(|s| {
                Resolution::from_str(&s)
                    .ok_or_else(|| DomainError::Serialization(format!("Invalid resolution: {s}")))
            })
            .transpose()?;

        Ok(MeetingTopic {
            meeting_id: parse_uuid(&row.meeting_id)?,
            topic_id: parse_uuid(&row.topic_id)?,
            added_by: parse_uuid(&row.added_by)?,
            resolution,
            sort_order: row.sort_order,
            created_at: parse_datetime(&row.created_at)?,
        })
    }
}

#[derive(sqlx::FromRow)]
struct MeetingNotesRow {
    meeting_id: String,
    content: String,
    last_edited_by: Option<String>,
    last_edited_at: String,
}

impl TryFrom<MeetingNotesRow> for MeetingNotes {
    type Error = DomainError;

    fn try_from(row: MeetingNotesRow) -> Result<Self, Self::Error> {
        let content = serde_json::from_str(&row.content)
            .map_err(|e| DomainError::Serialization(e.to_string()))?;

        Ok(MeetingNotes {
            meeting_id: parse_uuid(&row.meeting_id)?,
            content,
            last_edited_by: crate::adapters::sqlite::parse_optional_uuid(row.last_edited_by)?,
            last_edited_at: parse_datetime(&row.last_edited_at)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sqlite::{
        create_migrated_test_pool, SqliteRelationshipRepository, SqliteTopicRepository,
        SqliteUserRepository,
    };
    use crate::domain::models::{Relationship, Role, Topic, TopicStatus, User};
    use crate::domain::ports::{RelationshipRepository, TopicRepository, UserRepository};

    struct Fixture {
        meetings: SqliteMeetingRepository,
        topics: SqliteTopicRepository,
        leader: User,
        ic: User,
        relationship: Relationship,
    }

    async fn setup() -> Fixture {
        let pool = create_migrated_test_pool().await.unwrap();
        let users = SqliteUserRepository::new(pool.clone());
        let relationships = SqliteRelationshipRepository::new(pool.clone());

        let leader = User::new("Lead", "lead@example.com", Role::Leader);
        let ic = User::new("Report", "report@example.com", Role::Ic);
        users.create(&leader).await.unwrap();
        users.create(&ic).await.unwrap();

        let relationship = Relationship::new(leader.id, ic.id);
        relationships.create(&relationship).await.unwrap();

        Fixture {
            meetings: SqliteMeetingRepository::new(pool.clone()),
            topics: SqliteTopicRepository::new(pool),
            leader,
            ic,
            relationship,
        }
    }

    async fn make_meeting(f: &Fixture) -> Meeting {
        let meeting = Meeting::new(f.relationship.id, f.leader.id, Utc::now());
        f.meetings.create(&meeting).await.unwrap();
        meeting
    }

    async fn make_topic(f: &Fixture) -> Topic {
        let topic = Topic::new(f.ic.id, "Topic");
        f.topics.create(&topic).await.unwrap();
        topic
    }

    #[tokio::test]
    async fn test_attach_flips_topic_to_scheduled() {
        let f = setup().await;
        let meeting = make_meeting(&f).await;
        let topic = make_topic(&f).await;

        let entry = f
            .meetings
            .attach_topic(meeting.id, topic.id, f.ic.id)
            .await
            .unwrap();
        assert_eq!(entry.sort_order, 0);
        assert!(entry.resolution.is_none());

        let topic = f.topics.get(topic.id).await.unwrap().unwrap();
        assert_eq!(topic.status, TopicStatus::Scheduled);
    }

    #[tokio::test]
    async fn test_attach_twice_rejected() {
        let f = setup().await;
        let meeting = make_meeting(&f).await;
        let other = make_meeting(&f).await;
        let topic = make_topic(&f).await;

        f.meetings
            .attach_topic(meeting.id, topic.id, f.ic.id)
            .await
            .unwrap();

        let err = f.meetings.attach_topic(other.id, topic.id, f.ic.id).await;
        assert!(matches!(err, Err(DomainError::InvalidState { .. })));

        // The failed second attach leaves the first attachment intact
        let topic = f.topics.get(topic.id).await.unwrap().unwrap();
        assert_eq!(topic.status, TopicStatus::Scheduled);
        let active = f.meetings.active_attachment(topic.id).await.unwrap().unwrap();
        assert_eq!(active.meeting_id, meeting.id);
    }

    #[tokio::test]
    async fn test_detach_reverts_to_backlog_and_removes_row() {
        let f = setup().await;
        let meeting = make_meeting(&f).await;
        let topic = make_topic(&f).await;

        f.meetings
            .attach_topic(meeting.id, topic.id, f.ic.id)
            .await
            .unwrap();
        f.meetings.detach_topic(meeting.id, topic.id).await.unwrap();

        let topic = f.topics.get(topic.id).await.unwrap().unwrap();
        assert_eq!(topic.status, TopicStatus::Backlog);
        assert!(f.meetings.agenda(meeting.id).await.unwrap().is_empty());
        assert!(f
            .meetings
            .active_attachment(topic.id)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_complete_discusses_all_attached_topics() {
        let f = setup().await;
        let meeting = make_meeting(&f).await;

        let mut ids = Vec::new();
        for _ in 0..3 {
            let topic = make_topic(&f).await;
            f.meetings
                .attach_topic(meeting.id, topic.id, f.ic.id)
                .await
                .unwrap();
            ids.push(topic.id);
        }

        let outcome = f.meetings.complete(meeting.id).await.unwrap();
        assert_eq!(outcome.meeting.status, MeetingStatus::Completed);
        assert_eq!(outcome.unresolved_topics, 3);

        for id in ids {
            let topic = f.topics.get(id).await.unwrap().unwrap();
            assert_eq!(topic.status, TopicStatus::Discussed);
            assert!(topic.discussed_at.is_some());
        }

        // Completing again is an invalid state, not a crash
        let err = f.meetings.complete(meeting.id).await;
        assert!(matches!(err, Err(DomainError::InvalidState { .. })));
    }

    #[tokio::test]
    async fn test_complete_counts_only_unresolved() {
        let f = setup().await;
        let meeting = make_meeting(&f).await;

        let resolved = make_topic(&f).await;
        let open = make_topic(&f).await;
        f.meetings
            .attach_topic(meeting.id, resolved.id, f.ic.id)
            .await
            .unwrap();
        f.meetings
            .attach_topic(meeting.id, open.id, f.ic.id)
            .await
            .unwrap();
        f.meetings
            .update_agenda_entry(meeting.id, resolved.id, Some(Resolution::Done), None)
            .await
            .unwrap();

        let outcome = f.meetings.complete(meeting.id).await.unwrap();
        assert_eq!(outcome.unresolved_topics, 1);
    }

    #[tokio::test]
    async fn test_cancel_reverts_attached_topics() {
        let f = setup().await;
        let meeting = make_meeting(&f).await;
        let a = make_topic(&f).await;
        let b = make_topic(&f).await;

        f.meetings.attach_topic(meeting.id, a.id, f.ic.id).await.unwrap();
        f.meetings.attach_topic(meeting.id, b.id, f.ic.id).await.unwrap();

        let cancelled = f.meetings.cancel(meeting.id).await.unwrap();
        assert_eq!(cancelled.status, MeetingStatus::Cancelled);

        for id in [a.id, b.id] {
            let topic = f.topics.get(id).await.unwrap().unwrap();
            assert_eq!(topic.status, TopicStatus::Backlog);
        }
        assert!(f.meetings.agenda(meeting.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_terminal_meeting_guards_fail_fast() {
        let f = setup().await;
        let cancelled = make_meeting(&f).await;
        f.meetings.cancel(cancelled.id).await.unwrap();

        // Guarded updates on terminal meetings report the state, even on a
        // single-connection pool
        let err = f.meetings.cancel(cancelled.id).await;
        assert!(matches!(err, Err(DomainError::InvalidState { .. })));
        let err = f.meetings.complete(cancelled.id).await;
        assert!(matches!(err, Err(DomainError::InvalidState { .. })));

        let err = f.meetings.complete(Uuid::new_v4()).await;
        assert!(matches!(err, Err(DomainError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_attach_to_completed_meeting_rejected() {
        let f = setup().await;
        let meeting = make_meeting(&f).await;
        let topic = make_topic(&f).await;

        f.meetings.complete(meeting.id).await.unwrap();

        let err = f.meetings.attach_topic(meeting.id, topic.id, f.ic.id).await;
        assert!(matches!(err, Err(DomainError::InvalidState { .. })));
        // Topic untouched by the failed attach
        let topic = f.topics.get(topic.id).await.unwrap().unwrap();
        assert_eq!(topic.status, TopicStatus::Backlog);
    }

    #[tokio::test]
    async fn test_agenda_orders_append() {
        let f = setup().await;
        let meeting = make_meeting(&f).await;
        let a = make_topic(&f).await;
        let b = make_topic(&f).await;

        let first = f.meetings.attach_topic(meeting.id, a.id, f.ic.id).await.unwrap();
        let second = f.meetings.attach_topic(meeting.id, b.id, f.ic.id).await.unwrap();
        assert_eq!(first.sort_order, 0);
        assert_eq!(second.sort_order, 1);
    }

    #[tokio::test]
    async fn test_notes_last_write_wins() {
        let f = setup().await;
        let meeting = make_meeting(&f).await;

        let first = MeetingNotes {
            meeting_id: meeting.id,
            content: serde_json::json!([{"type": "paragraph", "text": "draft"}]),
            last_edited_by: Some(f.leader.id),
            last_edited_at: Utc::now(),
        };
        f.meetings.upsert_notes(&first).await.unwrap();

        let second = MeetingNotes {
            meeting_id: meeting.id,
            content: serde_json::json!([{"type": "paragraph", "text": "final"}]),
            last_edited_by: Some(f.ic.id),
            last_edited_at: Utc::now(),
        };
        f.meetings.upsert_notes(&second).await.unwrap();

        let notes = f.meetings.get_notes(meeting.id).await.unwrap().unwrap();
        assert_eq!(notes.content, second.content);
        assert_eq!(notes.last_edited_by, Some(f.ic.id));
    }
}
