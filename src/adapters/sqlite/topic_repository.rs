//! SQLite implementation of the TopicRepository.

use async_trait::async_trait;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::adapters::sqlite::{
    parse_datetime, parse_optional_datetime, parse_optional_json, parse_optional_uuid, parse_uuid,
};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{Topic, TopicStatus};
use crate::domain::ports::{TopicFilter, TopicRepository};

#[derive(Clone)]
pub struct SqliteTopicRepository {
    pool: SqlitePool,
}

impl SqliteTopicRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TopicRepository for SqliteTopicRepository {
    async fn create(&self, topic: &Topic) -> DomainResult<()> {
        let content_json = topic.content.as_ref().map(serde_json::Value::to_string);

        sqlx::query(
            r#"INSERT INTO topics (id, user_id, about_ic_id, title, content, label_id,
               status, sort_order, discussed_at, created_at, updated_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(topic.id.to_string())
        .bind(topic.user_id.to_string())
        .bind(topic.about_ic_id.map(|id| id.to_string()))
        .bind(&topic.title)
        .bind(content_json)
        .bind(topic.label_id.map(|id| id.to_string()))
        .bind(topic.status.as_str())
        .bind(topic.sort_order)
        .bind(topic.discussed_at.map(|t| t.to_rfc3339()))
        .bind(topic.created_at.to_rfc3339())
        .bind(topic.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get(&self, id: Uuid) -> DomainResult<Option<Topic>> {
        let row: Option<TopicRow> = sqlx::query_as("SELECT * FROM topics WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;
        row.map(TryInto::try_into).transpose()
    }

    async fn update(&self, topic: &Topic) -> DomainResult<()> {
        let content_json = topic.content.as_ref().map(serde_json::Value::to_string);

        let result = sqlx::query(
            r#"UPDATE topics SET title = ?, content = ?, label_id = ?, status = ?,
               sort_order = ?, discussed_at = ?, updated_at = ?
               WHERE id = ?"#,
        )
        .bind(&topic.title)
        .bind(content_json)
        .bind(topic.label_id.map(|id| id.to_string()))
        .bind(topic.status.as_str())
        .bind(topic.sort_order)
        .bind(topic.discussed_at.map(|t| t.to_rfc3339()))
        .bind(topic.updated_at.to_rfc3339())
        .bind(topic.id.to_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("Topic", topic.id));
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> DomainResult<()> {
        let result = sqlx::query("DELETE FROM topics WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("Topic", id));
        }
        Ok(())
    }

    async fn list(&self, filter: TopicFilter) -> DomainResult<Vec<Topic>> {
        let mut query = String::from("SELECT * FROM topics WHERE 1=1");
        let mut bindings: Vec<String> = Vec::new();

        if let Some(user_id) = &filter.user_id {
            query.push_str(" AND user_id = ?");
            bindings.push(user_id.to_string());
        }
        if let Some(status) = &filter.status {
            query.push_str(" AND status = ?");
            bindings.push(status.as_str().to_string());
        }
        if let Some(label_id) = &filter.label_id {
            query.push_str(" AND label_id = ?");
            bindings.push(label_id.to_string());
        }
        if let Some(about_ic_id) = &filter.about_ic_id {
            query.push_str(" AND about_ic_id = ?");
            bindings.push(about_ic_id.to_string());
        }

        // Ordering follows the lifecycle view: backlog is hand-ordered,
        // scheduled follows the upcoming meeting, discussed is a history.
        match filter.status {
            Some(TopicStatus::Backlog) => query.push_str(" ORDER BY sort_order"),
            Some(TopicStatus::Scheduled) => query.push_str(
                " ORDER BY (SELECT MIN(m.scheduled_at) FROM meeting_topics mt
                   JOIN meetings m ON m.id = mt.meeting_id
                   WHERE mt.topic_id = topics.id AND m.status = 'scheduled')",
            ),
            Some(TopicStatus::Discussed) => query.push_str(" ORDER BY discussed_at DESC"),
            _ => query.push_str(" ORDER BY created_at DESC"),
        }

        let mut q = sqlx::query_as::<_, TopicRow>(&query);
        for binding in &bindings {
            q = q.bind(binding);
        }

        let rows: Vec<TopicRow> = q.fetch_all(&self.pool).await?;
        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn next_sort_order(
        &self,
        user_id: Uuid,
        about_ic_id: Option<Uuid>,
    ) -> DomainResult<i64> {
        let result: (i64,) = sqlx::query_as(
            r#"SELECT COALESCE(MAX(sort_order), -1) + 1 FROM topics
               WHERE user_id = ? AND about_ic_id IS ? AND status = 'backlog'"#,
        )
        .bind(user_id.to_string())
        .bind(about_ic_id.map(|id| id.to_string()))
        .fetch_one(&self.pool)
        .await?;
        Ok(result.0)
    }

    async fn set_sort_order(&self, id: Uuid, sort_order: i64) -> DomainResult<()> {
        let result = sqlx::query("UPDATE topics SET sort_order = ?, updated_at = ? WHERE id = ?")
            .bind(sort_order)
            .bind(chrono::Utc::now().to_rfc3339())
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("Topic", id));
        }
        Ok(())
    }
}

#[derive(sqlx::FromRow)]
struct TopicRow {
    id: String,
    user_id: String,
    about_ic_id: Option<String>,
    title: String,
    content: Option<String>,
    label_id: Option<String>,
    status: String,
    sort_order: i64,
    discussed_at: Option<String>,
    created_at: String,
    updated_at: String,
}

impl TryFrom<TopicRow> for Topic {
    type Error = DomainError;

    fn try_from(row: TopicRow) -> Result<Self, Self::Error> {
        let status = TopicStatus::from_str(&row.status)
            .ok_or_else(|| DomainError::Serialization(format!("Invalid status: {}", row.status)))?;

        Ok(Topic {
            id: parse_uuid(&row.id)?,
            user_id: parse_uuid(&row.user_id)?,
            about_ic_id: parse_optional_uuid(row.about_ic_id)?,
            title: row.title,
            content: parse_optional_json(row.content)?,
            label_id: parse_optional_uuid(row.label_id)?,
            status,
            sort_order: row.sort_order,
            discussed_at: parse_optional_datetime(row.discussed_at)?,
            created_at: parse_datetime(&row.created_at)?,
            updated_at: parse_datetime(&row.updated_at)?,
        })
    }
}
