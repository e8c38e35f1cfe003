//! SQLite implementation of the ThoughtRepository.

use async_trait::async_trait;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::adapters::sqlite::{parse_datetime, parse_optional_json, parse_optional_uuid, parse_uuid};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{Thought, Topic};
use crate::domain::ports::ThoughtRepository;

#[derive(Clone)]
pub struct SqliteThoughtRepository {
    pool: SqlitePool,
}

impl SqliteThoughtRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ThoughtRepository for SqliteThoughtRepository {
    async fn create(&self, thought: &Thought) -> DomainResult<()> {
        let content_json = thought.content.as_ref().map(serde_json::Value::to_string);

        sqlx::query(
            r#"INSERT INTO thoughts (id, user_id, about_ic_id, title, content, label_id,
               created_at, updated_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(thought.id.to_string())
        .bind(thought.user_id.to_string())
        .bind(thought.about_ic_id.map(|id| id.to_string()))
        .bind(&thought.title)
        .bind(content_json)
        .bind(thought.label_id.map(|id| id.to_string()))
        .bind(thought.created_at.to_rfc3339())
        .bind(thought.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get(&self, id: Uuid) -> DomainResult<Option<Thought>> {
        let row: Option<ThoughtRow> = sqlx::query_as("SELECT * FROM thoughts WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;
        row.map(TryInto::try_into).transpose()
    }

    async fn update(&self, thought: &Thought) -> DomainResult<()> {
        let content_json = thought.content.as_ref().map(serde_json::Value::to_string);

        let result = sqlx::query(
            r#"UPDATE thoughts SET title = ?, content = ?, label_id = ?, about_ic_id = ?,
               updated_at = ? WHERE id = ?"#,
        )
        .bind(&thought.title)
        .bind(content_json)
        .bind(thought.label_id.map(|id| id.to_string()))
        .bind(thought.about_ic_id.map(|id| id.to_string()))
        .bind(thought.updated_at.to_rfc3339())
        .bind(thought.id.to_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("Thought", thought.id));
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> DomainResult<()> {
        let result = sqlx::query("DELETE FROM thoughts WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("Thought", id));
        }
        Ok(())
    }

    async fn list_for_user(&self, user_id: Uuid) -> DomainResult<Vec<Thought>> {
        let rows: Vec<ThoughtRow> =
            sqlx::query_as("SELECT * FROM thoughts WHERE user_id = ? ORDER BY created_at DESC")
                .bind(user_id.to_string())
                .fetch_all(&self.pool)
                .await?;
        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn promote(&self, thought_id: Uuid, topic: &Topic) -> DomainResult<()> {
        let mut tx = self.pool.begin().await?;

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
        .execute(&mut *tx)
        .await?;

        let deleted = sqlx::query("DELETE FROM thoughts WHERE id = ?")
            .bind(thought_id.to_string())
            .execute(&mut *tx)
            .await?;

        if deleted.rows_affected() == 0 {
            // Concurrent promotion already consumed the thought; roll back
            // the topic insert by dropping the transaction.
            tx.rollback().await?;
            return Err(DomainError::Conflict(format!(
                "Thought {thought_id} was already promoted or deleted"
            )));
        }

        tx.commit().await?;
        Ok(())
    }
}

#[derive(sqlx::FromRow)]
struct ThoughtRow {
    id: String,
    user_id: String,
    about_ic_id: Option<String>,
    title: String,
    content: Option<String>,
    label_id: Option<String>,
    created_at: String,
    updated_at: String,
}

impl TryFrom<ThoughtRow> for Thought {
    type Error = DomainError;

    fn try_from(row: ThoughtRow) -> Result<Self, Self::Error> {
        Ok(Thought {
            id: parse_uuid(&row.id)?,
            user_id: parse_uuid(&row.user_id)?,
            about_ic_id: parse_optional_uuid(row.about_ic_id)?,
            title: row.title,
            content: parse_optional_json(row.content)?,
            label_id: parse_optional_uuid(row.label_id)?,
            created_at: parse_datetime(&row.created_at)?,
            updated_at: parse_datetime(&row.updated_at)?,
        })
    }
}
