//! SQLite implementation of the RelationshipRepository.

use async_trait::async_trait;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::adapters::sqlite::{parse_datetime, parse_uuid};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::Relationship;
use crate::domain::ports::RelationshipRepository;

#[derive(Clone)]
pub struct SqliteRelationshipRepository {
    pool: SqlitePool,
}

impl SqliteRelationshipRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RelationshipRepository for SqliteRelationshipRepository {
    async fn create(&self, relationship: &Relationship) -> DomainResult<()> {
        sqlx::query(
            r#"INSERT INTO relationships (id, leader_id, ic_id, created_at)
               VALUES (?, ?, ?, ?)"#,
        )
        .bind(relationship.id.to_string())
        .bind(relationship.leader_id.to_string())
        .bind(relationship.ic_id.to_string())
        .bind(relationship.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get(&self, id: Uuid) -> DomainResult<Option<Relationship>> {
        let row: Option<RelationshipRow> =
            sqlx::query_as("SELECT * FROM relationships WHERE id = ?")
                .bind(id.to_string())
                .fetch_optional(&self.pool)
                .await?;
        row.map(TryInto::try_into).transpose()
    }

    async fn get_pair(&self, leader_id: Uuid, ic_id: Uuid) -> DomainResult<Option<Relationship>> {
        let row: Option<RelationshipRow> =
            sqlx::query_as("SELECT * FROM relationships WHERE leader_id = ? AND ic_id = ?")
                .bind(leader_id.to_string())
                .bind(ic_id.to_string())
                .fetch_optional(&self.pool)
                .await?;
        row.map(TryInto::try_into).transpose()
    }

    async fn list_for_user(&self, user_id: Uuid) -> DomainResult<Vec<Relationship>> {
        let rows: Vec<RelationshipRow> = sqlx::query_as(
            "SELECT * FROM relationships WHERE leader_id = ? OR ic_id = ? ORDER BY created_at",
        )
        .bind(user_id.to_string())
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(TryInto::try_into).collect()
    }
}

#[derive(sqlx::FromRow)]
struct RelationshipRow {
    id: String,
    leader_id: String,
    ic_id: String,
    created_at: String,
}

impl TryFrom<RelationshipRow> for Relationship {
    type Error = DomainError;

    fn try_from(row: RelationshipRow) -> Result<Self, Self::Error> {
        Ok(Relationship {
            id: parse_uuid(&row.id)?,
            leader_id: parse_uuid(&row.leader_id)?,
            ic_id: parse_uuid(&row.ic_id)?,
            created_at: parse_datetime(&row.created_at)?,
        })
    }
}
