//! SQLite implementation of the LabelRepository.

use async_trait::async_trait;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::adapters::sqlite::{parse_datetime, parse_uuid};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::Label;
use crate::domain::ports::LabelRepository;

#[derive(Clone)]
pub struct SqliteLabelRepository {
    pool: SqlitePool,
}

impl SqliteLabelRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LabelRepository for SqliteLabelRepository {
    async fn create(&self, label: &Label) -> DomainResult<()> {
        sqlx::query("INSERT INTO labels (id, name, color, created_at) VALUES (?, ?, ?, ?)")
            .bind(label.id.to_string())
            .bind(&label.name)
            .bind(&label.color)
            .bind(label.created_at.to_rfc3339())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn get(&self, id: Uuid) -> DomainResult<Option<Label>> {
        let row: Option<LabelRow> = sqlx::query_as("SELECT * FROM labels WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;
        row.map(TryInto::try_into).transpose()
    }

    async fn list(&self) -> DomainResult<Vec<Label>> {
        let rows: Vec<LabelRow> = sqlx::query_as("SELECT * FROM labels ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(TryInto::try_into).collect()
    }
}

#[derive(sqlx::FromRow)]
struct LabelRow {
    id: String,
    name: String,
    color: String,
    created_at: String,
}

impl TryFrom<LabelRow> for Label {
    type Error = DomainError;

    fn try_from(row: LabelRow) -> Result<Self, Self::Error> {
        Ok(Label {
            id: parse_uuid(&row.id)?,
            name: row.name,
            color: row.color,
            created_at: parse_datetime(&row.created_at)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sqlite::create_migrated_test_pool;

    #[tokio::test]
    async fn test_create_list_ordered_by_name() {
        let pool = create_migrated_test_pool().await.unwrap();
        let repo = SqliteLabelRepository::new(pool);

        repo.create(&Label::new("process", "#3b82f6")).await.unwrap();
        repo.create(&Label::new("growth", "#22c55e")).await.unwrap();

        let labels = repo.list().await.unwrap();
        assert_eq!(labels.len(), 2);
        assert_eq!(labels[0].name, "growth");
    }
}
