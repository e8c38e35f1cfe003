use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::models::Label;

/// Repository port for shared label persistence.
#[async_trait]
pub trait LabelRepository: Send + Sync {
    /// Insert a new label.
    async fn create(&self, label: &Label) -> DomainResult<()>;

    /// Get a label by ID.
    async fn get(&self, id: Uuid) -> DomainResult<Option<Label>>;

    /// List all labels ordered by name.
    async fn list(&self) -> DomainResult<Vec<Label>>;
}
