use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::models::Relationship;

/// Repository port for leader/IC relationship persistence.
#[async_trait]
pub trait RelationshipRepository: Send + Sync {
    /// Insert a new relationship.
    async fn create(&self, relationship: &Relationship) -> DomainResult<()>;

    /// Get a relationship by ID.
    async fn get(&self, id: Uuid) -> DomainResult<Option<Relationship>>;

    /// Get the unique relationship for a (leader, IC) pair.
    async fn get_pair(&self, leader_id: Uuid, ic_id: Uuid) -> DomainResult<Option<Relationship>>;

    /// List relationships the user is a party of, on either side.
    async fn list_for_user(&self, user_id: Uuid) -> DomainResult<Vec<Relationship>>;
}
