use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::models::{Thought, Topic};

/// Repository port for private thought persistence.
#[async_trait]
pub trait ThoughtRepository: Send + Sync {
    /// Insert a new thought.
    async fn create(&self, thought: &Thought) -> DomainResult<()>;

    /// Get a thought by ID.
    async fn get(&self, id: Uuid) -> DomainResult<Option<Thought>>;

    /// Update an existing thought.
    async fn update(&self, thought: &Thought) -> DomainResult<()>;

    /// Delete a thought by ID.
    async fn delete(&self, id: Uuid) -> DomainResult<()>;

    /// List a user's thoughts, newest first.
    async fn list_for_user(&self, user_id: Uuid) -> DomainResult<Vec<Thought>>;

    /// Atomically insert the promoted topic and delete the source thought.
    ///
    /// Either both happen or neither does; a failed topic insert leaves the
    /// thought in place.
    async fn promote(&self, thought_id: Uuid, topic: &Topic) -> DomainResult<()>;
}
