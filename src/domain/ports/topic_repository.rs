use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::models::{Topic, TopicStatus};

/// Filters for querying topics.
#[derive(Default, Debug, Clone)]
pub struct TopicFilter {
    /// Owning user
    pub user_id: Option<Uuid>,
    /// Lifecycle status
    pub status: Option<TopicStatus>,
    /// Shared label
    pub label_id: Option<Uuid>,
    /// IC scope for leader-authored topics
    pub about_ic_id: Option<Uuid>,
}

/// Repository port for topic persistence.
///
/// Status changes driven by agenda membership (attach, detach, complete,
/// cancel) go through `MeetingRepository`, which updates topics inside the
/// same transaction as the join rows. This port only mutates status for the
/// archive path.
#[async_trait]
pub trait TopicRepository: Send + Sync {
    /// Insert a new topic.
    async fn create(&self, topic: &Topic) -> DomainResult<()>;

    /// Get a topic by ID.
    async fn get(&self, id: Uuid) -> DomainResult<Option<Topic>>;

    /// Update an existing topic.
    async fn update(&self, topic: &Topic) -> DomainResult<()>;

    /// Delete a topic by ID.
    async fn delete(&self, id: Uuid) -> DomainResult<()>;

    /// List topics with optional filters.
    ///
    /// Ordering follows the status filter: backlog by display order,
    /// scheduled by next meeting date, discussed by discussion date
    /// descending, otherwise by creation date descending.
    async fn list(&self, filter: TopicFilter) -> DomainResult<Vec<Topic>>;

    /// Next display order at the end of the owner's backlog scope.
    async fn next_sort_order(&self, user_id: Uuid, about_ic_id: Option<Uuid>)
        -> DomainResult<i64>;

    /// Move a topic to a new display order.
    async fn set_sort_order(&self, id: Uuid, sort_order: i64) -> DomainResult<()>;
}
