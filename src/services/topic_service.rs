//! Topic lifecycle and visibility rules.

use std::sync::Arc;

use serde_json::Value;
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{Role, Topic, TopicStatus, User};
use crate::domain::ports::{
    LabelRepository, RelationshipRepository, TopicFilter, TopicRepository,
};

/// Partial update for a topic; status is never settable through this path.
#[derive(Default, Debug, Clone)]
pub struct TopicUpdate {
    pub title: Option<String>,
    pub content: Option<Value>,
    pub label_id: Option<Uuid>,
}

/// Query parameters for a topic listing.
#[derive(Default, Debug, Clone)]
pub struct TopicQuery {
    pub status: Option<TopicStatus>,
    pub label_id: Option<Uuid>,
    pub about_ic_id: Option<Uuid>,
    /// Leader only: also return discussed topics owned by their ICs.
    pub include_counterparty: bool,
}

pub struct TopicService {
    topics: Arc<dyn TopicRepository>,
    relationships: Arc<dyn RelationshipRepository>,
    labels: Arc<dyn LabelRepository>,
}

impl TopicService {
    pub fn new(
        topics: Arc<dyn TopicRepository>,
        relationships: Arc<dyn RelationshipRepository>,
        labels: Arc<dyn LabelRepository>,
    ) -> Self {
        Self {
            topics,
            relationships,
            labels,
        }
    }

    /// Create a topic in the backlog, appended to the end of the caller's
    /// display ordering.
    pub async fn create(
        &self,
        caller: &User,
        title: String,
        content: Option<Value>,
        label_id: Option<Uuid>,
        about_ic_id: Option<Uuid>,
    ) -> DomainResult<Topic> {
        if let Some(ic_id) = about_ic_id {
            // Only a leader scopes a topic to one of their ICs
            if caller.role != Role::Leader
                || self.relationships.get_pair(caller.id, ic_id).await?.is_none()
            {
                return Err(DomainError::not_found("User", ic_id));
            }
        }

        self.ensure_label(label_id).await?;

        let mut topic = Topic::new(caller.id, title);
        topic.content = content;
        topic.label_id = label_id;
        topic.about_ic_id = about_ic_id;
        topic.validate().map_err(DomainError::Validation)?;
        topic.sort_order = self
            .topics
            .next_sort_order(caller.id, about_ic_id)
            .await?;

        self.topics.create(&topic).await?;
        Ok(topic)
    }

    /// Fetch a topic the caller is allowed to see.
    pub async fn get(&self, caller: &User, id: Uuid) -> DomainResult<Topic> {
        let topic = self
            .topics
            .get(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Topic", id))?;
        if !self.visible_to(caller, &topic).await? {
            return Err(DomainError::not_found("Topic", id));
        }
        Ok(topic)
    }

    pub async fn update(&self, caller: &User, id: Uuid, changes: TopicUpdate) -> DomainResult<Topic> {
        let mut topic = self.get_owned(caller, id).await?;

        if let Some(title) = changes.title {
            topic.title = title;
        }
        if let Some(content) = changes.content {
            topic.content = Some(content);
        }
        if let Some(label_id) = changes.label_id {
            self.ensure_label(Some(label_id)).await?;
            topic.label_id = Some(label_id);
        }
        topic.validate().map_err(DomainError::Validation)?;
        topic.updated_at = chrono::Utc::now();

        self.topics.update(&topic).await?;
        Ok(topic)
    }

    /// Delete a topic; only backlog topics are deletable.
    pub async fn delete(&self, caller: &User, id: Uuid) -> DomainResult<()> {
        let topic = self.get_owned(caller, id).await?;
        if topic.status != TopicStatus::Backlog {
            return Err(DomainError::invalid_state(
                "Topic",
                id,
                format!("only backlog topics can be deleted, this one is {}", topic.status.as_str()),
            ));
        }
        self.topics.delete(id).await
    }

    /// Archive a topic; scheduled topics must be detached first.
    pub async fn archive(&self, caller: &User, id: Uuid) -> DomainResult<Topic> {
        let mut topic = self.get_owned(caller, id).await?;
        topic
            .transition_to(TopicStatus::Archived)
            .map_err(|reason| DomainError::invalid_state("Topic", id, reason))?;
        self.topics.update(&topic).await?;
        Ok(topic)
    }

    /// Move a backlog topic to a new display order.
    pub async fn reorder(&self, caller: &User, id: Uuid, sort_order: i64) -> DomainResult<Topic> {
        let mut topic = self.get_owned(caller, id).await?;
        if topic.status != TopicStatus::Backlog {
            return Err(DomainError::invalid_state(
                "Topic",
                id,
                "only backlog topics can be reordered",
            ));
        }
        self.topics.set_sort_order(id, sort_order).await?;
        topic.sort_order = sort_order;
        Ok(topic)
    }

    /// List the caller's topics, optionally widened with counterparty
    /// history. A leader asking for counterparty topics sees only the IC's
    /// discussed topics; backlog and scheduled stay private to the IC.
    pub async fn list(&self, caller: &User, query: TopicQuery) -> DomainResult<Vec<Topic>> {
        let mut topics = self
            .topics
            .list(TopicFilter {
                user_id: Some(caller.id),
                status: query.status,
                label_id: query.label_id,
                about_ic_id: query.about_ic_id,
            })
            .await?;

        let counterparty_wanted = query.include_counterparty
            && caller.role == Role::Leader
            && matches!(query.status, None | Some(TopicStatus::Discussed));
        if counterparty_wanted {
            let ic_ids: Vec<Uuid> = match query.about_ic_id {
                Some(ic_id) => vec![ic_id],
                None => self
                    .relationships
                    .list_for_user(caller.id)
                    .await?
                    .into_iter()
                    .map(|r| r.ic_id)
                    .collect(),
            };
            for ic_id in ic_ids {
                if self.relationships.get_pair(caller.id, ic_id).await?.is_none() {
                    continue;
                }
                let shared = self
                    .topics
                    .list(TopicFilter {
                        user_id: Some(ic_id),
                        status: Some(TopicStatus::Discussed),
                        label_id: query.label_id,
                        about_ic_id: None,
                    })
                    .await?;
                topics.extend(shared);
            }
        }

        Ok(topics)
    }

    /// A supplied label id must exist; an unknown one is a not-found, not a
    /// foreign key failure from the database.
    async fn ensure_label(&self, label_id: Option<Uuid>) -> DomainResult<()> {
        if let Some(label_id) = label_id {
            if self.labels.get(label_id).await?.is_none() {
                return Err(DomainError::not_found("Label", label_id));
            }
        }
        Ok(())
    }

    async fn get_owned(&self, caller: &User, id: Uuid) -> DomainResult<Topic> {
        let topic = self
            .topics
            .get(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Topic", id))?;
        // Ownership failures read as not-found so existence never leaks
        if topic.user_id != caller.id {
            return Err(DomainError::not_found("Topic", id));
        }
        Ok(topic)
    }

    async fn visible_to(&self, caller: &User, topic: &Topic) -> DomainResult<bool> {
        if topic.user_id == caller.id {
            return Ok(true);
        }
        match caller.role {
            // Leader reads an IC's topic only once it is shared history
            Role::Leader => Ok(topic.status == TopicStatus::Discussed
                && self
                    .relationships
                    .get_pair(caller.id, topic.user_id)
                    .await?
                    .is_some()),
            // IC reads a leader's topic written about them
            Role::Ic => Ok(topic.about_ic_id == Some(caller.id)
                && self
                    .relationships
                    .get_pair(topic.user_id, caller.id)
                    .await?
                    .is_some()),
        }
    }
}
