//! Private thoughts and their one-way promotion into topics.

use std::sync::Arc;

use serde_json::Value;
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{Thought, Topic, User};
use crate::domain::ports::{LabelRepository, ThoughtRepository, TopicRepository};

/// Result of a successful promotion.
#[derive(Debug, Clone)]
pub struct PromotionOutcome {
    pub topic: Topic,
    /// Always true on success; the source thought is gone.
    pub thought_deleted: bool,
}

/// Partial update for a thought.
#[derive(Default, Debug, Clone)]
pub struct ThoughtUpdate {
    pub title: Option<String>,
    pub content: Option<Value>,
    pub label_id: Option<Uuid>,
    pub about_ic_id: Option<Uuid>,
}

/// Owns the private thought store and the irreversible thought-to-topic
/// conversion. Thoughts are visible to their owner and nobody else.
pub struct PromotionService {
    thoughts: Arc<dyn ThoughtRepository>,
    topics: Arc<dyn TopicRepository>,
    labels: Arc<dyn LabelRepository>,
}

impl PromotionService {
    pub fn new(
        thoughts: Arc<dyn ThoughtRepository>,
        topics: Arc<dyn TopicRepository>,
        labels: Arc<dyn LabelRepository>,
    ) -> Self {
        Self {
            thoughts,
            topics,
            labels,
        }
    }

    pub async fn create_thought(
        &self,
        caller: &User,
        title: String,
        content: Option<Value>,
        label_id: Option<Uuid>,
        about_ic_id: Option<Uuid>,
    ) -> DomainResult<Thought> {
        self.ensure_label(label_id).await?;

        let mut thought = Thought::new(caller.id, title);
        thought.content = content;
        thought.label_id = label_id;
        thought.about_ic_id = about_ic_id;
        thought.validate().map_err(DomainError::Validation)?;

        self.thoughts.create(&thought).await?;
        Ok(thought)
    }

    pub async fn get_thought(&self, caller: &User, id: Uuid) -> DomainResult<Thought> {
        self.get_owned(caller, id).await
    }

    pub async fn list_thoughts(&self, caller: &User) -> DomainResult<Vec<Thought>> {
        self.thoughts.list_for_user(caller.id).await
    }

    pub async fn update_thought(
        &self,
        caller: &User,
        id: Uuid,
        changes: ThoughtUpdate,
    ) -> DomainResult<Thought> {
        let mut thought = self.get_owned(caller, id).await?;

        if let Some(title) = changes.title {
            thought.title = title;
        }
        if let Some(content) = changes.content {
            thought.content = Some(content);
        }
        if let Some(label_id) = changes.label_id {
            self.ensure_label(Some(label_id)).await?;
            thought.label_id = Some(label_id);
        }
        if let Some(about_ic_id) = changes.about_ic_id {
            thought.about_ic_id = Some(about_ic_id);
        }
        thought.validate().map_err(DomainError::Validation)?;
        thought.updated_at = chrono::Utc::now();

        self.thoughts.update(&thought).await?;
        Ok(thought)
    }

    pub async fn delete_thought(&self, caller: &User, id: Uuid) -> DomainResult<()> {
        self.get_owned(caller, id).await?;
        self.thoughts.delete(id).await
    }

    /// Convert a thought into a backlog topic, preserving title, content,
    /// and IC scoping. The source thought is deleted in the same
    /// transaction; either both happen or neither does.
    pub async fn promote(
        &self,
        caller: &User,
        thought_id: Uuid,
        label_id: Option<Uuid>,
    ) -> DomainResult<PromotionOutcome> {
        let thought = self.get_owned(caller, thought_id).await?;
        // The fallback label came in through a validated write already
        self.ensure_label(label_id).await?;

        let mut topic = Topic::new(thought.user_id, thought.title.clone());
        topic.content = thought.content.clone();
        topic.about_ic_id = thought.about_ic_id;
        topic.label_id = label_id.or(thought.label_id);
        topic.sort_order = self
            .topics
            .next_sort_order(thought.user_id, thought.about_ic_id)
            .await?;

        self.thoughts.promote(thought_id, &topic).await?;

        Ok(PromotionOutcome {
            topic,
            thought_deleted: true,
        })
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

    async fn get_owned(&self, caller: &User, id: Uuid) -> DomainResult<Thought> {
        let thought = self
            .thoughts
            .get(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Thought", id))?;
        // Thoughts are strictly private; anyone else's read is a not-found
        if thought.user_id != caller.id {
            return Err(DomainError::not_found("Thought", id));
        }
        Ok(thought)
    }
}
