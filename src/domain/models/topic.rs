//! Topic domain model.
//!
//! Topics are discussable items that move through a fixed lifecycle as they
//! are attached to and detached from meetings. Content is an opaque
//! rich-content blob owned by the client editor.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Status of a topic in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TopicStatus {
    /// Not attached to any meeting
    Backlog,
    /// Attached to exactly one upcoming meeting
    Scheduled,
    /// Its meeting completed; discussion history is immutable
    Discussed,
    /// Retired from the backlog or from history
    Archived,
}

impl Default for TopicStatus {
    fn default() -> Self {
        Self::Backlog
    }
}

impl TopicStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Backlog => "backlog",
            Self::Scheduled => "scheduled",
            Self::Discussed => "discussed",
            Self::Archived => "archived",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "backlog" => Some(Self::Backlog),
            "scheduled" => Some(Self::Scheduled),
            "discussed" => Some(Self::Discussed),
            "archived" => Some(Self::Archived),
            _ => None,
        }
    }

    /// Valid transitions from this status.
    ///
    /// There is no un-discuss and no un-archive: once a meeting completes,
    /// the discussion history is immutable.
    pub fn valid_transitions(&self) -> Vec<TopicStatus> {
        match self {
            Self::Backlog => vec![Self::Scheduled, Self::Archived],
            Self::Scheduled => vec![Self::Backlog, Self::Discussed],
            Self::Discussed => vec![Self::Archived],
            Self::Archived => vec![],
        }
    }

    pub fn can_transition_to(&self, new_status: Self) -> bool {
        self.valid_transitions().contains(&new_status)
    }
}

/// A discussable item owned by one user.
///
/// A leader's topic about an IC carries `about_ic_id`; an IC's own topic
/// leaves it unset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Topic {
    /// Unique identifier
    pub id: Uuid,
    /// Owning user
    pub user_id: Uuid,
    /// IC this topic is about, when created by a leader
    pub about_ic_id: Option<Uuid>,
    /// Short title
    pub title: String,
    /// Opaque rich-content blob (block-array JSON), if any
    pub content: Option<serde_json::Value>,
    /// Optional shared label
    pub label_id: Option<Uuid>,
    /// Current lifecycle status
    pub status: TopicStatus,
    /// Display order within the owner's backlog
    pub sort_order: i64,
    /// When the topic's meeting completed
    pub discussed_at: Option<DateTime<Utc>>,
    /// When created
    pub created_at: DateTime<Utc>,
    /// When last updated
    pub updated_at: DateTime<Utc>,
}

impl Topic {
    /// Create a new backlog topic.
    pub fn new(user_id: Uuid, title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            about_ic_id: None,
            title: title.into(),
            content: None,
            label_id: None,
            status: TopicStatus::default(),
            sort_order: 0,
            discussed_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Scope the topic to an IC (leader-authored).
    pub fn about(mut self, ic_id: Uuid) -> Self {
        self.about_ic_id = Some(ic_id);
        self
    }

    /// Attach a content blob.
    pub fn with_content(mut self, content: serde_json::Value) -> Self {
        self.content = Some(content);
        self
    }

    /// Tag with a label.
    pub fn with_label(mut self, label_id: Uuid) -> Self {
        self.label_id = Some(label_id);
        self
    }

    /// Check if can transition to given status.
    pub fn can_transition_to(&self, new_status: TopicStatus) -> bool {
        self.status.can_transition_to(new_status)
    }

    /// Transition to a new status, stamping `discussed_at` on discussion.
    pub fn transition_to(&mut self, new_status: TopicStatus) -> Result<(), String> {
        if !self.can_transition_to(new_status) {
            return Err(format!(
                "Cannot transition from {} to {}",
                self.status.as_str(),
                new_status.as_str()
            ));
        }

        self.status = new_status;
        self.updated_at = Utc::now();
        if new_status == TopicStatus::Discussed {
            self.discussed_at = Some(Utc::now());
        }
        Ok(())
    }

    /// Validate topic fields.
    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("Topic title cannot be empty".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_topic_starts_in_backlog() {
        let topic = Topic::new(Uuid::new_v4(), "Career growth");
        assert_eq!(topic.status, TopicStatus::Backlog);
        assert!(topic.about_ic_id.is_none());
    }

    #[test]
    fn test_schedule_and_detach_round_trip() {
        let mut topic = Topic::new(Uuid::new_v4(), "Quarterly goals");
        topic.transition_to(TopicStatus::Scheduled).unwrap();
        assert_eq!(topic.status, TopicStatus::Scheduled);
        topic.transition_to(TopicStatus::Backlog).unwrap();
        assert_eq!(topic.status, TopicStatus::Backlog);
    }

    #[test]
    fn test_discussed_is_terminal_except_archive() {
        let mut topic = Topic::new(Uuid::new_v4(), "Feedback");
        topic.transition_to(TopicStatus::Scheduled).unwrap();
        topic.transition_to(TopicStatus::Discussed).unwrap();
        assert!(topic.discussed_at.is_some());

        // No un-discuss
        assert!(!topic.can_transition_to(TopicStatus::Backlog));
        assert!(!topic.can_transition_to(TopicStatus::Scheduled));

        topic.transition_to(TopicStatus::Archived).unwrap();
        assert!(topic.status.valid_transitions().is_empty());
    }

    #[test]
    fn test_archive_from_backlog_but_not_scheduled() {
        let mut topic = Topic::new(Uuid::new_v4(), "One-off");
        assert!(topic.can_transition_to(TopicStatus::Archived));

        topic.transition_to(TopicStatus::Scheduled).unwrap();
        assert!(!topic.can_transition_to(TopicStatus::Archived));
    }

    #[test]
    fn test_title_validation() {
        let topic = Topic::new(Uuid::new_v4(), "   ");
        assert!(topic.validate().is_err());
    }
}
