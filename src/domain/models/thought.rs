//! Thought domain model.
//!
//! A thought is a private note, never shared. Its only exit from the
//! system besides deletion is promotion into a topic, which consumes it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A private note owned by exactly one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thought {
    /// Unique identifier
    pub id: Uuid,
    /// Owning user
    pub user_id: Uuid,
    /// IC this thought is about, when authored by a leader
    pub about_ic_id: Option<Uuid>,
    /// Short title
    pub title: String,
    /// Opaque rich-content blob, if any
    pub content: Option<serde_json::Value>,
    /// Optional shared label
    pub label_id: Option<Uuid>,
    /// When created
    pub created_at: DateTime<Utc>,
    /// When last updated
    pub updated_at: DateTime<Utc>,
}

impl Thought {
    /// Create a new thought.
    pub fn new(user_id: Uuid, title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            about_ic_id: None,
            title: title.into(),
            content: None,
            label_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Scope the thought to an IC.
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

    /// Validate thought fields.
    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("Thought title cannot be empty".to_string());
        }
        Ok(())
    }
}
