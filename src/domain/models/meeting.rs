//! Meeting domain models.
//!
//! A meeting is a scheduled 1:1 event between the two parties of a
//! relationship. It owns agenda entries (meeting/topic associations) and an
//! optional shared notes document.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Status of a meeting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeetingStatus {
    /// Upcoming; agenda and notes are editable
    Scheduled,
    /// Held; attached topics became discussed, record is frozen
    Completed,
    /// Called off; attached topics went back to the backlog
    Cancelled,
}

impl Default for MeetingStatus {
    fn default() -> Self {
        Self::Scheduled
    }
}

impl MeetingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "scheduled" => Some(Self::Scheduled),
            "completed" | "complete" => Some(Self::Completed),
            "cancelled" | "canceled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Check if this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

/// Resolution outcome recorded on an agenda entry once discussed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    Done,
}

impl Resolution {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Done => "done",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "done" => Some(Self::Done),
            _ => None,
        }
    }
}

/// A scheduled 1:1 event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meeting {
    /// Unique identifier
    pub id: Uuid,
    /// Owning leader/IC relationship
    pub relationship_id: Uuid,
    /// Optional title
    pub title: Option<String>,
    /// When the meeting takes place
    pub scheduled_at: DateTime<Utc>,
    /// Current status
    pub status: MeetingStatus,
    /// Who created the meeting
    pub created_by: Uuid,
    /// When the meeting was marked completed
    pub completed_at: Option<DateTime<Utc>>,
    /// When created
    pub created_at: DateTime<Utc>,
    /// When last updated
    pub updated_at: DateTime<Utc>,
}

impl Meeting {
    /// Create a new scheduled meeting.
    pub fn new(relationship_id: Uuid, created_by: Uuid, scheduled_at: DateTime<Utc>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            relationship_id,
            title: None,
            scheduled_at,
            status: MeetingStatus::default(),
            created_by,
            completed_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Set a title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

/// Association of one topic with one meeting's agenda.
///
/// A topic may be linked to at most one non-cancelled meeting at a time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeetingTopic {
    /// The meeting
    pub meeting_id: Uuid,
    /// The attached topic
    pub topic_id: Uuid,
    /// Who added the topic to the agenda
    pub added_by: Uuid,
    /// Outcome once discussed, null otherwise
    pub resolution: Option<Resolution>,
    /// Display order within the agenda
    pub sort_order: i64,
    /// When attached
    pub created_at: DateTime<Utc>,
}

/// Shared free-form notes for a meeting.
///
/// Concurrent edits are last-write-wins; the record reflects only the most
/// recent writer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeetingNotes {
    /// The meeting the notes belong to
    pub meeting_id: Uuid,
    /// Opaque block-array blob
    pub content: serde_json::Value,
    /// Most recent editor
    pub last_edited_by: Option<Uuid>,
    /// When last written
    pub last_edited_at: DateTime<Utc>,
}

/// Cadence of a generated meeting series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    Weekly,
    Biweekly,
}

impl Frequency {
    /// Days between consecutive occurrences.
    pub fn period_days(&self) -> i64 {
        match self {
            Self::Weekly => 7,
            Self::Biweekly => 14,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Weekly => "weekly",
            Self::Biweekly => "biweekly",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "weekly" => Some(Self::Weekly),
            "biweekly" => Some(Self::Biweekly),
            _ => None,
        }
    }
}
