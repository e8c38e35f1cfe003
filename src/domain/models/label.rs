//! Label domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A named, colored tag shared by all users, referenced by topics and
/// thoughts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    /// Unique identifier
    pub id: Uuid,
    /// Unique display name
    pub name: String,
    /// Hex color, e.g. `#f59e0b`
    pub color: String,
    /// When created
    pub created_at: DateTime<Utc>,
}

impl Label {
    /// Create a new label.
    pub fn new(name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            color: color.into(),
            created_at: Utc::now(),
        }
    }

    /// Validate label fields.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Label name cannot be empty".to_string());
        }
        if !self.color.starts_with('#') || !matches!(self.color.len(), 4 | 7) {
            return Err(format!("Invalid label color: {}", self.color));
        }
        Ok(())
    }
}
