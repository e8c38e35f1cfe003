//! User and relationship domain models.
//!
//! Users come in two roles: leaders and individual contributors (ICs).
//! A relationship is a durable leader/IC pairing that owns meetings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role of a user in a 1:1 relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Manages one or more ICs.
    Leader,
    /// Individual contributor, the report in a leader/IC relationship.
    Ic,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Leader => "leader",
            Self::Ic => "ic",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "leader" => Some(Self::Leader),
            "ic" => Some(Self::Ic),
            _ => None,
        }
    }
}

/// An authenticated account.
///
/// Token issuance is administrative; the HTTP layer only resolves a bearer
/// token to the user's id and role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier
    pub id: Uuid,
    /// Display name
    pub name: String,
    /// Unique email address
    pub email: String,
    /// Leader or IC
    pub role: Role,
    /// Bearer token for API access, if one has been issued
    #[serde(skip_serializing)]
    pub api_token: Option<String>,
    /// When created
    pub created_at: DateTime<Utc>,
    /// When last updated
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new user with no API token.
    pub fn new(name: impl Into<String>, email: impl Into<String>, role: Role) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            email: email.into(),
            role,
            api_token: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Validate user fields.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("User name cannot be empty".to_string());
        }
        if !self.email.contains('@') {
            return Err(format!("Invalid email: {}", self.email));
        }
        Ok(())
    }
}

/// A durable pairing of exactly one leader and one IC.
///
/// Identity is the (leader_id, ic_id) pair; the pairing is created by an
/// administrative process and owns zero or more meetings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    /// Unique identifier
    pub id: Uuid,
    /// The managing leader
    pub leader_id: Uuid,
    /// The managed IC
    pub ic_id: Uuid,
    /// When created
    pub created_at: DateTime<Utc>,
}

impl Relationship {
    pub fn new(leader_id: Uuid, ic_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            leader_id,
            ic_id,
            created_at: Utc::now(),
        }
    }

    /// Whether the given user is one of the two parties.
    pub fn involves(&self, user_id: Uuid) -> bool {
        self.leader_id == user_id || self.ic_id == user_id
    }

    /// The other party of the relationship, if the given user is a party.
    pub fn counterparty(&self, user_id: Uuid) -> Option<Uuid> {
        if self.leader_id == user_id {
            Some(self.ic_id)
        } else if self.ic_id == user_id {
            Some(self.leader_id)
        } else {
            None
        }
    }
}
