//! Domain errors for the cadence meeting server.

use thiserror::Error;
use uuid::Uuid;

/// Domain-level errors that can occur in the cadence system.
///
/// The four leading variants are expected, user-facing outcomes; they map
/// onto HTTP statuses in the API layer (400, 404, 409, 409). Database and
/// serialization failures surface as 500s.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: Uuid },

    #[error("Invalid state for {entity} {id}: {reason}")]
    InvalidState {
        entity: &'static str,
        id: Uuid,
        reason: String,
    },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl DomainError {
    /// Shorthand for a not-found error on a named entity.
    pub fn not_found(entity: &'static str, id: Uuid) -> Self {
        Self::NotFound { entity, id }
    }

    /// Shorthand for an invalid-state error on a named entity.
    pub fn invalid_state(entity: &'static str, id: Uuid, reason: impl Into<String>) -> Self {
        Self::InvalidState {
            entity,
            id,
            reason: reason.into(),
        }
    }

    /// Stable machine-readable code used by the API error envelope.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::InvalidState { .. } => "INVALID_STATE",
            Self::Conflict(_) => "CONFLICT",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }
}

/// Result alias used throughout the domain and service layers.
pub type DomainResult<T> = Result<T, DomainError>;

impl From<sqlx::Error> for DomainError {
    fn from(err: sqlx::Error) -> Self {
        DomainError::Database(err.to_string())
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        DomainError::Serialization(err.to_string())
    }
}
