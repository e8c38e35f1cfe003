//! Cadence - 1:1 meeting management server
//!
//! Cadence is the server-side core of a 1:1 meeting tool for leader/IC
//! relationships: private thoughts, shareable topics with a lifecycle state
//! machine, recurring meetings with agendas, and co-edited notes, exposed
//! over a JSON REST API backed by SQLite.
//!
//! # Architecture
//!
//! This crate follows Clean Architecture / Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): Entities, status state machines, and
//!   repository ports
//! - **Service Layer** (`services`): Business rules over the ports
//! - **Adapters** (`adapters`): SQLite persistence and the HTTP surface
//! - **Infrastructure Layer** (`infrastructure`): Configuration loading
//! - **CLI Layer** (`cli`): Server entry point and admin commands

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::errors::{DomainError, DomainResult};
pub use domain::models::{
    Config, Frequency, Label, Meeting, MeetingNotes, MeetingStatus, MeetingTopic, Relationship,
    Resolution, Role, Thought, Topic, TopicStatus, User,
};
pub use domain::ports::{
    LabelRepository, MeetingFilter, MeetingRepository, RelationshipRepository, ThoughtRepository,
    TopicFilter, TopicRepository, UserRepository,
};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{MeetingService, PromotionService, TopicService};
