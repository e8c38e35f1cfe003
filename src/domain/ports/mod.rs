//! Port trait definitions (Hexagonal Architecture)
//!
//! Async trait interfaces the persistence adapters implement. These
//! contracts keep the services independent of the SQLite layer; tests can
//! substitute in-memory pools without touching business logic.

pub mod label_repository;
pub mod meeting_repository;
pub mod relationship_repository;
pub mod thought_repository;
pub mod topic_repository;
pub mod user_repository;

pub use label_repository::LabelRepository;
pub use meeting_repository::{CompletionOutcome, MeetingFilter, MeetingRepository};
pub use relationship_repository::RelationshipRepository;
pub use thought_repository::ThoughtRepository;
pub use topic_repository::{TopicFilter, TopicRepository};
pub use user_repository::UserRepository;
