pub mod config;
pub mod label;
pub mod meeting;
pub mod thought;
pub mod topic;
pub mod user;

pub use config::{Config, DatabaseConfig, LoggingConfig, ServerConfig};
pub use label::Label;
pub use meeting::{Frequency, Meeting, MeetingNotes, MeetingStatus, MeetingTopic, Resolution};
pub use thought::Thought;
pub use topic::{Topic, TopicStatus};
pub use user::{Relationship, Role, User};
