pub mod meeting_service;
pub mod promotion_service;
pub mod schedule;
pub mod topic_service;

pub use meeting_service::{AgendaEntry, MeetingDetail, MeetingService, MeetingUpdate};
pub use promotion_service::{PromotionOutcome, PromotionService, ThoughtUpdate};
pub use topic_service::{TopicQuery, TopicService, TopicUpdate};
