pub mod miner;
pub mod patterns;

pub use miner::{accept, analyze, feedback_count, rejected_with_feedback, SuggestedRule};
pub use patterns::{FeedbackPattern, PATTERNS};
