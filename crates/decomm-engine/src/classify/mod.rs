pub mod engine;

pub use engine::{classify, flagged_first, review_queue, ClassificationSummary};
