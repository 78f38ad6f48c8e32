pub mod circuit;
pub mod rule;

pub use circuit::{
    Circuit, CommentRecord, HistoryEvent, HistoryEventKind, DECISION_APPROVED,
    DECISION_KEEP_ACTIVE,
};
pub use rule::{Condition, ConditionList, Rule, RuleShape, EXCLUDED_PREFIX};
