pub mod condition;
pub mod rule;

pub use condition::{evaluate_condition, ConditionTrace};
pub use rule::{DefaultRuleEvaluator, RuleTrace};
