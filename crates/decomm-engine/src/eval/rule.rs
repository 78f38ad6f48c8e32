use serde::Serialize;

use decomm_core::model::{Circuit, Rule, RuleShape};
use decomm_core::types::Logic;

use super::condition::{check, evaluate_condition, ConditionTrace};

/// Pure rule evaluator.
///
/// A non-empty `conditions` list is combined with AND (all pass) or OR (any
/// pass); missing or unknown logic never matches. Otherwise the single
/// condition is tested; a rule with neither form never matches.
pub struct DefaultRuleEvaluator;

impl DefaultRuleEvaluator {
    pub fn evaluate(&self, circuit: &Circuit, rule: &Rule) -> bool {
        match rule.shape() {
            RuleShape::Single {
                condition,
                operator,
                value,
            } => evaluate_condition(condition.read(circuit), operator, value),
            RuleShape::Compound { conditions, logic } => {
                let mut results = conditions.iter().map(|c| check(c, circuit));
                match logic {
                    Some(Logic::And) => results.all(|r| r),
                    Some(Logic::Or) => results.any(|r| r),
                    _ => false,
                }
            }
            RuleShape::Malformed => false,
        }
    }

    /// Evaluate with per-condition detail.
    pub fn explain(&self, circuit: &Circuit, rule: &Rule) -> RuleTrace {
        let conditions: Vec<ConditionTrace> = match rule.shape() {
            RuleShape::Single {
                condition,
                operator,
                value,
            } => vec![ConditionTrace::capture(condition, operator, value, circuit)],
            RuleShape::Compound { conditions, .. } => conditions
                .iter()
                .map(|c| ConditionTrace::capture(&c.condition, &c.operator, &c.value, circuit))
                .collect(),
            RuleShape::Malformed => Vec::new(),
        };
        RuleTrace {
            rule_id: rule.id.clone(),
            rule_name: rule.name.clone(),
            rule_type: rule.effective_type().as_str().to_string(),
            logic: rule.logic.as_ref().map(|l| l.as_str().to_string()),
            matched: self.evaluate(circuit, rule),
            conditions,
        }
    }
}

/// A rule's verdict on one circuit with the conditions behind it.
#[derive(Debug, Clone, Serialize)]
pub struct RuleTrace {
    pub rule_id: String,
    pub rule_name: String,
    pub rule_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logic: Option<String>,
    pub matched: bool,
    pub conditions: Vec<ConditionTrace>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use decomm_core::fields::Field;
    use decomm_core::model::Condition;
    use decomm_core::types::{HardwareEol, Operator, RuleType};

    fn circuit(utilization: f64, age: u32) -> Circuit {
        let mut c = Circuit::new("CKT-2024-010", "Omaha - Old Market");
        c.utilization = utilization;
        c.age = age;
        c
    }

    fn old_and_idle(logic: Logic) -> Rule {
        Rule::compound(
            "r",
            "Old and idle",
            RuleType::Include,
            logic,
            vec![
                Condition::new(Field::Age, Operator::Gt, 48),
                Condition::new(Field::Utilization, Operator::Lt, 10),
            ],
        )
    }

    #[test]
    fn single_rule_delegates_to_condition() {
        let rule = Rule::single(
            "r",
            "Low Util Rule",
            RuleType::Include,
            Condition::new(Field::Utilization, Operator::Lt, 20),
        );
        assert!(DefaultRuleEvaluator.evaluate(&circuit(15.0, 1), &rule));
        assert!(!DefaultRuleEvaluator.evaluate(&circuit(25.0, 1), &rule));
    }

    #[test]
    fn compound_and_is_conjunction_or_is_disjunction() {
        let and = old_and_idle(Logic::And);
        let or = old_and_idle(Logic::Or);
        for (util, age) in [(5.0, 60), (5.0, 12), (50.0, 60), (50.0, 12)] {
            let c = circuit(util, age);
            let a = age > 48;
            let b = util < 10.0;
            assert_eq!(DefaultRuleEvaluator.evaluate(&c, &and), a && b);
            assert_eq!(DefaultRuleEvaluator.evaluate(&c, &or), a || b);
        }
    }

    #[test]
    fn unknown_or_missing_logic_never_matches() {
        let c = circuit(5.0, 60);
        let mut rule = old_and_idle(Logic::Other("XOR".into()));
        assert!(!DefaultRuleEvaluator.evaluate(&c, &rule));
        rule.logic = None;
        assert!(!DefaultRuleEvaluator.evaluate(&c, &rule));
    }

    #[test]
    fn incomplete_single_form_never_matches() {
        let mut rule = Rule::single(
            "r",
            "Broken",
            RuleType::Include,
            Condition::new(Field::Age, Operator::Gt, 0),
        );
        rule.value = None;
        assert!(!DefaultRuleEvaluator.evaluate(&circuit(1.0, 60), &rule));
    }

    #[test]
    fn empty_conditions_fall_back_to_single_form() {
        let mut rule = Rule::single(
            "r",
            "EOL",
            RuleType::Include,
            Condition::new(Field::HardwareEol, Operator::Eq, "yes"),
        );
        rule.conditions = Some(Vec::new().into());
        let mut c = circuit(1.0, 1);
        c.hardware_eol = HardwareEol::Yes;
        assert!(DefaultRuleEvaluator.evaluate(&c, &rule));
    }

    #[test]
    fn explain_lists_each_condition() {
        let trace = DefaultRuleEvaluator.explain(&circuit(5.0, 12), &old_and_idle(Logic::And));
        assert!(!trace.matched);
        assert_eq!(trace.logic.as_deref(), Some("AND"));
        let passes: Vec<bool> = trace.conditions.iter().map(|c| c.pass).collect();
        assert_eq!(passes, vec![false, true]);
        assert_eq!(trace.conditions[0].actual.as_deref(), Some("12"));
    }
}
