use crate::fields::Field;
use crate::model::{Condition, Rule};
use crate::types::{Operator, RuleType};

/// The starter rule set a fresh workspace is seeded with.
pub fn default_rules() -> Vec<Rule> {
    let rule = |n: u32, name: &str, field: Field, op: Operator, value: i32, description: &str| {
        Rule::single(
            format!("default-{n}"),
            name,
            RuleType::Include,
            Condition::new(field, op, value),
        )
        .with_description(description)
    };
    vec![
        rule(
            1,
            "Low Utilization - Under 20%",
            Field::Utilization,
            Operator::Lt,
            20,
            "Circuits with utilization below 20% may indicate unused or underutilized bandwidth",
        ),
        rule(
            2,
            "Very Old Circuit - Over 48 Months",
            Field::Age,
            Operator::Gt,
            48,
            "Circuits older than 4 years may be part of legacy network requiring modernization",
        ),
        rule(
            3,
            "High Cost per Mbps",
            Field::Cost,
            Operator::Gt,
            15,
            "High cost circuits may be candidates for cost optimization or provider migration",
        ),
        rule(
            4,
            "Minimal Traffic Volume",
            Field::Traffic,
            Operator::Lt,
            50,
            "Very low traffic volume suggests circuit is redundant or unused",
        ),
        rule(
            5,
            "Extremely Low Utilization - Under 10%",
            Field::Utilization,
            Operator::Lt,
            10,
            "Critical: Circuits under 10% utilization are strong candidates for immediate decommission",
        ),
    ]
}
