use std::cmp::Ordering;

use serde::Serialize;

use decomm_core::fields::{FieldRef, FieldValue};
use decomm_core::model::{Circuit, Condition};
use decomm_core::types::{Operator, Scalar};

/// Evaluate one primitive test against a circuit's field value.
///
/// `actual` is `None` when the circuit has no such field; every operator is
/// then false, `!=` included. Categorical values only support `==` and `!=`
/// by exact string equality. Numeric values compare numerically, coercing a
/// string threshold first (see [`loose_number`]).
pub fn evaluate_condition(actual: Option<FieldValue>, op: &Operator, expected: &Scalar) -> bool {
    match actual {
        None => false,
        Some(FieldValue::Number(a)) => compare_numbers(op, a, loose_number(expected)),
        Some(FieldValue::Text(a)) => compare_text(op, a, expected),
    }
}

/// Evaluate a [`Condition`] against a circuit.
pub fn check(condition: &Condition, circuit: &Circuit) -> bool {
    evaluate_condition(
        condition.condition.read(circuit),
        &condition.operator,
        &condition.value,
    )
}

fn compare_numbers(op: &Operator, a: f64, b: f64) -> bool {
    match op {
        Operator::Eq => a == b,
        Operator::Neq => a != b,
        Operator::Lt => a.partial_cmp(&b) == Some(Ordering::Less),
        Operator::Lte => matches!(a.partial_cmp(&b), Some(Ordering::Less | Ordering::Equal)),
        Operator::Gt => a.partial_cmp(&b) == Some(Ordering::Greater),
        Operator::Gte => matches!(
            a.partial_cmp(&b),
            Some(Ordering::Greater | Ordering::Equal)
        ),
        Operator::Other(_) => false,
    }
}

fn compare_text(op: &Operator, a: &str, expected: &Scalar) -> bool {
    let equal = expected.as_text() == Some(a);
    match op {
        Operator::Eq => equal,
        Operator::Neq => !equal,
        _ => false,
    }
}

/// Numeric reading of a rule threshold, following loose-equality coercion:
/// surrounding whitespace is ignored, an empty string is 0, unsigned `0x`,
/// `0o` and `0b` literals read in their radix, and anything unparseable is NaN.
pub fn loose_number(value: &Scalar) -> f64 {
    match value {
        Scalar::Number(n) => *n,
        Scalar::Text(s) => {
            let t = s.trim();
            if t.is_empty() {
                return 0.0;
            }
            if let Some(n) = radix_literal(t) {
                return n;
            }
            // f64::from_str also takes "inf"/"nan" spellings; only "Infinity" counts here.
            let unsigned = t.trim_start_matches(['+', '-']);
            if unsigned.chars().any(|c| c.is_ascii_alphabetic() && c != 'e' && c != 'E')
                && unsigned != "Infinity"
            {
                return f64::NAN;
            }
            let t = t.replace("Infinity", "inf");
            t.parse::<f64>().unwrap_or(f64::NAN)
        }
    }
}

/// `None` when `t` has no radix prefix; NaN when the digits are invalid.
fn radix_literal(t: &str) -> Option<f64> {
    let prefix = t.get(..2)?;
    let radix = match prefix {
        "0x" | "0X" => 16,
        "0o" | "0O" => 8,
        "0b" | "0B" => 2,
        _ => return None,
    };
    let digits = &t[2..];
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return Some(f64::NAN);
    }
    let n = digits
        .chars()
        .filter_map(|c| c.to_digit(radix))
        .fold(0.0, |acc, d| acc * f64::from(radix) + f64::from(d));
    Some(n)
}

/// Outcome of one condition, for explaining a rule's verdict.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConditionTrace {
    pub field: String,
    pub label: String,
    pub operator: Operator,
    pub expected: Scalar,
    /// Rendered circuit value; `None` when the circuit has no such field.
    pub actual: Option<String>,
    pub pass: bool,
}

impl ConditionTrace {
    pub fn capture(field: &FieldRef, op: &Operator, expected: &Scalar, circuit: &Circuit) -> Self {
        let actual = field.read(circuit);
        Self {
            field: field.name().to_string(),
            label: field.label().to_string(),
            operator: op.clone(),
            expected: expected.clone(),
            actual: actual.map(|v| v.to_string()),
            pass: evaluate_condition(actual, op, expected),
        }
    }
}
