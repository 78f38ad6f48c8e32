use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::errors::{RuleParseError, ValidationError};
use crate::fields::{Field, FieldKind, FieldRef};
use crate::types::{Logic, Operator, RuleType, Scalar};

/// Prefix recorded in `matchedRules` when an exclude rule vetoes a circuit.
pub const EXCLUDED_PREFIX: &str = "[EXCLUDED] ";

/// A primitive test of one circuit field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub condition: FieldRef,
    pub operator: Operator,
    pub value: Scalar,
}

impl Condition {
    pub fn new(field: impl Into<FieldRef>, operator: Operator, value: impl Into<Scalar>) -> Self {
        Self {
            condition: field.into(),
            operator,
            value: value.into(),
        }
    }

    /// Parse `field op value`, e.g. `utilization < 20` or `site_status==closed`.
    ///
    /// The field must be a circuit attribute; numeric fields require a numeric value.
    pub fn parse_expr(expr: &str) -> Result<Self, RuleParseError> {
        let (pos, op) = find_operator(expr)
            .ok_or_else(|| RuleParseError::MissingOperator(expr.to_string()))?;
        let name = expr[..pos].trim();
        let raw = expr[pos + op.len()..].trim();

        let field = Field::parse(name).ok_or_else(|| RuleParseError::UnknownField(name.into()))?;
        if raw.is_empty() {
            return Err(RuleParseError::MissingValue(expr.to_string()));
        }
        let raw = raw.trim_matches(|c| c == '"' || c == '\'');
        let value = match field.kind() {
            FieldKind::Numeric => Scalar::Number(raw.parse::<f64>().map_err(|_| {
                RuleParseError::InvalidNumber {
                    field: name.to_string(),
                    value: raw.to_string(),
                }
            })?),
            FieldKind::Categorical => Scalar::Text(raw.to_string()),
        };
        Ok(Self::new(field, Operator::from_wire(op), value))
    }

    /// `Utilization % < 20`
    pub fn summary(&self) -> String {
        format!(
            "{} {} {}",
            self.condition.label(),
            self.operator,
            self.value
        )
    }

    fn validate(&self) -> Result<(), String> {
        let Some(field) = self.condition.field() else {
            return Err(format!("unknown field '{}'", self.condition));
        };
        if !field.allowed_operators().contains(&self.operator) {
            return Err(format!(
                "operator '{}' is not allowed for {}",
                self.operator, field
            ));
        }
        match (field.kind(), &self.value) {
            (FieldKind::Numeric, Scalar::Number(n)) if n.is_finite() => Ok(()),
            (FieldKind::Numeric, _) => Err(format!("{field} expects a numeric value")),
            (FieldKind::Categorical, Scalar::Text(s)) => {
                if field.options().contains(&s.as_str()) {
                    Ok(())
                } else {
                    Err(format!(
                        "'{s}' is not a valid {field} (expected one of {})",
                        field.options().join(", ")
                    ))
                }
            }
            (FieldKind::Categorical, _) => Err(format!("{field} expects a text value")),
        }
    }
}

/// Two-character operators are tried first so `<=` is not read as `<`.
fn find_operator(expr: &str) -> Option<(usize, &'static str)> {
    const OPS: [&str; 6] = ["<=", ">=", "==", "!=", "<", ">"];
    for (pos, _) in expr.char_indices() {
        let rest = &expr[pos..];
        if let Some(op) = OPS.iter().find(|op| rest.starts_with(**op)) {
            return Some((pos, *op));
        }
    }
    None
}

/// The stored `conditions` of a compound rule.
///
/// A list that does not read as conditions (an entry without a `value`, a
/// boolean threshold) is kept verbatim so saving writes it back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConditionList {
    Parsed(Vec<Condition>),
    Unparsed(Value),
}

impl ConditionList {
    pub fn parsed(&self) -> Option<&[Condition]> {
        match self {
            ConditionList::Parsed(c) => Some(c),
            ConditionList::Unparsed(_) => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            ConditionList::Parsed(c) => c.is_empty(),
            ConditionList::Unparsed(Value::Array(v)) => v.is_empty(),
            ConditionList::Unparsed(_) => false,
        }
    }
}

impl From<Vec<Condition>> for ConditionList {
    fn from(conditions: Vec<Condition>) -> Self {
        ConditionList::Parsed(conditions)
    }
}

/// Single-form thresholds other than a number or a string read as unset.
fn lenient_value<'de, D>(deserializer: D) -> Result<Option<Scalar>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw.and_then(|v| serde_json::from_value(v).ok()))
}

/// A user-authored classification rule.
///
/// Exactly one of the single form (`condition` + `operator` + `value`) or the
/// compound form (`conditions` + `logic`) should be populated. Stored rules are
/// loaded as-is; `shape` decides how a rule evaluates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub id: String,
    pub name: String,

    /// Absent on legacy rules, which count as include rules.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub rule_type: Option<RuleType>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<FieldRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator: Option<Operator>,
    #[serde(
        default,
        deserialize_with = "lenient_value",
        skip_serializing_if = "Option::is_none"
    )]
    pub value: Option<Scalar>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditions: Option<ConditionList>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logic: Option<Logic>,

    /// Created from a feedback suggestion.
    #[serde(
        rename = "aiGenerated",
        default,
        skip_serializing_if = "std::ops::Not::not"
    )]
    pub ai_generated: bool,
}

/// How a rule evaluates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RuleShape<'a> {
    Single {
        condition: &'a FieldRef,
        operator: &'a Operator,
        value: &'a Scalar,
    },
    Compound {
        conditions: &'a [Condition],
        logic: Option<&'a Logic>,
    },
    /// Neither form is populated, or the conditions list is unreadable; never
    /// matches.
    Malformed,
}

impl Rule {
    pub fn single(
        id: impl Into<String>,
        name: impl Into<String>,
        rule_type: RuleType,
        condition: Condition,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            rule_type: Some(rule_type),
            description: String::new(),
            condition: Some(condition.condition),
            operator: Some(condition.operator),
            value: Some(condition.value),
            conditions: None,
            logic: None,
            ai_generated: false,
        }
    }

    pub fn compound(
        id: impl Into<String>,
        name: impl Into<String>,
        rule_type: RuleType,
        logic: Logic,
        conditions: Vec<Condition>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            rule_type: Some(rule_type),
            description: String::new(),
            condition: None,
            operator: None,
            value: None,
            conditions: Some(ConditionList::Parsed(conditions)),
            logic: Some(logic),
            ai_generated: false,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn effective_type(&self) -> RuleType {
        self.rule_type.unwrap_or_default()
    }

    pub fn is_exclude(&self) -> bool {
        self.effective_type() == RuleType::Exclude
    }

    /// A non-empty `conditions` list wins; otherwise the single form if complete.
    pub fn shape(&self) -> RuleShape<'_> {
        if let Some(list) = self.conditions.as_ref().filter(|l| !l.is_empty()) {
            return match list.parsed() {
                Some(conditions) => RuleShape::Compound {
                    conditions,
                    logic: self.logic.as_ref(),
                },
                None => RuleShape::Malformed,
            };
        }
        match (&self.condition, &self.operator, &self.value) {
            (Some(condition), Some(operator), Some(value)) => RuleShape::Single {
                condition,
                operator,
                value,
            },
            _ => RuleShape::Malformed,
        }
    }

    /// Strict check applied to user-authored rules before they enter the rule set.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let invalid = |msg: String| ValidationError::InvalidRule(format!("{}: {msg}", self.name));

        if self.name.trim().is_empty() {
            return Err(ValidationError::InvalidRule("rule name is required".into()));
        }

        let has_single =
            self.condition.is_some() || self.operator.is_some() || self.value.is_some();
        let has_compound = self.conditions.is_some() || self.logic.is_some();
        match (has_single, has_compound) {
            (true, true) => {
                return Err(invalid(
                    "both a single condition and compound conditions are set".into(),
                ))
            }
            (false, false) => return Err(invalid("no condition is set".into())),
            _ => {}
        }

        match self.shape() {
            RuleShape::Single {
                condition,
                operator,
                value,
            } => Condition {
                condition: condition.clone(),
                operator: operator.clone(),
                value: value.clone(),
            }
            .validate()
            .map_err(invalid),
            RuleShape::Compound { conditions, logic } => {
                match logic {
                    Some(Logic::And) | Some(Logic::Or) => {}
                    Some(other) => return Err(invalid(format!("unknown logic '{other}'"))),
                    None => return Err(invalid("compound rule needs AND or OR logic".into())),
                }
                for c in conditions {
                    c.validate().map_err(&invalid)?;
                }
                Ok(())
            }
            RuleShape::Malformed => Err(invalid(
                "condition, operator, and value must all be set (or a non-empty conditions list)"
                    .into(),
            )),
        }
    }

    /// One-line rendering of the rule's test.
    pub fn condition_summary(&self) -> String {
        match self.shape() {
            RuleShape::Single {
                condition,
                operator,
                value,
            } => format!("{} {} {}", condition.label(), operator, value),
            RuleShape::Compound { conditions, logic } => {
                let joiner = format!(" {} ", logic.map(Logic::as_str).unwrap_or("?"));
                let parts: Vec<String> = conditions.iter().map(Condition::summary).collect();
                format!("({})", parts.join(&joiner))
            }
            RuleShape::Malformed => "(no condition)".to_string(),
        }
    }

    /// Tag recorded in `matchedRules` when this rule excludes a circuit.
    pub fn excluded_tag(&self) -> String {
        format!("{EXCLUDED_PREFIX}{}", self.name)
    }
}
