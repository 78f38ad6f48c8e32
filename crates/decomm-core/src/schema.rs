use std::collections::HashSet;

use anyhow::{bail, Context, Result};
use jsonschema::Validator;
use serde_json::Value;

use crate::errors::{CheckIssue, CheckReport};
use crate::fields::{Field, FieldKind};
use crate::types::Operator;

const RULES_SCHEMA: &str = include_str!("../schema/rules.schema.json");

/// Compile the embedded rules-document schema.
pub fn validator() -> Result<Validator> {
    let schema: Value =
        serde_json::from_str(RULES_SCHEMA).context("embedded schema is invalid JSON")?;
    Validator::new(&schema).map_err(|e| anyhow::anyhow!("schema compilation failed: {e}"))
}

/// Validate a rules document against the schema only.
pub fn validate(data: &Value) -> Result<()> {
    let v = validator()?;
    if v.is_valid(data) {
        return Ok(());
    }
    let mut msgs: Vec<String> = Vec::new();
    for error in v.iter_errors(data) {
        msgs.push(format!("  {}: {error}", json_path(&error.instance_path.to_string())));
    }
    bail!("validation failed:\n{}", msgs.join("\n"));
}

/// Full check of a rules document (for `decomm rules check --json`).
///
/// Schema violations and duplicate ids are errors. Rules that load but can
/// never match as intended are warnings; `strict` makes warnings fail too.
pub fn check_rules(data: &Value, source: &str, strict: bool) -> CheckReport {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    match validator() {
        Ok(v) => {
            for error in v.iter_errors(data) {
                errors.push(issue(
                    "E001",
                    "schema",
                    error.to_string(),
                    json_path(&error.instance_path.to_string()),
                ));
            }
        }
        Err(e) => errors.push(issue("E000", "schema", e.to_string(), "$".into())),
    }

    let rules = data.as_array().map(Vec::as_slice).unwrap_or_default();
    check_duplicates(rules, &mut errors, &mut warnings);
    for (i, rule) in rules.iter().enumerate() {
        lint_rule(rule, i, &mut warnings);
    }

    let pass = errors.is_empty() && (!strict || warnings.is_empty());
    CheckReport {
        source: source.to_string(),
        rules: rules.len(),
        pass,
        errors,
        warnings,
    }
}

fn issue(code: &str, check: &str, message: String, path: String) -> CheckIssue {
    CheckIssue {
        code: code.to_string(),
        check: check.to_string(),
        message,
        path: Some(path),
    }
}

fn json_path(pointer: &str) -> String {
    if pointer.is_empty() {
        return "$(root)".to_string();
    }
    let mut out = String::from("$");
    for seg in pointer.trim_start_matches('/').split('/') {
        if seg.chars().all(|c| c.is_ascii_digit()) {
            out.push_str(&format!("[{seg}]"));
        } else {
            out.push('.');
            out.push_str(seg);
        }
    }
    out
}

fn id_key(rule: &Value) -> Option<String> {
    match rule.get("id")? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn check_duplicates(
    rules: &[Value],
    errors: &mut Vec<CheckIssue>,
    warnings: &mut Vec<CheckIssue>,
) {
    let mut ids = HashSet::new();
    let mut names = HashSet::new();
    for (i, rule) in rules.iter().enumerate() {
        if let Some(id) = id_key(rule) {
            if !ids.insert(id.clone()) {
                errors.push(issue(
                    "E002",
                    "unique_id",
                    format!("duplicate rule id '{id}'"),
                    format!("$[{i}].id"),
                ));
            }
        }
        if let Some(name) = rule.get("name").and_then(Value::as_str) {
            // Exclusion removes matched names by equality, so two rules with one
            // name cannot be told apart in matchedRules.
            if !names.insert(name.to_string()) {
                warnings.push(issue(
                    "W005",
                    "unique_name",
                    format!("duplicate rule name '{name}'"),
                    format!("$[{i}].name"),
                ));
            }
        }
    }
}

fn lint_rule(rule: &Value, i: usize, warnings: &mut Vec<CheckIssue>) {
    let learned = rule
        .get("aiGenerated")
        .and_then(Value::as_bool)
        .unwrap_or(false);

    if rule.get("id").is_some_and(Value::is_number) || rule.get("type").is_none() {
        warnings.push(issue(
            "W007",
            "legacy",
            "legacy rule shape (numeric id or missing type); migrated on load".into(),
            format!("$[{i}]"),
        ));
    }

    let mut conditions: Vec<(&Value, String)> = Vec::new();
    match rule.get("conditions").and_then(Value::as_array) {
        Some(list) if !list.is_empty() => {
            for (j, c) in list.iter().enumerate() {
                conditions.push((c, format!("$[{i}].conditions[{j}]")));
            }
        }
        _ => conditions.push((rule, format!("$[{i}]"))),
    }

    for (c, path) in conditions {
        let (Some(name), Some(op)) = (
            c.get("condition").and_then(Value::as_str),
            c.get("operator").and_then(Value::as_str),
        ) else {
            continue;
        };
        let value = c.get("value");

        let Some(field) = Field::parse(name) else {
            if learned {
                warnings.push(issue(
                    "W006",
                    "inert",
                    format!(
                        "learned rule tests '{name} {op}', which no circuit has; it never matches"
                    ),
                    path,
                ));
            } else {
                warnings.push(issue(
                    "W001",
                    "field",
                    format!("unknown field '{name}'; condition never matches"),
                    format!("{path}.condition"),
                ));
            }
            continue;
        };

        let operator = Operator::from_wire(op);
        if !operator.is_known() {
            warnings.push(issue(
                "W002",
                "operator",
                format!("unknown operator '{op}'; condition never matches"),
                format!("{path}.operator"),
            ));
            continue;
        }

        match field.kind() {
            FieldKind::Categorical => {
                if !operator.is_equality() {
                    warnings.push(issue(
                        "W003",
                        "operator",
                        format!("operator '{op}' on categorical field '{name}' never matches"),
                        format!("{path}.operator"),
                    ));
                }
                match value {
                    Some(Value::String(s)) if field.options().contains(&s.as_str()) => {}
                    Some(v) => warnings.push(issue(
                        "W004",
                        "value",
                        format!(
                            "{v} is not a valid {name} (expected one of {})",
                            field.options().join(", ")
                        ),
                        format!("{path}.value"),
                    )),
                    None => {}
                }
            }
            FieldKind::Numeric => {
                if let Some(Value::String(s)) = value {
                    let numeric = s.trim().is_empty() || s.trim().parse::<f64>().is_ok();
                    let message = if numeric {
                        format!("numeric field '{name}' compared with string \"{s}\"; coerced to a number")
                    } else {
                        format!("numeric field '{name}' compared with non-numeric \"{s}\"")
                    };
                    warnings.push(issue("W004", "value", message, format!("{path}.value")));
                }
            }
        }
    }
}
