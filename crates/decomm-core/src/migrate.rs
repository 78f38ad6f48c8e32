use anyhow::{bail, Result};
use serde_json::Value;

/// Normalize a legacy rules document.
///
/// Numeric ids become strings and rules without a `type` become `include`.
/// Returns the migrated document and the number of rules that changed.
pub fn migrate_rules(data: &Value) -> Result<(Value, usize)> {
    let Some(rules) = data.as_array() else {
        bail!("rules document must be a JSON array");
    };

    let mut changed = 0usize;
    let mut migrated = Vec::with_capacity(rules.len());
    for (i, rule) in rules.iter().enumerate() {
        let Some(obj) = rule.as_object() else {
            bail!("rule at index {i} is not an object");
        };
        let mut obj = obj.clone();
        let mut touched = false;

        if let Some(Value::Number(n)) = obj.get("id") {
            let id = n.to_string();
            obj.insert("id".to_string(), Value::String(id));
            touched = true;
        }
        if !obj.contains_key("type") {
            obj.insert("type".to_string(), Value::String("include".to_string()));
            touched = true;
        }

        if touched {
            changed += 1;
        }
        migrated.push(Value::Object(obj));
    }
    Ok((Value::Array(migrated), changed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn migrate_stringifies_ids_and_adds_type() {
        let legacy = json!([
            {"id": 1700000000001u64, "name": "Low", "condition": "utilization", "operator": "<", "value": 20},
            {"id": "r2", "name": "Closed", "type": "exclude", "condition": "site_status", "operator": "==", "value": "closed"}
        ]);
        let (migrated, changed) = migrate_rules(&legacy).unwrap();
        assert_eq!(changed, 1);
        assert_eq!(migrated[0]["id"], "1700000000001");
        assert_eq!(migrated[0]["type"], "include");
        assert_eq!(migrated[1], legacy[1]);
    }

    #[test]
    fn migrate_is_idempotent() {
        let legacy = json!([{"id": 7, "name": "Old", "condition": "age", "operator": ">", "value": 48}]);
        let (once, _) = migrate_rules(&legacy).unwrap();
        let (twice, changed) = migrate_rules(&once).unwrap();
        assert_eq!(once, twice);
        assert_eq!(changed, 0);
    }

    #[test]
    fn migrate_rejects_non_array() {
        assert!(migrate_rules(&json!({"rules": []})).is_err());
        assert!(migrate_rules(&json!([1, 2])).is_err());
    }
}
