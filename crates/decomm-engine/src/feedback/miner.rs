use serde::{Deserialize, Serialize};

use decomm_core::fields::FieldRef;
use decomm_core::model::{Circuit, Rule};
use decomm_core::types::{CircuitStatus, Operator, RuleType, Scalar};

use super::patterns::{FeedbackPattern, PATTERNS};

/// Example length in UTF-16 code units, the unit browsers count in.
const EXAMPLE_UNITS: usize = 100;

/// An exclusion rule proposed from rejection feedback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestedRule {
    #[serde(rename = "patternKey")]
    pub pattern_key: String,
    pub name: String,
    pub description: String,
    /// First matching comment, truncated.
    pub example: String,
    #[serde(rename = "matchedComments")]
    pub matched_comments: usize,
}

/// Rejected circuits that carry at least one comment.
pub fn rejected_with_feedback(circuits: &[Circuit]) -> Vec<&Circuit> {
    circuits
        .iter()
        .filter(|c| c.status == CircuitStatus::Rejected && !c.comments.is_empty())
        .collect()
}

pub fn feedback_count(circuits: &[Circuit]) -> usize {
    rejected_with_feedback(circuits).len()
}

/// Scan every comment of the given circuits against the pattern table.
///
/// One suggestion per matched pattern, in table order. The first matching
/// comment supplies the example; later ones only bump `matched_comments`.
pub fn analyze(rejected: &[&Circuit]) -> Vec<SuggestedRule> {
    let mut found: Vec<Option<SuggestedRule>> = vec![None; PATTERNS.len()];

    for comment in rejected.iter().copied().flat_map(|c| c.comments.iter()) {
        let lowered = comment.text.to_lowercase();
        for (slot, pattern) in found.iter_mut().zip(PATTERNS.iter()) {
            if !pattern.matches(&lowered) {
                continue;
            }
            match slot {
                Some(s) => s.matched_comments += 1,
                None => *slot = Some(suggest(pattern, &comment.text)),
            }
        }
    }

    let suggestions: Vec<SuggestedRule> = found.into_iter().flatten().collect();
    tracing::info!(
        circuits = rejected.len(),
        suggestions = suggestions.len(),
        "feedback analyzed"
    );
    suggestions
}

fn suggest(pattern: &FeedbackPattern, text: &str) -> SuggestedRule {
    SuggestedRule {
        pattern_key: pattern.key.to_string(),
        name: pattern.name.to_string(),
        description: pattern.description.to_string(),
        example: truncate_example(text),
        matched_comments: 1,
    }
}

/// A character straddling the limit is dropped whole.
fn truncate_example(text: &str) -> String {
    let mut units = 0;
    for (at, ch) in text.char_indices() {
        units += ch.len_utf16();
        if units > EXAMPLE_UNITS {
            return format!("{}...", &text[..at]);
        }
    }
    text.to_string()
}

/// Turn a suggestion into a learned exclude rule.
///
/// The rule tests a `tags` field that circuits do not have, so it never
/// matches during classification.
pub fn accept(suggestion: &SuggestedRule, id: impl Into<String>) -> Rule {
    Rule {
        id: id.into(),
        name: suggestion.name.clone(),
        rule_type: Some(RuleType::Exclude),
        description: suggestion.description.clone(),
        condition: Some(FieldRef::resolve("tags")),
        operator: Some(Operator::Other("excludes".to_string())),
        value: Some(Scalar::Text(suggestion.pattern_key.clone())),
        conditions: None,
        logic: None,
        ai_generated: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::classify;
    use crate::lifecycle::LifecycleManager;

    fn rejected(id: &str, comments: &[&str]) -> Circuit {
        let mut c = Circuit::new(id, "Tampa - Ybor City");
        let m = LifecycleManager::new("Network Engineer");
        let mut one = vec![c.clone()];
        m.reject(&mut one, id, comments[0]).unwrap();
        c = one.remove(0);
        for extra in &comments[1..] {
            let mut first = c.comments[0].clone();
            first.text = extra.to_string();
            c.comments.push(first);
        }
        c
    }

    #[test]
    fn one_suggestion_per_pattern_example_from_first() {
        let a = rejected("a", &["This is a CRITICAL backbone link"]);
        let b = rejected("b", &["critical for the west region"]);
        let out = analyze(&[&a, &b]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].pattern_key, "critical");
        assert_eq!(out[0].example, "This is a CRITICAL backbone link");
        assert_eq!(out[0].matched_comments, 2);
    }

    #[test]
    fn output_follows_table_order() {
        let a = rejected("a", &["hospital uplink", "also the 911 trunk"]);
        let keys: Vec<String> = analyze(&[&a]).into_iter().map(|s| s.pattern_key).collect();
        assert_eq!(keys, vec!["911", "hospital"]);
    }

    #[test]
    fn one_comment_can_hit_several_patterns() {
        let a = rejected("a", &["Backup path for an emergency dispatch customer"]);
        let keys: Vec<String> = analyze(&[&a]).into_iter().map(|s| s.pattern_key).collect();
        assert_eq!(keys, vec!["911", "backup", "customer"]);
    }

    #[test]
    fn long_comments_are_truncated_by_utf16_units() {
        let long = format!("critical {}", "é".repeat(120));
        let a = rejected("a", &[long.as_str()]);
        let ex = &analyze(&[&a])[0].example;
        assert!(ex.ends_with("..."));
        assert_eq!(ex.chars().count(), 103);

        let exact = format!("critical{}", "x".repeat(92));
        let b = rejected("b", &[exact.as_str()]);
        assert_eq!(analyze(&[&b])[0].example, exact);

        // Each emoji is two units: 9 + 45 * 2 = 99, the next one would cross 100.
        let wide = format!("critical {}", "\u{1F6A8}".repeat(60));
        let c = rejected("c", &[wide.as_str()]);
        let ex = &analyze(&[&c])[0].example;
        assert_eq!(ex.trim_end_matches("...").encode_utf16().count(), 99);
        assert_eq!(ex.chars().filter(|ch| *ch == '\u{1F6A8}').count(), 45);
    }

    #[test]
    fn only_rejected_with_comments_are_selected() {
        let mut circuits = vec![
            rejected("a", &["vital"]),
            Circuit::new("b", "x"),
            Circuit::new("c", "y"),
        ];
        circuits[2].status = CircuitStatus::Rejected;
        assert_eq!(feedback_count(&circuits), 1);
        assert_eq!(rejected_with_feedback(&circuits)[0].id, "a");
    }

    #[test]
    fn no_keywords_no_suggestions() {
        let a = rejected("a", &["Link is fine, leave it"]);
        assert!(analyze(&[&a]).is_empty());
        assert!(analyze(&[]).is_empty());
    }

    #[test]
    fn accepted_rule_is_inert_exclude() {
        let a = rejected("a", &["mission critical"]);
        let suggestion = analyze(&[&a]).remove(0);
        let rule = accept(&suggestion, "learned-1");
        assert!(rule.is_exclude());
        assert!(rule.ai_generated);

        let v = serde_json::to_value(&rule).unwrap();
        assert_eq!(v["condition"], "tags");
        assert_eq!(v["operator"], "excludes");
        assert_eq!(v["value"], "critical");
        assert_eq!(v["aiGenerated"], true);

        let mut circuits = vec![Circuit::new("x", "y")];
        circuits[0].utilization = 1.0;
        let low = decomm_core::templates::default_rules().remove(0);
        classify(&mut circuits, &[low, rule]);
        assert!(circuits[0].flagged);
    }
}
