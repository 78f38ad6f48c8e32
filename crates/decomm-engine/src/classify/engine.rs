use serde::Serialize;

use decomm_core::model::{Circuit, Rule};

use crate::eval::DefaultRuleEvaluator;

/// Counts from one classification run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ClassificationSummary {
    pub evaluated: usize,
    pub flagged: usize,
    /// Circuits vetoed by at least one exclude rule.
    pub excluded: usize,
    pub include_rules: usize,
    pub exclude_rules: usize,
}

/// Recompute `flagged` and `matchedRules` for every circuit.
///
/// Include rules run first, in order, appending their names. Exclude rules
/// then run in order; each match clears the flag, removes that rule's own
/// name from the matches and appends `[EXCLUDED] <name>`. Lifecycle status is
/// never read or written.
pub fn classify(circuits: &mut [Circuit], rules: &[Rule]) -> ClassificationSummary {
    let (excludes, includes): (Vec<&Rule>, Vec<&Rule>) = rules.iter().partition(|r| r.is_exclude());
    let evaluator = DefaultRuleEvaluator;
    let mut summary = ClassificationSummary {
        evaluated: circuits.len(),
        include_rules: includes.len(),
        exclude_rules: excludes.len(),
        ..Default::default()
    };

    for circuit in circuits.iter_mut() {
        circuit.flagged = false;
        circuit.matched_rules.clear();

        for rule in &includes {
            if evaluator.evaluate(circuit, rule) {
                circuit.flagged = true;
                circuit.matched_rules.push(rule.name.clone());
            }
        }

        let mut vetoed = false;
        for rule in &excludes {
            if evaluator.evaluate(circuit, rule) {
                vetoed = true;
                circuit.flagged = false;
                circuit.matched_rules.retain(|m| m != &rule.name);
                circuit.matched_rules.push(rule.excluded_tag());
            }
        }

        if circuit.flagged {
            summary.flagged += 1;
        }
        if vetoed {
            summary.excluded += 1;
        }
    }

    tracing::debug!(
        includes = summary.include_rules,
        excludes = summary.exclude_rules,
        "classification pass complete"
    );
    summary
}

/// Circuits awaiting a review decision: flagged and still active.
pub fn review_queue(circuits: &[Circuit]) -> Vec<&Circuit> {
    circuits
        .iter()
        .filter(|c| c.flagged && c.is_active())
        .collect()
}

/// All circuits, flagged ones first, otherwise in stored order.
pub fn flagged_first(circuits: &[Circuit]) -> Vec<&Circuit> {
    let mut sorted: Vec<&Circuit> = circuits.iter().collect();
    sorted.sort_by_key(|c| !c.flagged);
    sorted
}
