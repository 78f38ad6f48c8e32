use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use decomm_core::errors::{StoreError, ValidationError};
use decomm_core::migrate::migrate_rules;
use decomm_core::model::{Circuit, Rule};
use decomm_core::traits::{KeyValueStore, CIRCUITS_KEY, NOTIFICATIONS_KEY, RULES_KEY};

use super::journal::Journal;
use crate::analytics::{self, Analytics};
use crate::classify::{classify, ClassificationSummary};
use crate::csv::{export_csv, import_csv, ImportReport};
use crate::eval::{DefaultRuleEvaluator, RuleTrace};
use crate::feedback::{self, SuggestedRule};
use crate::lifecycle::{BatchReport, LifecycleManager, TransitionOutcome};

/// Only the most recent notifications are kept.
pub const NOTIFICATION_CAP: usize = 50;

/// A user-facing outcome message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub message: String,
    pub ts: DateTime<Utc>,
}

/// Owner of the rule set, the circuit fleet and recent notifications.
///
/// Operations mutate memory only; [`DecommStore::save`] persists the three
/// documents and flushes pending journal entries.
pub struct DecommStore<S: KeyValueStore> {
    kv: S,
    rules: Vec<Rule>,
    circuits: Vec<Circuit>,
    notifications: Vec<Notification>,
    lifecycle: LifecycleManager,
    journal: Option<Journal>,
    pending: Vec<Value>,
}

fn load_doc<T: serde::de::DeserializeOwned>(
    kv: &impl KeyValueStore,
    key: &str,
) -> Result<Vec<T>, StoreError> {
    match kv.load(key)? {
        None => Ok(Vec::new()),
        Some(value) => serde_json::from_value(value).map_err(|source| StoreError::Decode {
            key: key.to_string(),
            source,
        }),
    }
}

fn to_doc<T: Serialize>(key: &str, value: &T) -> Result<Value, StoreError> {
    serde_json::to_value(value).map_err(|source| StoreError::Encode {
        key: key.to_string(),
        source,
    })
}

impl<S: KeyValueStore> DecommStore<S> {
    /// Load all documents. Missing keys load as empty; the rules document is
    /// migrated from its legacy shape first.
    pub fn open(kv: S, reviewer: impl Into<String>) -> Result<Self, StoreError> {
        let rules: Vec<Rule> = match kv.load(RULES_KEY)? {
            None => Vec::new(),
            Some(raw) => {
                let (migrated, changed) =
                    migrate_rules(&raw).map_err(|e| StoreError::Migration {
                        key: RULES_KEY.to_string(),
                        message: e.to_string(),
                    })?;
                if changed > 0 {
                    tracing::warn!(rules = changed, "migrated legacy rules on load");
                }
                serde_json::from_value(migrated).map_err(|source| StoreError::Decode {
                    key: RULES_KEY.to_string(),
                    source,
                })?
            }
        };
        let circuits: Vec<Circuit> = load_doc(&kv, CIRCUITS_KEY)?;
        let notifications = load_doc(&kv, NOTIFICATIONS_KEY)?;
        tracing::info!(
            rules = rules.len(),
            circuits = circuits.len(),
            "store opened"
        );
        Ok(Self {
            kv,
            rules,
            circuits,
            notifications,
            lifecycle: LifecycleManager::new(reviewer),
            journal: None,
            pending: Vec::new(),
        })
    }

    /// Record engine events to `journal` on every save.
    pub fn with_journal(mut self, journal: Journal) -> Self {
        self.journal = Some(journal);
        self
    }

    pub fn save(&mut self) -> Result<(), StoreError> {
        let rules = to_doc(RULES_KEY, &self.rules)?;
        let circuits = to_doc(CIRCUITS_KEY, &self.circuits)?;
        let notifications = to_doc(NOTIFICATIONS_KEY, &self.notifications)?;
        self.kv.save(RULES_KEY, &rules)?;
        self.kv.save(CIRCUITS_KEY, &circuits)?;
        self.kv.save(NOTIFICATIONS_KEY, &notifications)?;

        if let Some(journal) = &self.journal {
            journal.append(&self.pending)?;
        }
        self.pending.clear();
        tracing::info!(
            rules = self.rules.len(),
            circuits = self.circuits.len(),
            "store saved"
        );
        Ok(())
    }

    pub fn kv(&self) -> &S {
        &self.kv
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn circuits(&self) -> &[Circuit] {
        &self.circuits
    }

    pub fn circuit(&self, id: &str) -> Option<&Circuit> {
        self.circuits.iter().find(|c| c.id == id)
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    pub fn reviewer(&self) -> &str {
        self.lifecycle.author()
    }

    /// Replace the fleet and rule set wholesale (workspace initialization).
    pub fn reset(&mut self, circuits: Vec<Circuit>, rules: Vec<Rule>) {
        self.circuits = circuits;
        self.rules = rules;
        self.notifications.clear();
        self.record(json!({
            "event_type": "reset",
            "circuits": self.circuits.len(),
            "rules": self.rules.len(),
        }));
    }

    pub fn notify(&mut self, message: impl Into<String>) {
        self.notifications.push(Notification {
            message: message.into(),
            ts: Utc::now(),
        });
        if self.notifications.len() > NOTIFICATION_CAP {
            let excess = self.notifications.len() - NOTIFICATION_CAP;
            self.notifications.drain(..excess);
        }
    }

    fn record(&mut self, entry: Value) {
        self.pending.push(entry);
    }

    /// First unused id of the form `<prefix>-<n>`.
    pub fn next_rule_id(&self, prefix: &str) -> String {
        (self.rules.len() + 1..)
            .map(|n| format!("{prefix}-{n}"))
            .find(|id| !self.rules.iter().any(|r| &r.id == id))
            .unwrap_or_else(|| format!("{prefix}-{}", Utc::now().timestamp_millis()))
    }

    /// Validate and append a user-authored rule. A blank or taken id is replaced.
    pub fn add_rule(&mut self, mut rule: Rule) -> Result<&Rule, ValidationError> {
        rule.validate()?;
        if rule.id.trim().is_empty() || self.rules.iter().any(|r| r.id == rule.id) {
            rule.id = self.next_rule_id("rule");
        }
        tracing::info!(id = %rule.id, name = %rule.name, kind = rule.effective_type().as_str(), "rule added");
        self.record(json!({
            "event_type": "rule_added",
            "rule_id": rule.id,
            "name": rule.name,
            "type": rule.effective_type().as_str(),
        }));
        self.notify("Rule added successfully!");
        self.rules.push(rule);
        Ok(&self.rules[self.rules.len() - 1])
    }

    pub fn delete_rule(&mut self, id: &str) -> Result<Rule, ValidationError> {
        let idx = self
            .rules
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| ValidationError::UnknownRule(id.to_string()))?;
        let rule = self.rules.remove(idx);
        self.record(json!({
            "event_type": "rule_deleted",
            "rule_id": rule.id,
            "name": rule.name,
        }));
        self.notify("Rule deleted successfully!");
        Ok(rule)
    }

    /// Classify every circuit against the current rule set.
    pub fn run_classification(&mut self) -> Result<ClassificationSummary, ValidationError> {
        if self.rules.is_empty() {
            return Err(ValidationError::NoRules);
        }
        let summary = classify(&mut self.circuits, &self.rules);
        tracing::info!(
            evaluated = summary.evaluated,
            flagged = summary.flagged,
            excluded = summary.excluded,
            "classification run"
        );
        self.record(json!({
            "event_type": "classification",
            "evaluated": summary.evaluated,
            "flagged": summary.flagged,
            "excluded": summary.excluded,
            "rules": self.rules.len(),
        }));
        self.notify(format!(
            "Analysis completed! {} circuits flagged for review",
            summary.flagged
        ));
        Ok(summary)
    }

    /// Per-rule verdicts for one circuit, in rule order.
    pub fn explain(&self, circuit_id: &str) -> Option<Vec<RuleTrace>> {
        let circuit = self.circuit(circuit_id)?;
        Some(
            self.rules
                .iter()
                .map(|r| DefaultRuleEvaluator.explain(circuit, r))
                .collect(),
        )
    }

    pub fn approve(&mut self, id: &str, comment: &str) -> Result<TransitionOutcome, ValidationError> {
        let outcome = self.lifecycle.approve(&mut self.circuits, id, comment)?;
        if outcome.applied() {
            self.record_review(&outcome, comment);
            self.notify(format!("Circuit {id} approved for decommission."));
        }
        Ok(outcome)
    }

    pub fn reject(&mut self, id: &str, comment: &str) -> Result<TransitionOutcome, ValidationError> {
        let outcome = self.lifecycle.reject(&mut self.circuits, id, comment)?;
        if outcome.applied() {
            self.record_review(&outcome, comment);
            self.notify(format!("Circuit {id} will remain active."));
        }
        Ok(outcome)
    }

    pub fn bulk_approve(
        &mut self,
        ids: &[String],
        comment: &str,
    ) -> Result<BatchReport, ValidationError> {
        let report = self.lifecycle.bulk_approve(&mut self.circuits, ids, comment)?;
        self.record_batch(&report, Some(comment));
        self.notify(format!(
            "{} circuit(s) approved for decommission.",
            report.applied
        ));
        Ok(report)
    }

    pub fn bulk_reject(
        &mut self,
        ids: &[String],
        comment: &str,
    ) -> Result<BatchReport, ValidationError> {
        let report = self.lifecycle.bulk_reject(&mut self.circuits, ids, comment)?;
        self.record_batch(&report, Some(comment));
        self.notify(format!("{} circuit(s) will remain active.", report.applied));
        Ok(report)
    }

    pub fn send_for_decommission(&mut self, ids: &[String]) -> Result<BatchReport, ValidationError> {
        let report = self.lifecycle.send_for_decommission(&mut self.circuits, ids)?;
        self.record_batch(&report, None);
        self.notify(format!(
            "{} circuit(s) successfully sent for decommission!",
            report.applied
        ));
        Ok(report)
    }

    fn record_review(&mut self, outcome: &TransitionOutcome, comment: &str) {
        let entry = json!({
            "event_type": outcome.action.as_str(),
            "circuit_id": outcome.circuit_id,
            "author": self.reviewer(),
            "comment": comment,
        });
        self.record(entry);
    }

    fn record_batch(&mut self, report: &BatchReport, comment: Option<&str>) {
        let entries: Vec<Value> = report
            .applied_ids()
            .map(|id| {
                let mut entry = json!({
                    "event_type": report.action.as_str(),
                    "circuit_id": id,
                    "author": self.reviewer(),
                });
                if let (Some(c), Some(obj)) = (comment, entry.as_object_mut()) {
                    obj.insert("comment".into(), Value::String(c.to_string()));
                }
                entry
            })
            .collect();
        self.pending.extend(entries);
    }

    pub fn feedback_count(&self) -> usize {
        feedback::feedback_count(&self.circuits)
    }

    /// Exclusion suggestions mined from rejection comments.
    pub fn suggestions(&mut self) -> Result<Vec<SuggestedRule>, ValidationError> {
        let rejected = feedback::rejected_with_feedback(&self.circuits);
        if rejected.is_empty() {
            return Err(ValidationError::NoFeedback);
        }
        let suggestions = feedback::analyze(&rejected);
        self.notify(format!(
            "Generated {} exclusion rule suggestions",
            suggestions.len()
        ));
        Ok(suggestions)
    }

    /// Add the learned rule for `pattern_key` from the current suggestions.
    pub fn accept_suggestion(&mut self, pattern_key: &str) -> Result<&Rule, ValidationError> {
        let rejected = feedback::rejected_with_feedback(&self.circuits);
        if rejected.is_empty() {
            return Err(ValidationError::NoFeedback);
        }
        let suggestion = feedback::analyze(&rejected)
            .into_iter()
            .find(|s| s.pattern_key == pattern_key)
            .ok_or_else(|| ValidationError::UnknownPattern(pattern_key.to_string()))?;

        let rule = feedback::accept(&suggestion, self.next_rule_id("learned"));
        self.record(json!({
            "event_type": "rule_learned",
            "rule_id": rule.id,
            "name": rule.name,
            "pattern_key": pattern_key,
        }));
        self.notify(format!(
            "Exclusion rule \"{}\" added successfully!",
            rule.name
        ));
        self.rules.push(rule);
        Ok(&self.rules[self.rules.len() - 1])
    }

    /// Append circuits parsed from CSV text.
    pub fn import_csv(&mut self, text: &str) -> ImportReport {
        let (fresh, report) = import_csv(text, &self.circuits, self.lifecycle.author());
        self.circuits.extend(fresh);
        self.record(json!({
            "event_type": "import",
            "imported": report.imported,
            "duplicates": report.duplicates,
            "malformed": report.malformed,
        }));
        self.notify(format!("Imported {} circuits", report.imported));
        report
    }

    pub fn export_csv(&self) -> String {
        export_csv(&self.circuits)
    }

    pub fn analytics(&self) -> Analytics {
        analytics::compute(&self.circuits, &self.rules)
    }

    /// Events not yet flushed to the journal.
    pub fn pending_events(&self) -> &[Value] {
        &self.pending
    }
}
