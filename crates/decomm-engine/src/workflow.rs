//! Staged runs behind the `classify`, `learn` and `decommission` commands.
//!
//! Each run reports four labelled stages to a [`ProgressSink`] and saves the
//! store once the last stage succeeds.

use decomm_core::errors::{DecommError, ValidationError};
use decomm_core::traits::{KeyValueStore, ProgressSink};

use crate::classify::ClassificationSummary;
use crate::feedback::SuggestedRule;
use crate::lifecycle::BatchReport;
use crate::store::DecommStore;

pub const ANALYSIS_STAGES: [&str; 4] = ["Data Retrieval", "Rules Engine", "Validation", "Output"];
pub const LEARNING_STAGES: [&str; 4] = [
    "Data Collection",
    "Pattern Analysis",
    "Rule Generation",
    "Validation",
];
pub const DECOMMISSION_STAGES: [&str; 4] =
    ["Collection", "Validation", "API Submission", "Confirmation"];

/// Discards progress.
pub struct NullSink;

impl ProgressSink for NullSink {
    fn stage_started(&mut self, _index: usize, _total: usize, _label: &str) {}
    fn stage_completed(&mut self, _index: usize, _total: usize, _detail: &str) {}
}

struct Stages<'a> {
    labels: &'static [&'static str],
    sink: &'a mut dyn ProgressSink,
    next: usize,
}

impl<'a> Stages<'a> {
    fn new(labels: &'static [&'static str], sink: &'a mut dyn ProgressSink) -> Self {
        Self {
            labels,
            sink,
            next: 0,
        }
    }

    fn step(&mut self, detail: impl FnOnce() -> String) {
        let total = self.labels.len();
        let label = self.labels.get(self.next).copied().unwrap_or("Stage");
        self.sink.stage_started(self.next + 1, total, label);
        self.sink.stage_completed(self.next + 1, total, &detail());
        self.next += 1;
    }
}

/// Classify the fleet and save.
pub fn run_analysis<S: KeyValueStore>(
    store: &mut DecommStore<S>,
    sink: &mut dyn ProgressSink,
) -> Result<ClassificationSummary, DecommError> {
    let mut stages = Stages::new(&ANALYSIS_STAGES, sink);
    let loaded = store.circuits().len();
    stages.step(|| format!("loaded {loaded} circuits"));

    let summary = store.run_classification()?;
    stages.step(|| format!("flagged {} circuits", summary.flagged));
    stages.step(|| format!("validated {} circuits", summary.evaluated));

    store.save()?;
    stages.step(|| "saved results".to_string());
    Ok(summary)
}

/// Mine rejection feedback. With `accept`, each listed pattern key becomes an
/// exclusion rule and the store is saved. Keys are checked against the
/// suggestions before any rule is added.
pub fn run_learning<S: KeyValueStore>(
    store: &mut DecommStore<S>,
    accept: &[String],
    sink: &mut dyn ProgressSink,
) -> Result<Vec<SuggestedRule>, DecommError> {
    let mut stages = Stages::new(&LEARNING_STAGES, sink);
    let collected = store.feedback_count();
    stages.step(|| format!("collected {collected} rejections"));

    let suggestions = store.suggestions()?;
    stages.step(|| format!("identified {} patterns", suggestions.len()));

    if let Some(unknown) = accept
        .iter()
        .find(|key| !suggestions.iter().any(|s| &s.pattern_key == *key))
    {
        return Err(ValidationError::UnknownPattern(unknown.clone()).into());
    }
    let mut created = 0;
    for (i, key) in accept.iter().enumerate() {
        if accept[..i].contains(key) {
            continue;
        }
        store.accept_suggestion(key)?;
        created += 1;
    }
    stages.step(|| format!("created {created} rules"));

    store.save()?;
    stages.step(|| "completed validation".to_string());
    Ok(suggestions)
}

/// Send approved circuits for decommission and save.
pub fn run_decommission<S: KeyValueStore>(
    store: &mut DecommStore<S>,
    ids: &[String],
    sink: &mut dyn ProgressSink,
) -> Result<BatchReport, DecommError> {
    let mut stages = Stages::new(&DECOMMISSION_STAGES, sink);
    stages.step(|| format!("collected {} circuits", ids.len()));

    let report = store.send_for_decommission(ids)?;
    stages.step(|| format!("validated {} circuits", report.applied));
    stages.step(|| format!("sent {} for decommission", report.applied));

    store.save()?;
    stages.step(|| "confirmed circuits in process".to_string());
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryKvStore;
    use decomm_core::model::Circuit;
    use decomm_core::templates::default_rules;
    use decomm_core::traits::CIRCUITS_KEY;

    #[derive(Default)]
    struct Recorder {
        started: Vec<String>,
        details: Vec<String>,
    }

    impl ProgressSink for Recorder {
        fn stage_started(&mut self, index: usize, total: usize, label: &str) {
            self.started.push(format!("{index}/{total} {label}"));
        }
        fn stage_completed(&mut self, _index: usize, _total: usize, detail: &str) {
            self.details.push(detail.to_string());
        }
    }

    fn store() -> DecommStore<MemoryKvStore> {
        let mut s = DecommStore::open(MemoryKvStore::new(), "Network Engineer").unwrap();
        let mut idle = Circuit::new("CKT-1", "Reno - Downtown");
        idle.utilization = 5.0;
        idle.traffic = 500.0;
        let mut busy = Circuit::new("CKT-2", "Boise - Downtown");
        busy.utilization = 80.0;
        busy.traffic = 500.0;
        s.reset(vec![idle, busy], default_rules());
        s
    }

    #[test]
    fn analysis_reports_four_stages_and_saves() {
        let mut s = store();
        let mut rec = Recorder::default();
        let summary = run_analysis(&mut s, &mut rec).unwrap();
        assert_eq!(summary.flagged, 1);
        assert_eq!(
            rec.started,
            vec![
                "1/4 Data Retrieval",
                "2/4 Rules Engine",
                "3/4 Validation",
                "4/4 Output"
            ]
        );
        assert_eq!(rec.details[0], "loaded 2 circuits");
        assert_eq!(rec.details[1], "flagged 1 circuits");
        assert!(s.kv().get(CIRCUITS_KEY).is_some());
    }

    #[test]
    fn analysis_without_rules_stops_early() {
        let mut s = DecommStore::open(MemoryKvStore::new(), "n").unwrap();
        let mut rec = Recorder::default();
        let err = run_analysis(&mut s, &mut rec).unwrap_err();
        assert!(matches!(err, DecommError::Validation(ValidationError::NoRules)));
        assert_eq!(rec.started.len(), 1);
        assert!(s.kv().get(CIRCUITS_KEY).is_none());
    }

    #[test]
    fn learning_accepts_requested_patterns() {
        let mut s = store();
        s.reject("CKT-2", "Backup link for the 911 center").unwrap();
        let suggestions = run_learning(&mut s, &["911".to_string()], &mut NullSink).unwrap();
        let keys: Vec<&str> = suggestions.iter().map(|x| x.pattern_key.as_str()).collect();
        assert_eq!(keys, vec!["911", "backup"]);
        assert!(s.rules().iter().any(|r| r.ai_generated && r.is_exclude()));
    }

    #[test]
    fn learning_with_an_unknown_key_adds_nothing() {
        let mut s = store();
        s.reject("CKT-2", "Backup link for the 911 center").unwrap();
        let err = run_learning(
            &mut s,
            &["911".to_string(), "hospital".to_string()],
            &mut NullSink,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            DecommError::Validation(ValidationError::UnknownPattern(ref k)) if k == "hospital"
        ));
        assert!(!s.rules().iter().any(|r| r.ai_generated));
    }

    #[test]
    fn learning_reports_rules_actually_created() {
        let mut s = store();
        s.reject("CKT-2", "Backup link for the 911 center").unwrap();
        let mut rec = Recorder::default();
        let keys = ["backup".to_string(), "backup".to_string()];
        run_learning(&mut s, &keys, &mut rec).unwrap();
        assert_eq!(rec.details[1], "identified 2 patterns");
        assert_eq!(rec.details[2], "created 1 rules");
        assert_eq!(s.rules().iter().filter(|r| r.ai_generated).count(), 1);
    }

    #[test]
    fn decommission_flow_marks_in_process() {
        let mut s = store();
        s.approve("CKT-1", "idle for a year").unwrap();
        let mut rec = Recorder::default();
        let report = run_decommission(
            &mut s,
            &["CKT-1".to_string(), "CKT-2".to_string()],
            &mut rec,
        )
        .unwrap();
        assert_eq!(report.applied, 1);
        assert_eq!(rec.details[3], "confirmed circuits in process");
        assert!(s.circuit("CKT-1").unwrap().is_in_process());
        assert!(!s.circuit("CKT-2").unwrap().is_in_process());
    }
}
