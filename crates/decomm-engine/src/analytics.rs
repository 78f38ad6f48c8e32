use serde::Serialize;

use decomm_core::model::{Circuit, Rule};
use decomm_core::types::CircuitStatus;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeyMetrics {
    pub total: usize,
    /// Flagged and still awaiting review.
    pub flagged: usize,
    /// Approved, not yet in process.
    pub approved: usize,
    pub rejected: usize,
    pub in_process: usize,
    /// Active and not flagged.
    pub pending: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineStages {
    pub analysis: usize,
    pub review: usize,
    pub approved: usize,
    pub in_process: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopRule {
    pub name: String,
    pub matches: usize,
}

impl std::fmt::Display for TopRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({} matches)", self.name, self.matches)
    }
}

/// Footprint of circuits approved or in process.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Savings {
    pub circuits: usize,
    pub bandwidth_mbps: u64,
    /// Rounded to one decimal place.
    pub avg_utilization: f64,
    pub avg_age_months: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analytics {
    pub metrics: KeyMetrics,
    pub pipeline: PipelineStages,
    pub rules: usize,
    pub top_rule: Option<TopRule>,
    pub savings: Savings,
}

pub fn compute(circuits: &[Circuit], rules: &[Rule]) -> Analytics {
    let count = |pred: fn(&Circuit) -> bool| circuits.iter().filter(|&c| pred(c)).count();

    let under_review = count(|c| c.flagged && c.is_active());
    let pending_decom = count(Circuit::is_pending_decommission);
    let in_process = count(Circuit::is_in_process);
    let active = count(Circuit::is_active);

    let metrics = KeyMetrics {
        total: circuits.len(),
        flagged: under_review,
        approved: pending_decom,
        rejected: count(|c| c.status == CircuitStatus::Rejected),
        in_process,
        pending: count(|c| c.is_active() && !c.flagged),
    };
    let pipeline = PipelineStages {
        analysis: active,
        review: under_review,
        approved: pending_decom,
        in_process,
    };

    Analytics {
        metrics,
        pipeline,
        rules: rules.len(),
        top_rule: top_rule(circuits),
        savings: savings(circuits),
    }
}

/// Most frequent `matchedRules` entry; ties go to the first seen.
fn top_rule(circuits: &[Circuit]) -> Option<TopRule> {
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for name in circuits.iter().flat_map(|c| c.matched_rules.iter()) {
        match counts.iter_mut().find(|(n, _)| *n == name.as_str()) {
            Some((_, k)) => *k += 1,
            None => counts.push((name.as_str(), 1)),
        }
    }
    let mut best: Option<(&str, usize)> = None;
    for (name, k) in counts {
        if best.map_or(true, |(_, b)| k > b) {
            best = Some((name, k));
        }
    }
    best.map(|(name, matches)| TopRule {
        name: name.to_string(),
        matches,
    })
}

fn savings(circuits: &[Circuit]) -> Savings {
    let decom: Vec<&Circuit> = circuits
        .iter()
        .filter(|c| c.status == CircuitStatus::Approved || c.is_in_process())
        .collect();
    if decom.is_empty() {
        return Savings {
            circuits: 0,
            bandwidth_mbps: 0,
            avg_utilization: 0.0,
            avg_age_months: 0,
        };
    }
    let n = decom.len() as f64;
    let bandwidth_mbps = decom.iter().map(|c| u64::from(c.bandwidth)).sum();
    let util = decom.iter().map(|c| c.utilization).sum::<f64>() / n;
    let age = decom.iter().map(|c| f64::from(c.age)).sum::<f64>() / n;
    Savings {
        circuits: decom.len(),
        bandwidth_mbps,
        avg_utilization: (util * 10.0).round() / 10.0,
        avg_age_months: age.round() as u64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use decomm_core::types::DecommissionStatus;

    fn circuit(id: &str, status: CircuitStatus, flagged: bool) -> Circuit {
        let mut c = Circuit::new(id, "Mesa - Downtown");
        c.status = status;
        c.flagged = flagged;
        c
    }

    #[test]
    fn metrics_partition_the_fleet() {
        let mut in_process = circuit("e", CircuitStatus::Approved, false);
        in_process.decommission_status = Some(DecommissionStatus::InProcess);
        let circuits = vec![
            circuit("a", CircuitStatus::Active, true),
            circuit("b", CircuitStatus::Active, false),
            circuit("c", CircuitStatus::Approved, true),
            circuit("d", CircuitStatus::Rejected, true),
            in_process,
        ];
        let a = compute(&circuits, &[]);
        assert_eq!(
            a.metrics,
            KeyMetrics {
                total: 5,
                flagged: 1,
                approved: 1,
                rejected: 1,
                in_process: 1,
                pending: 1
            }
        );
        assert_eq!(a.pipeline.analysis, 2);
        assert_eq!(a.pipeline.review, 1);
        assert_eq!(a.savings.circuits, 2);
    }

    #[test]
    fn top_rule_prefers_first_seen_on_tie() {
        let mut a = circuit("a", CircuitStatus::Active, true);
        a.matched_rules = vec!["Low".into(), "Old".into()];
        let mut b = circuit("b", CircuitStatus::Active, true);
        b.matched_rules = vec!["Old".into(), "Low".into()];
        let top = top_rule(&[a.clone(), b.clone()]).unwrap();
        assert_eq!(top.to_string(), "Low (2 matches)");

        b.matched_rules.push("Old".into());
        assert_eq!(top_rule(&[a, b]).unwrap().name, "Old");
        assert_eq!(top_rule(&[]), None);
    }

    #[test]
    fn savings_rounds_like_the_dashboard() {
        let mut a = circuit("a", CircuitStatus::Approved, false);
        a.bandwidth = 100;
        a.utilization = 10.0;
        a.age = 10;
        let mut b = circuit("b", CircuitStatus::Approved, false);
        b.bandwidth = 1000;
        b.utilization = 15.25;
        b.age = 13;
        let s = savings(&[a, b]);
        assert_eq!(s.bandwidth_mbps, 1100);
        assert_eq!(s.avg_utilization, 12.6);
        assert_eq!(s.avg_age_months, 12);
        assert_eq!(savings(&[]).circuits, 0);
    }
}
