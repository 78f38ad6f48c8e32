use serde::Serialize;

use decomm_core::types::CircuitStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewAction {
    Approve,
    Reject,
    Decommission,
}

impl ReviewAction {
    pub fn as_str(self) -> &'static str {
        match self {
            ReviewAction::Approve => "approve",
            ReviewAction::Reject => "reject",
            ReviewAction::Decommission => "decommission",
        }
    }

    pub fn past_tense(self) -> &'static str {
        match self {
            ReviewAction::Approve => "approved",
            ReviewAction::Reject => "rejected",
            ReviewAction::Decommission => "sent for decommission",
        }
    }
}

/// What happened to one requested circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Disposition {
    Applied,
    NotFound,
    /// The circuit exists but its state does not allow the action.
    NotEligible,
}

/// Record of a single transition attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransitionOutcome {
    pub circuit_id: String,
    pub action: ReviewAction,
    pub disposition: Disposition,
    /// Status before the attempt; `None` when the circuit was not found.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<CircuitStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub in_process: Option<bool>,
}

impl TransitionOutcome {
    pub fn applied(&self) -> bool {
        self.disposition == Disposition::Applied
    }
}

/// Per-id results of a batch action, in request order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub action: ReviewAction,
    pub requested: usize,
    pub applied: usize,
    pub outcomes: Vec<TransitionOutcome>,
}

impl BatchReport {
    pub fn new(action: ReviewAction, outcomes: Vec<TransitionOutcome>) -> Self {
        Self {
            action,
            requested: outcomes.len(),
            applied: outcomes.iter().filter(|o| o.applied()).count(),
            outcomes,
        }
    }

    pub fn applied_ids(&self) -> impl Iterator<Item = &str> {
        self.outcomes
            .iter()
            .filter(|o| o.applied())
            .map(|o| o.circuit_id.as_str())
    }

    pub fn skipped(&self) -> usize {
        self.requested - self.applied
    }
}
