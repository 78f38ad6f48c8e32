use chrono::Utc;

use decomm_core::errors::ValidationError;
use decomm_core::model::{
    Circuit, CommentRecord, HistoryEvent, HistoryEventKind, DECISION_APPROVED,
    DECISION_KEEP_ACTIVE,
};
use decomm_core::types::{CircuitStatus, DecommissionStatus};

use super::outcome::{BatchReport, Disposition, ReviewAction, TransitionOutcome};

/// Moves circuits through review: `active -> approved | rejected`, then
/// `approved -> in_process`.
///
/// Every check runs before anything is mutated, so a returned error means
/// nothing changed. Each applied review appends exactly one comment and one
/// history event.
pub struct LifecycleManager {
    author: String,
}

impl LifecycleManager {
    pub fn new(author: impl Into<String>) -> Self {
        Self {
            author: author.into(),
        }
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn approve(
        &self,
        circuits: &mut [Circuit],
        id: &str,
        comment: &str,
    ) -> Result<TransitionOutcome, ValidationError> {
        require_comment(comment, ReviewAction::Approve)?;
        Ok(self.review(circuits, id, comment, ReviewAction::Approve))
    }

    pub fn reject(
        &self,
        circuits: &mut [Circuit],
        id: &str,
        comment: &str,
    ) -> Result<TransitionOutcome, ValidationError> {
        require_comment(comment, ReviewAction::Reject)?;
        Ok(self.review(circuits, id, comment, ReviewAction::Reject))
    }

    /// Approve every listed circuit that is still active; others are skipped.
    pub fn bulk_approve(
        &self,
        circuits: &mut [Circuit],
        ids: &[String],
        comment: &str,
    ) -> Result<BatchReport, ValidationError> {
        self.bulk(circuits, ids, comment, ReviewAction::Approve)
    }

    /// Reject every listed circuit that is still active; others are skipped.
    pub fn bulk_reject(
        &self,
        circuits: &mut [Circuit],
        ids: &[String],
        comment: &str,
    ) -> Result<BatchReport, ValidationError> {
        self.bulk(circuits, ids, comment, ReviewAction::Reject)
    }

    /// Hand approved circuits to decommission. Circuits that are not approved,
    /// or already in process, are left alone.
    pub fn send_for_decommission(
        &self,
        circuits: &mut [Circuit],
        ids: &[String],
    ) -> Result<BatchReport, ValidationError> {
        if ids.is_empty() {
            return Err(ValidationError::NoCircuitsSelected);
        }
        let now = Utc::now();
        let outcomes = ids
            .iter()
            .map(|id| {
                let Some(circuit) = circuits.iter_mut().find(|c| &c.id == id) else {
                    return not_found(id, ReviewAction::Decommission);
                };
                let from = circuit.status;
                let eligible = circuit.is_pending_decommission();
                if eligible {
                    circuit.decommission_status = Some(DecommissionStatus::InProcess);
                    circuit.decommission_date = Some(now);
                    circuit.history.push(HistoryEvent {
                        event: HistoryEventKind::DecommissionInitiated,
                        timestamp: now,
                        author: self.author.clone(),
                        description: "Sent for decommission".to_string(),
                    });
                    tracing::info!(circuit = %circuit.id, "decommission initiated");
                }
                TransitionOutcome {
                    circuit_id: id.clone(),
                    action: ReviewAction::Decommission,
                    disposition: if eligible {
                        Disposition::Applied
                    } else {
                        Disposition::NotEligible
                    },
                    from: Some(from),
                    in_process: Some(circuit.is_in_process()),
                }
            })
            .collect();
        Ok(BatchReport::new(ReviewAction::Decommission, outcomes))
    }

    fn bulk(
        &self,
        circuits: &mut [Circuit],
        ids: &[String],
        comment: &str,
        action: ReviewAction,
    ) -> Result<BatchReport, ValidationError> {
        if ids.is_empty() {
            return Err(ValidationError::NoCircuitsSelected);
        }
        require_comment(comment, action)?;
        let outcomes = ids
            .iter()
            .map(|id| self.review(circuits, id, comment, action))
            .collect();
        Ok(BatchReport::new(action, outcomes))
    }

    fn review(
        &self,
        circuits: &mut [Circuit],
        id: &str,
        comment: &str,
        action: ReviewAction,
    ) -> TransitionOutcome {
        let Some(circuit) = circuits.iter_mut().find(|c| c.id == id) else {
            tracing::debug!(circuit = id, action = action.as_str(), "circuit not found");
            return not_found(id, action);
        };
        let from = circuit.status;
        let not_eligible = TransitionOutcome {
            circuit_id: id.to_string(),
            action,
            disposition: Disposition::NotEligible,
            from: Some(from),
            in_process: Some(circuit.is_in_process()),
        };
        if from != CircuitStatus::Active {
            return not_eligible;
        }

        let (status, decision, event, verb) = match action {
            ReviewAction::Reject => (
                CircuitStatus::Rejected,
                DECISION_KEEP_ACTIVE,
                HistoryEventKind::Rejected,
                "Kept active",
            ),
            ReviewAction::Approve => (
                CircuitStatus::Approved,
                DECISION_APPROVED,
                HistoryEventKind::Approved,
                "Approved for decommission",
            ),
            // Active circuits go through approval first.
            ReviewAction::Decommission => return not_eligible,
        };
        let now = Utc::now();
        circuit.status = status;
        circuit.comments.push(CommentRecord {
            text: comment.to_string(),
            author: self.author.clone(),
            timestamp: now,
            decision: decision.to_string(),
        });
        circuit.history.push(HistoryEvent {
            event,
            timestamp: now,
            author: self.author.clone(),
            description: format!("{verb}: {}", comment.trim()),
        });
        tracing::info!(circuit = %circuit.id, status = status.as_str(), "review recorded");

        TransitionOutcome {
            circuit_id: id.to_string(),
            action,
            disposition: Disposition::Applied,
            from: Some(from),
            in_process: Some(false),
        }
    }
}

fn require_comment(comment: &str, action: ReviewAction) -> Result<(), ValidationError> {
    if !comment.trim().is_empty() {
        return Ok(());
    }
    Err(match action {
        ReviewAction::Reject => ValidationError::RejectionCommentRequired,
        ReviewAction::Approve | ReviewAction::Decommission => {
            ValidationError::ApprovalCommentRequired
        }
    })
}

fn not_found(id: &str, action: ReviewAction) -> TransitionOutcome {
    TransitionOutcome {
        circuit_id: id.to_string(),
        action,
        disposition: Disposition::NotFound,
        from: None,
        in_process: None,
    }
}
