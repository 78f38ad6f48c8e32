/// A policy rejection surfaced to the user. The operation that returned it
/// changed nothing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("a comment is required before approving")]
    ApprovalCommentRequired,
    #[error("a comment explaining why the circuit should remain active is required")]
    RejectionCommentRequired,
    #[error("add at least one rule before running analysis")]
    NoRules,
    #[error("select at least one circuit")]
    NoCircuitsSelected,
    #[error("no rejection feedback available; review and reject some circuits first")]
    NoFeedback,
    #[error("invalid rule: {0}")]
    InvalidRule(String),
    #[error("rule not found: {0}")]
    UnknownRule(String),
    #[error("no suggestion for pattern: {0}")]
    UnknownPattern(String),
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("cannot read {key}: {source}")]
    Read {
        key: String,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot write {key}: {source}")]
    Write {
        key: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{key}: invalid document: {source}")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("{key}: cannot encode document: {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("{key}: {message}")]
    Migration { key: String, message: String },
}

/// Failure to parse a condition expression such as `utilization < 20`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuleParseError {
    #[error("no comparison operator in {0:?} (expected one of <, <=, >, >=, ==, !=)")]
    MissingOperator(String),
    #[error("unknown field: {0}")]
    UnknownField(String),
    #[error("missing value in {0:?}")]
    MissingValue(String),
    #[error("{field} expects a number, got {value:?}")]
    InvalidNumber { field: String, value: String },
}

/// Structured result of `decomm rules check --json`.
#[derive(Debug, Clone, serde::Serialize)]
pub struct CheckReport {
    pub source: String,
    pub rules: usize,
    pub pass: bool,
    pub errors: Vec<CheckIssue>,
    pub warnings: Vec<CheckIssue>,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct CheckIssue {
    pub code: String,
    pub check: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

/// Failure of a store-level operation: a policy rejection or a persistence error.
#[derive(Debug, thiserror::Error)]
pub enum DecommError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Store(#[from] StoreError),
}
