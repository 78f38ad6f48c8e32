use crate::errors::StoreError;

/// Key holding the rules document.
pub const RULES_KEY: &str = "telecom_rules";
/// Key holding the circuits document.
pub const CIRCUITS_KEY: &str = "telecom_circuits";
/// Key holding recent user-facing notifications.
pub const NOTIFICATIONS_KEY: &str = "telecom_notifications";

/// Get/set persistence for JSON documents.
pub trait KeyValueStore {
    /// Returns `None` when nothing has been saved under `key`.
    fn load(&self, key: &str) -> Result<Option<serde_json::Value>, StoreError>;
    fn save(&mut self, key: &str, value: &serde_json::Value) -> Result<(), StoreError>;
}

/// Receives progress of a staged workflow (analysis, learning, decommission).
pub trait ProgressSink {
    fn stage_started(&mut self, index: usize, total: usize, label: &str);
    fn stage_completed(&mut self, index: usize, total: usize, detail: &str);
}
