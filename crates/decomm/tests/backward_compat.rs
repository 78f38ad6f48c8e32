//! Backward compatibility: data directories written by older releases MUST
//! load unchanged.

use std::path::Path;
use std::process::Command;

use serde_json::Value;

const LEGACY_RULES: &str = r#"[
  {"id": 1700000000001, "name": "Low Utilization - Under 20%", "condition": "utilization", "operator": "<", "value": 20},
  {"id": 1700000000002, "name": "Closed Site", "type": "exclude", "condition": "site_status", "operator": "==", "value": "closed"}
]"#;

const LEGACY_CIRCUITS: &str = r#"[
  {"id": "CKT-2024-001", "location": "Reno - Downtown", "bandwidth": "100", "utilization": "12",
   "age": "30", "traffic": 40, "cost": "7.5", "status": "active", "flagged": false, "matchedRules": []},
  {"id": "CKT-2024-002", "location": "Boise - Downtown", "bandwidth": 500, "utilization": 9,
   "age": 50, "traffic": 80, "cost": 6, "site_status": "closed", "status": "rejected",
   "comments": [{"text": "customer SLA", "author": "Network Engineer",
                 "timestamp": "2024-03-01T10:00:00Z", "decision": "Keep Active"}]}
]"#;

/// Comments and decommission dates as the browser app stored them.
const BROWSER_CIRCUITS: &str = r#"[
  {"id": "CKT-2023-010", "location": "Tulsa - Downtown", "bandwidth": "100", "utilization": "50",
   "age": "60", "traffic": "300", "cost": "4", "status": "rejected", "flagged": true,
   "matchedRules": ["Old Circuit"],
   "comments": [{"date": "1/15/2024, 3:45:12 PM", "decision": "Keep Active",
                 "text": "Feeds the hospital campus"}]},
  {"id": "CKT-2023-011", "location": "Tulsa - Midtown", "bandwidth": 50, "utilization": 3,
   "age": 70, "traffic": 5, "cost": 9, "status": "approved",
   "decommissionStatus": "in_process", "decommissionDate": "2/1/2024, 8:00:00 AM",
   "comments": [{"date": "1/20/2024, 10:00:00 AM", "decision": "Approved for Decommission",
                 "text": "idle"}]}
]"#;

/// A compound rule saved half-written next to a working one.
const BROKEN_RULES: &str = r#"[
  {"id": "r1", "name": "Half written", "type": "include", "logic": "AND",
   "conditions": [{"condition": "age", "operator": ">"}, {"condition": "utilization", "operator": "<", "value": 90}]},
  {"id": "r2", "name": "Old Circuit", "type": "include", "condition": "age", "operator": ">", "value": 48}
]"#;

fn decomm(dir: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_decomm"));
    cmd.current_dir(dir).arg("--data-dir").arg(dir.join("data"));
    cmd
}

fn workspace_with(rules: &str, circuits: &str) -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("data");
    std::fs::create_dir_all(&data).unwrap();
    std::fs::write(data.join("telecom_rules.json"), rules).unwrap();
    std::fs::write(data.join("telecom_circuits.json"), circuits).unwrap();
    dir
}

fn legacy_workspace() -> tempfile::TempDir {
    workspace_with(LEGACY_RULES, LEGACY_CIRCUITS)
}

fn stdout_json(cmd: &mut Command) -> Value {
    let out = cmd.output().expect("failed to run decomm");
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(out.status.success(), "decomm failed: {stderr}");
    serde_json::from_slice(&out.stdout).expect("invalid JSON")
}

#[test]
fn legacy_rules_load_with_string_ids() {
    let dir = legacy_workspace();
    let rules = stdout_json(decomm(dir.path()).args(["rules", "list", "--json"]));
    assert_eq!(rules[0]["id"], "1700000000001");
    assert_eq!(rules[0]["type"], "include");
    assert_eq!(rules[1]["type"], "exclude");
}

#[test]
fn legacy_numeric_strings_classify_as_numbers() {
    let dir = legacy_workspace();
    let v = stdout_json(decomm(dir.path()).args(["classify", "--json"]));
    assert_eq!(v["flagged"], 1);
    assert_eq!(v["excluded"], 1);

    let c = stdout_json(decomm(dir.path()).args(["show", "CKT-2024-001", "--json"]));
    assert_eq!(c["bandwidth"], 100);
    assert_eq!(c["matchedRules"][0], "Low Utilization - Under 20%");
}

#[test]
fn legacy_rejections_feed_learning() {
    let dir = legacy_workspace();
    let v = stdout_json(decomm(dir.path()).args(["learn", "--json"]));
    assert_eq!(v[0]["patternKey"], "customer");
    assert_eq!(v[0]["example"], "customer SLA");
}

#[test]
fn legacy_rules_file_checks_with_warnings() {
    let dir = legacy_workspace();
    let out = decomm(dir.path())
        .args(["rules", "check", "--json"])
        .output()
        .expect("failed to run decomm");
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(out.status.success(), "non-strict check should pass: {stdout}");
    assert!(stdout.contains("\"W007\""), "missing legacy warning in: {stdout}");
}

#[test]
fn browser_comment_dates_load() {
    let dir = workspace_with(LEGACY_RULES, BROWSER_CIRCUITS);
    let c = stdout_json(decomm(dir.path()).args(["show", "CKT-2023-010", "--json"]));
    assert_eq!(c["comments"][0]["timestamp"], "2024-01-15T15:45:12Z");
    assert_eq!(c["comments"][0]["text"], "Feeds the hospital campus");

    let c = stdout_json(decomm(dir.path()).args(["show", "CKT-2023-011", "--json"]));
    assert_eq!(c["decommissionDate"], "2024-02-01T08:00:00Z");
    assert_eq!(c["decommissionStatus"], "in_process");

    let v = stdout_json(decomm(dir.path()).args(["learn", "--json"]));
    assert_eq!(v[0]["patternKey"], "hospital");
}

#[test]
fn half_written_compound_rule_never_matches() {
    let dir = workspace_with(BROKEN_RULES, BROWSER_CIRCUITS);
    let rules = stdout_json(decomm(dir.path()).args(["rules", "list", "--json"]));
    assert_eq!(rules[0]["conditions"][0]["condition"], "age");
    assert!(rules[0]["conditions"][0].get("value").is_none());

    stdout_json(decomm(dir.path()).args(["classify", "--json"]));
    let c = stdout_json(decomm(dir.path()).args(["show", "CKT-2023-010", "--json"]));
    assert_eq!(c["matchedRules"], serde_json::json!(["Old Circuit"]));
}
