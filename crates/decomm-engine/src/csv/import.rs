use std::collections::HashSet;

use chrono::Utc;
use serde::Serialize;

use decomm_core::model::{Circuit, HistoryEvent, HistoryEventKind};
use decomm_core::types::{
    ContractStatus, HardwareEol, ProviderStatus, Redundancy, ServiceType, SiteStatus,
};

use super::line::split_records;

/// id, location, bandwidth, utilization, age, traffic, cost
const REQUIRED_FIELDS: usize = 7;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub imported: usize,
    pub duplicates: usize,
    pub malformed: usize,
}

/// Parse CSV text into new circuits.
///
/// The first record is a header. Quoted fields may span lines. Rows with fewer than seven fields are counted
/// as malformed; ids already in `existing` (or earlier in the file) are
/// counted as duplicates. Review state is never imported: every circuit
/// starts active with one `imported` history event.
pub fn import_csv(text: &str, existing: &[Circuit], author: &str) -> (Vec<Circuit>, ImportReport) {
    let mut seen: HashSet<String> = existing.iter().map(|c| c.id.clone()).collect();
    let mut fresh: Vec<Circuit> = Vec::new();
    let mut report = ImportReport::default();
    let now = Utc::now();

    for record in split_records(text).into_iter().skip(1) {
        if record.is_blank() {
            continue;
        }
        let fields: Vec<String> = record.fields.iter().map(|f| f.trim().to_string()).collect();
        if fields.len() < REQUIRED_FIELDS || fields[0].is_empty() {
            tracing::warn!(line = record.line, fields = fields.len(), "skipping malformed CSV row");
            report.malformed += 1;
            continue;
        }
        if !seen.insert(fields[0].clone()) {
            report.duplicates += 1;
            continue;
        }

        let mut c = Circuit::new(fields[0].as_str(), fields[1].as_str());
        c.bandwidth = parse_whole(&fields[2]);
        c.utilization = parse_decimal(&fields[3]);
        c.age = parse_whole(&fields[4]);
        c.traffic = parse_decimal(&fields[5]);
        c.cost = parse_decimal(&fields[6]);

        let col = |i: usize| fields.get(i).map(String::as_str).unwrap_or("");
        c.contract_status = ContractStatus::parse(col(7)).unwrap_or_default();
        c.service_type = ServiceType::parse(col(8)).unwrap_or_default();
        c.redundancy = Redundancy::parse(col(9)).unwrap_or_default();
        c.site_status = SiteStatus::parse(col(10)).unwrap_or_default();
        c.hardware_eol = HardwareEol::parse(col(11)).unwrap_or_default();
        c.provider_status = ProviderStatus::parse(col(12)).unwrap_or_default();

        c.history.push(HistoryEvent {
            event: HistoryEventKind::Imported,
            timestamp: now,
            author: author.to_string(),
            description: "Imported from CSV".to_string(),
        });
        fresh.push(c);
        report.imported += 1;
    }

    tracing::info!(
        imported = report.imported,
        duplicates = report.duplicates,
        malformed = report.malformed,
        "CSV import parsed"
    );
    (fresh, report)
}

/// Longest leading decimal number (`"12.5 Mbps"` -> 12.5); 0 when there is none.
fn parse_decimal(s: &str) -> f64 {
    let bytes = s.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }
    let mut seen_dot = false;
    let mut seen_digit = false;
    while end < bytes.len() {
        match bytes[end] {
            b'0'..=b'9' => seen_digit = true,
            b'.' if !seen_dot => seen_dot = true,
            _ => break,
        }
        end += 1;
    }
    if !seen_digit {
        return 0.0;
    }
    let n = s[..end].parse::<f64>().unwrap_or(0.0);
    if n.is_finite() {
        n
    } else {
        0.0
    }
}

/// Integer part of the leading number (`"12.9"` -> 12); negatives clamp to 0.
fn parse_whole(s: &str) -> u32 {
    let n = parse_decimal(s).trunc();
    if n <= 0.0 {
        0
    } else if n >= f64::from(u32::MAX) {
        u32::MAX
    } else {
        n as u32
    }
}
