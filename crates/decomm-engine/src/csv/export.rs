use decomm_core::model::Circuit;
use decomm_core::types::format_number;

use super::line::quote;

pub const HEADER: [&str; 16] = [
    "Circuit ID",
    "Location",
    "Bandwidth",
    "Utilization",
    "Age",
    "Traffic",
    "Cost",
    "Contract Status",
    "Service Type",
    "Redundancy",
    "Site Status",
    "Hardware EOL",
    "Provider Status",
    "Status",
    "Flagged",
    "Comments",
];

/// Render circuits as CSV. Every field is quoted; each line ends with `\n`.
pub fn export_csv(circuits: &[Circuit]) -> String {
    let mut out = String::new();
    push_row(&mut out, HEADER.iter().map(|h| h.to_string()));
    for c in circuits {
        let comments = c
            .comments
            .iter()
            .map(|cm| format!("{}: {}", cm.decision, cm.text))
            .collect::<Vec<_>>()
            .join("; ");
        push_row(
            &mut out,
            [
                c.id.clone(),
                c.location.clone(),
                c.bandwidth.to_string(),
                format_number(c.utilization),
                c.age.to_string(),
                format_number(c.traffic),
                format_number(c.cost),
                c.contract_status.to_string(),
                c.service_type.to_string(),
                c.redundancy.to_string(),
                c.site_status.to_string(),
                c.hardware_eol.to_string(),
                c.provider_status.to_string(),
                c.status.to_string(),
                if c.flagged { "Yes" } else { "No" }.to_string(),
                comments,
            ],
        );
    }
    out
}

fn push_row(out: &mut String, fields: impl IntoIterator<Item = String>) {
    let row: Vec<String> = fields.into_iter().map(|f| quote(&f)).collect();
    out.push_str(&row.join(","));
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use decomm_core::model::CommentRecord;

    #[test]
    fn header_and_row_shape() {
        let mut c = Circuit::new("CKT-2024-001", "Seattle - \"SoDo\"");
        c.bandwidth = 500;
        c.utilization = 12.5;
        c.flagged = true;
        c.comments.push(CommentRecord {
            text: "idle".into(),
            author: "Network Engineer".into(),
            timestamp: Utc::now(),
            decision: "Approved for Decommission".into(),
        });
        c.comments.push(CommentRecord {
            text: "really".into(),
            author: "Network Engineer".into(),
            timestamp: Utc::now(),
            decision: "Keep Active".into(),
        });

        let csv = export_csv(&[c]);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("\"Circuit ID\",\"Location\""));
        assert!(lines[0].ends_with("\"Flagged\",\"Comments\""));
        assert!(lines[1].contains("\"Seattle - \"\"SoDo\"\"\""));
        assert!(lines[1].contains(",\"12.5\","));
        assert!(lines[1].ends_with(
            "\"active\",\"Yes\",\"Approved for Decommission: idle; Keep Active: really\""
        ));
        assert!(csv.ends_with('\n'));
    }

    #[test]
    fn empty_export_is_header_only() {
        assert_eq!(export_csv(&[]).lines().count(), 1);
    }
}
