use crate::model::{Circuit, Rule};

/// Summary row for a single rule.
pub struct RuleRow {
    pub id: String,
    pub name: String,
    pub kind: String,
    pub condition: String,
    pub learned: bool,
}

impl From<&Rule> for RuleRow {
    fn from(rule: &Rule) -> Self {
        Self {
            id: rule.id.clone(),
            name: rule.name.clone(),
            kind: rule.effective_type().as_str().to_string(),
            condition: rule.condition_summary(),
            learned: rule.ai_generated,
        }
    }
}

/// Summary row for a single circuit.
pub struct CircuitRow {
    pub id: String,
    pub location: String,
    pub utilization: String,
    pub age: u32,
    pub status: String,
    pub flagged: bool,
    pub matched: usize,
}

impl From<&Circuit> for CircuitRow {
    fn from(c: &Circuit) -> Self {
        let status = if c.is_in_process() {
            "in_process".to_string()
        } else {
            c.status.as_str().to_string()
        };
        Self {
            id: c.id.clone(),
            location: c.location.clone(),
            utilization: format!("{}%", crate::types::format_number(c.utilization)),
            age: c.age,
            status,
            flagged: c.flagged,
            matched: c.matched_rules.len(),
        }
    }
}

fn width<T>(rows: &[T], header: &str, f: impl Fn(&T) -> usize) -> usize {
    rows.iter().map(f).max().unwrap_or(0).max(header.len())
}

/// Render rules as an aligned table.
pub fn rule_table(rows: &[RuleRow]) -> String {
    if rows.is_empty() {
        return "(no rules defined)\n".to_string();
    }
    let w_id = width(rows, "ID", |r| r.id.len());
    let w_name = width(rows, "NAME", |r| r.name.chars().count());
    let w_type = width(rows, "TYPE", |r| r.kind.len());

    let mut out = format!("{:<w_id$}  {:<w_name$}  {:<w_type$}  CONDITION\n", "ID", "NAME", "TYPE");
    out.push_str(&format!(
        "{}  {}  {}  ---------\n",
        "-".repeat(w_id),
        "-".repeat(w_name),
        "-".repeat(w_type)
    ));
    for r in rows {
        let marker = if r.learned { "  [learned]" } else { "" };
        out.push_str(&format!(
            "{:<w_id$}  {:<w_name$}  {:<w_type$}  {}{marker}\n",
            r.id, r.name, r.kind, r.condition
        ));
    }
    out
}

/// Render circuits as an aligned table.
pub fn circuit_table(rows: &[CircuitRow]) -> String {
    if rows.is_empty() {
        return "(no circuits)\n".to_string();
    }
    let w_id = width(rows, "ID", |r| r.id.len());
    let w_loc = width(rows, "LOCATION", |r| r.location.chars().count());
    let w_status = width(rows, "STATUS", |r| r.status.len());

    let mut out = format!(
        "{:<w_id$}  {:<w_loc$}  {:>5}  {:>4}  {:<w_status$}  FLAG  RULES\n",
        "ID", "LOCATION", "UTIL", "AGE", "STATUS"
    );
    out.push_str(&format!(
        "{}  {}  -----  ----  {}  ----  -----\n",
        "-".repeat(w_id),
        "-".repeat(w_loc),
        "-".repeat(w_status)
    ));
    for r in rows {
        let flag = if r.flagged { "yes" } else { "-" };
        out.push_str(&format!(
            "{:<w_id$}  {:<w_loc$}  {:>5}  {:>4}  {:<w_status$}  {:<4}  {}\n",
            r.id, r.location, r.utilization, r.age, r.status, flag, r.matched
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CircuitStatus;

    #[test]
    fn rule_table_marks_learned_rules() {
        let mut rules = crate::templates::default_rules();
        rules[1].ai_generated = true;
        let rows: Vec<RuleRow> = rules.iter().map(RuleRow::from).collect();
        let table = rule_table(&rows);
        assert!(table.starts_with("ID"));
        assert_eq!(table.lines().count(), 7);
        assert!(table.lines().nth(3).unwrap().ends_with("[learned]"));
    }

    #[test]
    fn circuit_row_reports_in_process() {
        let mut c = Circuit::new("CKT-2024-001", "Boise - Downtown");
        c.status = CircuitStatus::Approved;
        c.decommission_status = Some(crate::types::DecommissionStatus::InProcess);
        c.utilization = 12.5;
        let row = CircuitRow::from(&c);
        assert_eq!(row.status, "in_process");
        assert_eq!(row.utilization, "12.5%");
    }

    #[test]
    fn empty_tables_say_so() {
        assert_eq!(rule_table(&[]), "(no rules defined)\n");
        assert_eq!(circuit_table(&[]), "(no circuits)\n");
    }
}
