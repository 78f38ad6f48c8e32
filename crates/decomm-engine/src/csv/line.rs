/// One parsed CSV record and the line it starts on (1-based).
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Record {
    pub line: usize,
    pub fields: Vec<String>,
}

impl Record {
    /// An empty or whitespace-only line.
    pub fn is_blank(&self) -> bool {
        matches!(self.fields.as_slice(), [only] if only.trim().is_empty())
    }
}

/// Split CSV text into records. Quoted fields may contain commas, doubled
/// quotes and line breaks; outside quotes `\n` or `\r\n` ends a record.
pub(crate) fn split_records(text: &str) -> Vec<Record> {
    let mut records = Vec::new();
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut line = 1;
    let mut start = 1;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
            '\r' if !in_quotes && chars.peek() == Some(&'\n') => {}
            '\n' if !in_quotes => {
                fields.push(std::mem::take(&mut current));
                records.push(Record {
                    line: start,
                    fields: std::mem::take(&mut fields),
                });
                line += 1;
                start = line;
            }
            '\n' => {
                current.push(ch);
                line += 1;
            }
            _ => current.push(ch),
        }
    }
    if !current.is_empty() || !fields.is_empty() {
        fields.push(current);
        records.push(Record {
            line: start,
            fields,
        });
    }
    records
}

/// Quote a field, doubling embedded quotes.
pub(crate) fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}
