use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{
    CircuitStatus, ContractStatus, DecommissionStatus, HardwareEol, ProviderStatus, Redundancy,
    ServiceType, SiteStatus,
};

/// Decision label recorded with an approval comment.
pub const DECISION_APPROVED: &str = "Approved for Decommission";
/// Decision label recorded with a rejection comment.
pub const DECISION_KEEP_ACTIVE: &str = "Keep Active";

/// A telecom circuit under review for possible decommission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Circuit {
    pub id: String,
    pub location: String,

    /// Mbps.
    #[serde(deserialize_with = "lenient::whole")]
    pub bandwidth: u32,
    /// Percent, 0-100.
    #[serde(deserialize_with = "lenient::number")]
    pub utilization: f64,
    /// Months in service.
    #[serde(deserialize_with = "lenient::whole")]
    pub age: u32,
    /// GB.
    #[serde(deserialize_with = "lenient::number")]
    pub traffic: f64,
    /// Cost per Mbps.
    #[serde(deserialize_with = "lenient::number")]
    pub cost: f64,

    #[serde(default)]
    pub contract_status: ContractStatus,
    #[serde(default)]
    pub service_type: ServiceType,
    #[serde(default)]
    pub redundancy: Redundancy,
    #[serde(default)]
    pub site_status: SiteStatus,
    #[serde(default)]
    pub hardware_eol: HardwareEol,
    #[serde(default)]
    pub provider_status: ProviderStatus,

    #[serde(default)]
    pub status: CircuitStatus,

    #[serde(
        rename = "decommissionStatus",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub decommission_status: Option<DecommissionStatus>,

    #[serde(
        rename = "decommissionDate",
        default,
        deserialize_with = "lenient::optional_stamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub decommission_date: Option<DateTime<Utc>>,

    /// Derived by classification; never ground truth.
    #[serde(default)]
    pub flagged: bool,

    /// Derived by classification: include rule names, then `[EXCLUDED] <name>` tags.
    #[serde(rename = "matchedRules", default)]
    pub matched_rules: Vec<String>,

    #[serde(default)]
    pub comments: Vec<CommentRecord>,

    #[serde(default)]
    pub history: Vec<HistoryEvent>,
}

impl Circuit {
    /// A fresh active circuit with zeroed metrics and default categorical values.
    pub fn new(id: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            location: location.into(),
            bandwidth: 0,
            utilization: 0.0,
            age: 0,
            traffic: 0.0,
            cost: 0.0,
            contract_status: ContractStatus::default(),
            service_type: ServiceType::default(),
            redundancy: Redundancy::default(),
            site_status: SiteStatus::default(),
            hardware_eol: HardwareEol::default(),
            provider_status: ProviderStatus::default(),
            status: CircuitStatus::Active,
            decommission_status: None,
            decommission_date: None,
            flagged: false,
            matched_rules: Vec::new(),
            comments: Vec::new(),
            history: Vec::new(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == CircuitStatus::Active
    }

    pub fn is_in_process(&self) -> bool {
        self.decommission_status == Some(DecommissionStatus::InProcess)
    }

    /// Approved and not yet handed to decommission.
    pub fn is_pending_decommission(&self) -> bool {
        self.status == CircuitStatus::Approved && !self.is_in_process()
    }

    pub fn last_comment(&self) -> Option<&CommentRecord> {
        self.comments.last()
    }
}

/// An engineer's review comment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentRecord {
    pub text: String,
    #[serde(default)]
    pub author: String,
    /// Older documents call this `date` and store a locale-formatted string.
    #[serde(alias = "date", deserialize_with = "lenient::stamp")]
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub decision: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryEventKind {
    Created,
    Imported,
    Approved,
    Rejected,
    DecommissionInitiated,
}

impl HistoryEventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            HistoryEventKind::Created => "created",
            HistoryEventKind::Imported => "imported",
            HistoryEventKind::Approved => "approved",
            HistoryEventKind::Rejected => "rejected",
            HistoryEventKind::DecommissionInitiated => "decommission_initiated",
        }
    }
}

/// One entry of a circuit's append-only audit history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEvent {
    pub event: HistoryEventKind,
    pub timestamp: DateTime<Utc>,
    pub author: String,
    pub description: String,
}

/// Older documents store metrics as numeric strings (`"20"`) and dates as
/// locale strings (`"1/15/2024, 3:45:12 PM"`); coerce them here so the rest of
/// the engine only ever sees numbers and UTC timestamps.
mod lenient {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::de::Error;
    use serde::{Deserialize, Deserializer};

    /// Locale renderings tried after RFC 3339, read as UTC.
    const LOCALE_FORMATS: [&str; 4] = [
        "%m/%d/%Y, %I:%M:%S %p",
        "%d/%m/%Y, %H:%M:%S",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
    ];

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    pub fn number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Ok(n),
            Raw::Text(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| D::Error::custom(format!("expected a number, got {s:?}"))),
        }
    }

    pub fn whole<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
        let n = number(deserializer)?;
        if !n.is_finite() || n < 0.0 || n > f64::from(u32::MAX) {
            return Err(D::Error::custom(format!("{n} is not a non-negative integer")));
        }
        Ok(n.trunc() as u32)
    }

    pub fn parse_stamp(raw: &str) -> Option<DateTime<Utc>> {
        let raw = raw.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Utc));
        }
        LOCALE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
            .map(|naive| naive.and_utc())
    }

    /// An unreadable date loads as the Unix epoch instead of failing the document.
    pub fn stamp<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(parse_stamp(&raw).unwrap_or_else(|| {
            tracing::warn!(date = %raw, "unreadable comment date; using the epoch");
            DateTime::<Utc>::default()
        }))
    }

    pub fn optional_stamp<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        let Some(raw) = Option::<String>::deserialize(deserializer)? else {
            return Ok(None);
        };
        let parsed = parse_stamp(&raw);
        if parsed.is_none() {
            tracing::warn!(date = %raw, "unreadable decommission date; dropped");
        }
        Ok(parsed)
    }
}
