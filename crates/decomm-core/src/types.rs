#![allow(clippy::doc_markdown)]

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Comparison operator of a primitive condition.
///
/// Strings outside the six comparisons are kept verbatim in `Other` so that
/// stored rules round-trip unchanged. They never match.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Operator {
    Lt,
    Lte,
    Gt,
    Gte,
    Eq,
    Neq,
    Other(String),
}

impl Operator {
    /// The six comparisons, in the order rule forms list them.
    pub fn comparisons() -> [Operator; 6] {
        [
            Operator::Lt,
            Operator::Lte,
            Operator::Gt,
            Operator::Gte,
            Operator::Eq,
            Operator::Neq,
        ]
    }

    pub fn as_str(&self) -> &str {
        match self {
            Operator::Lt => "<",
            Operator::Lte => "<=",
            Operator::Gt => ">",
            Operator::Gte => ">=",
            Operator::Eq => "==",
            Operator::Neq => "!=",
            Operator::Other(s) => s,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Operator::Other(_))
    }

    pub fn is_equality(&self) -> bool {
        matches!(self, Operator::Eq | Operator::Neq)
    }

    /// Human label used by rule listings.
    pub fn label(&self) -> &str {
        match self {
            Operator::Lt => "Less than",
            Operator::Lte => "Less than or equal",
            Operator::Gt => "Greater than",
            Operator::Gte => "Greater than or equal",
            Operator::Eq => "Equal to",
            Operator::Neq => "Not equal to",
            Operator::Other(s) => s,
        }
    }

    pub fn from_wire(s: &str) -> Self {
        match s {
            "<" => Operator::Lt,
            "<=" => Operator::Lte,
            ">" => Operator::Gt,
            ">=" => Operator::Gte,
            "==" => Operator::Eq,
            "!=" => Operator::Neq,
            other => Operator::Other(other.to_string()),
        }
    }
}

impl FromStr for Operator {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Operator::from_wire(s))
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Operator {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Operator {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Operator::from_wire(&s))
    }
}

/// How the conditions of a compound rule combine.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Logic {
    And,
    Or,
    Other(String),
}

impl Logic {
    pub fn as_str(&self) -> &str {
        match self {
            Logic::And => "AND",
            Logic::Or => "OR",
            Logic::Other(s) => s,
        }
    }

    pub fn from_wire(s: &str) -> Self {
        match s {
            "AND" => Logic::And,
            "OR" => Logic::Or,
            other => Logic::Other(other.to_string()),
        }
    }
}

impl FromStr for Logic {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Logic::from_wire(s))
    }
}

impl fmt::Display for Logic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Logic {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Logic {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Logic::from_wire(&s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleType {
    #[default]
    Include,
    Exclude,
}

impl RuleType {
    pub fn as_str(self) -> &'static str {
        match self {
            RuleType::Include => "include",
            RuleType::Exclude => "exclude",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RuleType::Include => "Include for Decommission",
            RuleType::Exclude => "Exclude from Decommission",
        }
    }
}

impl fmt::Display for RuleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Human review state of a circuit. Independent of the derived `flagged` bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CircuitStatus {
    #[default]
    Active,
    Approved,
    Rejected,
}

impl CircuitStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            CircuitStatus::Active => "active",
            CircuitStatus::Approved => "approved",
            CircuitStatus::Rejected => "rejected",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(CircuitStatus::Active),
            "approved" => Some(CircuitStatus::Approved),
            "rejected" => Some(CircuitStatus::Rejected),
            _ => None,
        }
    }
}

impl fmt::Display for CircuitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecommissionStatus {
    InProcess,
}

macro_rules! categorical {
    (
        $(#[$meta:meta])*
        $name:ident default $default:ident {
            $($variant:ident => $text:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $text)] $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }

            pub fn parse(s: &str) -> Option<Self> {
                match s {
                    $($text => Some($name::$variant),)+
                    _ => None,
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                $name::$default
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

categorical! {
    ContractStatus default Active {
        Active => "active",
        Expired => "expired",
        ExpiringSoon => "expiring_soon",
    }
}

categorical! {
    ServiceType default Modern {
        Legacy => "legacy",
        Modern => "modern",
    }
}

categorical! {
    Redundancy default No {
        Yes => "yes",
        No => "no",
    }
}

categorical! {
    SiteStatus default Active {
        Active => "active",
        Closed => "closed",
        Relocated => "relocated",
        Consolidated => "consolidated",
    }
}

categorical! {
    /// Hardware end-of-life / end-of-support.
    HardwareEol default No {
        Yes => "yes",
        No => "no",
    }
}

categorical! {
    ProviderStatus default Current {
        Current => "current",
        Migrated => "migrated",
        PendingMigration => "pending_migration",
    }
}

/// Rule threshold: a number for numeric fields, a string for categorical ones.
///
/// Serialized as a bare JSON number or string. Whole numbers serialize without
/// a fractional part so documents stay readable.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Number(f64),
    Text(String),
}

impl Scalar {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Scalar::Number(n) => Some(*n),
            Scalar::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Scalar::Number(_) => None,
            Scalar::Text(s) => Some(s),
        }
    }
}

impl From<f64> for Scalar {
    fn from(n: f64) -> Self {
        Scalar::Number(n)
    }
}

impl From<i32> for Scalar {
    fn from(n: i32) -> Self {
        Scalar::Number(f64::from(n))
    }
}

impl From<i64> for Scalar {
    fn from(n: i64) -> Self {
        Scalar::Number(n as f64)
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::Text(s.to_string())
    }
}

impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Scalar::Text(s)
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Number(n) => f.write_str(&format_number(*n)),
            Scalar::Text(s) => f.write_str(s),
        }
    }
}

impl Serialize for Scalar {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Scalar::Number(n) if is_whole(*n) => serializer.serialize_i64(*n as i64),
            Scalar::Number(n) => serializer.serialize_f64(*n),
            Scalar::Text(s) => serializer.serialize_str(s),
        }
    }
}

fn is_whole(n: f64) -> bool {
    n.is_finite() && n.fract() == 0.0 && n.abs() < 9.0e15
}

/// Render a number without a trailing `.0` for whole values.
pub fn format_number(n: f64) -> String {
    if is_whole(n) {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operator_roundtrip_keeps_unknown() {
        let op: Operator = serde_json::from_str("\"excludes\"").unwrap();
        assert_eq!(op, Operator::Other("excludes".into()));
        assert!(!op.is_known());
        assert_eq!(serde_json::to_string(&op).unwrap(), "\"excludes\"");

        let lte: Operator = serde_json::from_str("\"<=\"").unwrap();
        assert_eq!(lte, Operator::Lte);
    }

    #[test]
    fn logic_is_case_sensitive() {
        let and: Logic = serde_json::from_str("\"AND\"").unwrap();
        assert_eq!(and, Logic::And);
        let lower: Logic = serde_json::from_str("\"and\"").unwrap();
        assert_eq!(lower, Logic::Other("and".into()));
    }

    #[test]
    fn scalar_whole_numbers_serialize_as_integers() {
        assert_eq!(serde_json::to_string(&Scalar::Number(20.0)).unwrap(), "20");
        assert_eq!(serde_json::to_string(&Scalar::Number(15.5)).unwrap(), "15.5");
        let parsed: Scalar = serde_json::from_str("\"closed\"").unwrap();
        assert_eq!(parsed, Scalar::Text("closed".into()));
        let parsed: Scalar = serde_json::from_str("48").unwrap();
        assert_eq!(parsed, Scalar::Number(48.0));
    }

    #[test]
    fn categorical_defaults_match_import_defaults() {
        assert_eq!(ContractStatus::default(), ContractStatus::Active);
        assert_eq!(ServiceType::default(), ServiceType::Modern);
        assert_eq!(Redundancy::default(), Redundancy::No);
        assert_eq!(SiteStatus::default(), SiteStatus::Active);
        assert_eq!(HardwareEol::default(), HardwareEol::No);
        assert_eq!(ProviderStatus::default(), ProviderStatus::Current);
    }

    #[test]
    fn categorical_serde_uses_wire_names() {
        let json = serde_json::to_string(&ProviderStatus::PendingMigration).unwrap();
        assert_eq!(json, "\"pending_migration\"");
        assert_eq!(
            ContractStatus::parse("expiring_soon"),
            Some(ContractStatus::ExpiringSoon)
        );
        assert_eq!(SiteStatus::parse("demolished"), None);
    }

    #[test]
    fn rule_type_defaults_to_include() {
        assert_eq!(RuleType::default(), RuleType::Include);
        let json = serde_json::to_string(&RuleType::Exclude).unwrap();
        assert_eq!(json, "\"exclude\"");
    }
}
