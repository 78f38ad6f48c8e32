use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::model::Circuit;
use crate::types::{
    ContractStatus, HardwareEol, Operator, ProviderStatus, Redundancy, ServiceType, SiteStatus,
};

/// A circuit attribute that rules can test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Utilization,
    Bandwidth,
    Age,
    Traffic,
    Cost,
    ContractStatus,
    ServiceType,
    Redundancy,
    SiteStatus,
    HardwareEol,
    ProviderStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Numeric,
    Categorical,
}

/// The value a field reads from a circuit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue {
    Number(f64),
    Text(&'static str),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Number(n) => f.write_str(&crate::types::format_number(*n)),
            FieldValue::Text(s) => f.write_str(s),
        }
    }
}

impl Field {
    pub const ALL: [Field; 11] = [
        Field::Utilization,
        Field::Bandwidth,
        Field::Age,
        Field::Traffic,
        Field::Cost,
        Field::ContractStatus,
        Field::ServiceType,
        Field::Redundancy,
        Field::SiteStatus,
        Field::HardwareEol,
        Field::ProviderStatus,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Field::Utilization => "utilization",
            Field::Bandwidth => "bandwidth",
            Field::Age => "age",
            Field::Traffic => "traffic",
            Field::Cost => "cost",
            Field::ContractStatus => "contract_status",
            Field::ServiceType => "service_type",
            Field::Redundancy => "redundancy",
            Field::SiteStatus => "site_status",
            Field::HardwareEol => "hardware_eol",
            Field::ProviderStatus => "provider_status",
        }
    }

    pub fn parse(name: &str) -> Option<Field> {
        Field::ALL.into_iter().find(|f| f.name() == name)
    }

    pub fn kind(self) -> FieldKind {
        match self {
            Field::Utilization | Field::Bandwidth | Field::Age | Field::Traffic | Field::Cost => {
                FieldKind::Numeric
            }
            _ => FieldKind::Categorical,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Field::Utilization => "Utilization %",
            Field::Bandwidth => "Bandwidth (Mbps)",
            Field::Age => "Age (months)",
            Field::Traffic => "Traffic Volume (GB)",
            Field::Cost => "Cost per Mbps ($)",
            Field::ContractStatus => "Contract Status",
            Field::ServiceType => "Service Type",
            Field::Redundancy => "Redundancy Status",
            Field::SiteStatus => "Site Status",
            Field::HardwareEol => "Hardware EOL/EOS",
            Field::ProviderStatus => "Provider Status",
        }
    }

    /// Operators a rule may use with this field.
    pub fn allowed_operators(self) -> Vec<Operator> {
        match self.kind() {
            FieldKind::Numeric => Operator::comparisons().to_vec(),
            FieldKind::Categorical => vec![Operator::Eq, Operator::Neq],
        }
    }

    /// Valid values of a categorical field; empty for numeric fields.
    pub fn options(self) -> Vec<&'static str> {
        fn names<T: Copy>(all: &[T], f: fn(T) -> &'static str) -> Vec<&'static str> {
            all.iter().map(|v| f(*v)).collect()
        }
        match self {
            Field::ContractStatus => names(ContractStatus::ALL, ContractStatus::as_str),
            Field::ServiceType => names(ServiceType::ALL, ServiceType::as_str),
            Field::Redundancy => names(Redundancy::ALL, Redundancy::as_str),
            Field::SiteStatus => names(SiteStatus::ALL, SiteStatus::as_str),
            Field::HardwareEol => names(HardwareEol::ALL, HardwareEol::as_str),
            Field::ProviderStatus => names(ProviderStatus::ALL, ProviderStatus::as_str),
            _ => Vec::new(),
        }
    }

    /// Typed accessor: read this field from a circuit.
    pub fn read(self, circuit: &Circuit) -> FieldValue {
        match self {
            Field::Utilization => FieldValue::Number(circuit.utilization),
            Field::Bandwidth => FieldValue::Number(f64::from(circuit.bandwidth)),
            Field::Age => FieldValue::Number(f64::from(circuit.age)),
            Field::Traffic => FieldValue::Number(circuit.traffic),
            Field::Cost => FieldValue::Number(circuit.cost),
            Field::ContractStatus => FieldValue::Text(circuit.contract_status.as_str()),
            Field::ServiceType => FieldValue::Text(circuit.service_type.as_str()),
            Field::Redundancy => FieldValue::Text(circuit.redundancy.as_str()),
            Field::SiteStatus => FieldValue::Text(circuit.site_status.as_str()),
            Field::HardwareEol => FieldValue::Text(circuit.hardware_eol.as_str()),
            Field::ProviderStatus => FieldValue::Text(circuit.provider_status.as_str()),
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A condition's field name, resolved once when the rule is loaded.
///
/// Names that are not circuit attributes (for example the `tags` condition of
/// learned rules) stay `Unknown` and read as undefined.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldRef {
    Known(Field),
    Unknown(String),
}

impl FieldRef {
    pub fn resolve(name: &str) -> Self {
        match Field::parse(name) {
            Some(field) => FieldRef::Known(field),
            None => FieldRef::Unknown(name.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            FieldRef::Known(f) => f.name(),
            FieldRef::Unknown(s) => s,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            FieldRef::Known(f) => f.label(),
            FieldRef::Unknown(s) => s,
        }
    }

    pub fn field(&self) -> Option<Field> {
        match self {
            FieldRef::Known(f) => Some(*f),
            FieldRef::Unknown(_) => None,
        }
    }

    /// `None` when the circuit has no such attribute.
    pub fn read(&self, circuit: &Circuit) -> Option<FieldValue> {
        self.field().map(|f| f.read(circuit))
    }
}

impl From<Field> for FieldRef {
    fn from(field: Field) -> Self {
        FieldRef::Known(field)
    }
}

impl fmt::Display for FieldRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for FieldRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for FieldRef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(FieldRef::resolve(&s))
    }
}
