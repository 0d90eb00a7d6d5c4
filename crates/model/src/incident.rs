use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::boat::BoatId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum IncidentType {
    Stopped,
    Reverse,
    Speeding,
    CorridorViolation,
    ManualEmergency,
}

impl IncidentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            IncidentType::Stopped => "stopped",
            IncidentType::Reverse => "reverse",
            IncidentType::Speeding => "speeding",
            IncidentType::CorridorViolation => "corridor-violation",
            IncidentType::ManualEmergency => "manual-emergency",
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Critical => "critical",
        }
    }
}

/// Something noteworthy that happened to a boat. Never changed once recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Incident {
    #[serde(rename = "type")]
    pub incident_type: IncidentType,
    pub severity: Severity,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl Incident {
    pub fn new(
        incident_type: IncidentType,
        severity: Severity,
        message: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            incident_type,
            severity,
            message: message.into(),
            timestamp,
        }
    }

    pub fn is_critical(&self) -> bool {
        self.severity == Severity::Critical
    }
}

/// Incidents a boat's current motion suggests. Detection only; nothing is
/// recorded on the boat until an incident is triggered explicitly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct IncidentCheckResult {
    pub boat_id: BoatId,
    pub speed_kmh: f64,
    pub candidates: Vec<Incident>,
}

impl IncidentCheckResult {
    pub fn has_incidents(&self) -> bool {
        !self.candidates.is_empty()
    }

    pub fn contains(&self, incident_type: IncidentType) -> bool {
        self.candidates
            .iter()
            .any(|incident| incident.incident_type == incident_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_incident_wire_format() {
        let incident = Incident::new(
            IncidentType::CorridorViolation,
            Severity::Warning,
            "left the corridor",
            DateTime::<Utc>::default(),
        );
        let json = serde_json::to_value(&incident).unwrap();
        assert_eq!(json["type"], "corridor-violation");
        assert_eq!(json["severity"], "warning");
        assert_eq!(json["message"], "left the corridor");
        assert_eq!(json["type"], IncidentType::CorridorViolation.as_str());
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Critical > Severity::Warning);
        assert!(Severity::Warning > Severity::Info);
    }
}
