use chrono::{DateTime, Utc};
use model::boat::BoatId;
use parade::store::IncidentRecord;

#[derive(Debug, Clone, PartialEq)]
pub struct IncidentRow {
    pub boat_id: String,
    pub incident_type: String,
    pub severity: String,
    pub message: String,
    pub status: String,
    pub occurred_at: DateTime<Utc>,
}

impl IncidentRow {
    pub fn from_record(boat_id: &BoatId, record: IncidentRecord) -> Self {
        Self {
            boat_id: boat_id.raw(),
            incident_type: record.incident.incident_type.as_str().to_owned(),
            severity: record.incident.severity.as_str().to_owned(),
            message: record.incident.message,
            status: record.status.to_string(),
            occurred_at: record.incident.timestamp,
        }
    }
}
