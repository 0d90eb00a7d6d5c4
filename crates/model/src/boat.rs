use std::fmt;

use chrono::{DateTime, TimeZone as _, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use utility::id::{HasId, Id};

use crate::{incident::Incident, ExampleData};

/// Marker for boat identifiers. The actual data of a boat lives in [`BoatState`].
#[derive(Debug, Clone, JsonSchema)]
pub struct Boat;

impl HasId for Boat {
    type IdType = String;
}

pub type BoatId = Id<Boat>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum BoatStatus {
    Waiting,
    Active,
    Finished,
    Emergency,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("a boat can not change from {from} to {to}")]
pub struct IllegalTransition {
    pub from: BoatStatus,
    pub to: BoatStatus,
}

impl BoatStatus {
    /// Whether an explicit status change from `self` to `next` is allowed.
    /// Staying in the same status is always allowed.
    pub fn can_transition_to(self, next: BoatStatus) -> bool {
        use BoatStatus::*;
        match (self, next) {
            (current, next) if current == next => true,
            (_, Emergency) => true,
            (Waiting, Active) => true,
            (Active, Waiting | Finished) => true,
            (Emergency, Active | Finished) => true,
            // correcting a finish that was reported by mistake
            (Finished, Active) => true,
            _ => false,
        }
    }

    pub fn transition_to(self, next: BoatStatus) -> Result<BoatStatus, IllegalTransition> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(IllegalTransition {
                from: self,
                to: next,
            })
        }
    }

    /// The status after a position update reported the given progress.
    /// Emergency and finished are never left through position updates.
    pub fn after_progress(self, progress_percent: f64) -> BoatStatus {
        match self {
            BoatStatus::Emergency | BoatStatus::Finished => self,
            _ if progress_percent >= 100.0 => BoatStatus::Finished,
            _ if progress_percent > 0.0 => BoatStatus::Active,
            _ => self,
        }
    }
}

impl fmt::Display for BoatStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BoatStatus::Waiting => "waiting",
            BoatStatus::Active => "active",
            BoatStatus::Finished => "finished",
            BoatStatus::Emergency => "emergency",
        };
        f.write_str(name)
    }
}

#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct BoatPosition {
    pub latitude: f64,
    pub longitude: f64,
    pub distance_along_route_meters: f64,
    pub progress_percent: f64,
    /// Signed: negative while moving backwards along the route.
    pub speed_kmh: f64,
    pub heading_degrees: f64,
    pub distance_off_route_meters: f64,
    pub last_update_timestamp: Option<DateTime<Utc>>,
}

#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CorridorState {
    pub in_corridor: bool,
    pub last_warning_timestamp: Option<DateTime<Utc>>,
    /// Number of excursions out of the corridor, never reset.
    pub warning_count: u32,
}

impl Default for CorridorState {
    fn default() -> Self {
        Self {
            in_corridor: true,
            last_warning_timestamp: None,
            warning_count: 0,
        }
    }
}

/// Result of a corridor check.
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CorridorStatus {
    pub boat_id: BoatId,
    pub in_corridor: bool,
    pub distance_off_route_meters: f64,
    pub tolerance_meters: f64,
    pub warning_count: u32,
    pub last_warning_timestamp: Option<DateTime<Utc>>,
    /// True if this check saw the boat leave the corridor.
    pub excursion_started: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct BoatState {
    pub id: BoatId,
    pub status: BoatStatus,
    pub position: BoatPosition,
    pub corridor: CorridorState,
    pub incidents: Vec<Incident>,
    pub created_at: DateTime<Utc>,
    pub last_update_at: DateTime<Utc>,
}

impl BoatState {
    pub fn new(id: BoatId, status: BoatStatus, now: DateTime<Utc>) -> Self {
        Self {
            id,
            status,
            position: BoatPosition::default(),
            corridor: CorridorState::default(),
            incidents: vec![],
            created_at: now,
            last_update_at: now,
        }
    }
}

impl ExampleData for BoatState {
    fn example_data() -> Self {
        let timestamp = Utc
            .with_ymd_and_hms(2024, 8, 3, 12, 30, 0)
            .single()
            .unwrap_or_default();
        Self {
            id: Id::from("boat-12"),
            status: BoatStatus::Active,
            position: BoatPosition {
                latitude: 52.3677,
                longitude: 4.8951,
                distance_along_route_meters: 2580.0,
                progress_percent: 61.43,
                speed_kmh: 4.2,
                heading_degrees: 121.0,
                distance_off_route_meters: 0.0,
                last_update_timestamp: Some(timestamp),
            },
            corridor: CorridorState::default(),
            incidents: vec![],
            created_at: timestamp,
            last_update_at: timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_regular_lifecycle() {
        let status = BoatStatus::Waiting;
        let status = status.transition_to(BoatStatus::Active).unwrap();
        let status = status.transition_to(BoatStatus::Finished).unwrap();
        assert_eq!(status, BoatStatus::Finished);
    }

    #[test]
    fn test_emergency_side_transition() {
        assert!(BoatStatus::Active.can_transition_to(BoatStatus::Emergency));
        assert!(BoatStatus::Emergency.can_transition_to(BoatStatus::Active));
        assert!(!BoatStatus::Emergency.can_transition_to(BoatStatus::Waiting));
        assert!(BoatStatus::Finished.can_transition_to(BoatStatus::Emergency));
        assert!(!BoatStatus::Finished.can_transition_to(BoatStatus::Waiting));
        assert_eq!(
            BoatStatus::Waiting.transition_to(BoatStatus::Finished),
            Err(IllegalTransition {
                from: BoatStatus::Waiting,
                to: BoatStatus::Finished
            })
        );
    }

    #[test]
    fn test_progress_drives_status() {
        assert_eq!(BoatStatus::Waiting.after_progress(0.0), BoatStatus::Waiting);
        assert_eq!(BoatStatus::Waiting.after_progress(3.0), BoatStatus::Active);
        assert_eq!(BoatStatus::Active.after_progress(100.0), BoatStatus::Finished);
        assert_eq!(BoatStatus::Finished.after_progress(40.0), BoatStatus::Finished);
    }

    #[test]
    fn test_emergency_is_sticky_under_progress() {
        assert_eq!(BoatStatus::Emergency.after_progress(50.0), BoatStatus::Emergency);
        assert_eq!(BoatStatus::Emergency.after_progress(100.0), BoatStatus::Emergency);
    }

    #[test]
    fn test_status_serializes_lowercase() {
        let json = serde_json::to_string(&BoatStatus::Emergency).unwrap();
        assert_eq!(json, "\"emergency\"");
        assert_eq!(BoatStatus::Finished.to_string(), "finished");
    }
}
