use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::boat::BoatStatus;

/// A raw GPS fix projected onto the route. Produced and consumed within a
/// single update, never stored on its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MappedPosition {
    pub latitude: f64,
    pub longitude: f64,
    pub distance_along_route_meters: f64,
    pub progress_percent: f64,
    pub heading_degrees: f64,
    pub distance_off_route_meters: f64,
    pub nearest_segment_index: usize,
    pub source_timestamp: DateTime<Utc>,
}

/// Snapshot kept in the per boat history ring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PositionHistoryEntry {
    pub timestamp: DateTime<Utc>,
    pub latitude: f64,
    pub longitude: f64,
    pub distance_along_route_meters: f64,
    pub progress_percent: f64,
    pub speed_kmh: f64,
    pub status: BoatStatus,
}
