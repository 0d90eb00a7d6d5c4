use chrono::{DateTime, Utc};
use model::boat::BoatId;
use parade::store::PositionRecord;

#[derive(Debug, Clone, PartialEq)]
pub struct PositionRow {
    pub boat_id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub distance_along_route_meters: f64,
    pub progress_percent: f64,
    pub speed_kmh: f64,
    pub heading_degrees: f64,
    pub distance_off_route_meters: f64,
    pub status: String,
    pub recorded_at: DateTime<Utc>,
}

impl PositionRow {
    pub fn from_record(boat_id: &BoatId, record: PositionRecord) -> Self {
        Self {
            boat_id: boat_id.raw(),
            latitude: record.latitude,
            longitude: record.longitude,
            distance_along_route_meters: record.distance_along_route_meters,
            progress_percent: record.progress_percent,
            speed_kmh: record.speed_kmh,
            heading_degrees: record.heading_degrees,
            distance_off_route_meters: record.distance_off_route_meters,
            status: record.status.to_string(),
            recorded_at: record.timestamp,
        }
    }
}
