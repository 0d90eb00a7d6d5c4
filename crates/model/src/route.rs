use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A fixed waypoint of the parade route.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoutePoint {
    pub latitude: f64,
    pub longitude: f64,
    /// Distance along the route from the start to this waypoint.
    pub cumulative_distance_meters: f64,
}

impl RoutePoint {
    pub const fn new(latitude: f64, longitude: f64, cumulative_distance_meters: f64) -> Self {
        Self {
            latitude,
            longitude,
            cumulative_distance_meters,
        }
    }
}
