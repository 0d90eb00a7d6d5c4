use chrono::{DateTime, Utc};
use model::position::MappedPosition;
use utility::{geo, serde::timestamp};

use crate::route::Route;

/// Fixes farther than this from every waypoint are rejected.
pub const DEFAULT_MAPPING_TOLERANCE_METERS: f64 = 100.0;

/// Invalid input at the mapping boundary. Fixes that are merely far from the
/// route are not errors, see [`MappingResult::Rejected`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MappingError {
    #[error("latitude {0} is outside of [-90, 90]")]
    InvalidLatitude(f64),
    #[error("longitude {0} is outside of [-180, 180]")]
    InvalidLongitude(f64),
    #[error("'{0}' is not a valid timestamp")]
    InvalidTimestamp(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Rejection {
    pub nearest_point_index: usize,
    pub distance_to_route_meters: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MappingResult {
    Mapped(MappedPosition),
    Rejected(Rejection),
}

impl MappingResult {
    pub fn mapped(self) -> Option<MappedPosition> {
        match self {
            MappingResult::Mapped(position) => Some(position),
            MappingResult::Rejected(_) => None,
        }
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, MappingResult::Rejected(_))
    }
}

/// Projects raw GPS fixes onto a fixed route. Holds no mutable state.
#[derive(Debug, Clone)]
pub struct RouteMapper {
    route: Route,
    tolerance_meters: f64,
}

impl RouteMapper {
    pub fn new(route: Route) -> Self {
        Self::with_tolerance(route, DEFAULT_MAPPING_TOLERANCE_METERS)
    }

    pub fn with_tolerance(route: Route, tolerance_meters: f64) -> Self {
        Self {
            route,
            tolerance_meters,
        }
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    /// Like [`RouteMapper::map_to_route`], but parses the timestamp as sent
    /// by the trackers first.
    pub fn map_fix(
        &self,
        latitude: f64,
        longitude: f64,
        timestamp: &str,
    ) -> Result<MappingResult, MappingError> {
        let timestamp = timestamp::parse_instant(timestamp)
            .ok_or_else(|| MappingError::InvalidTimestamp(timestamp.to_owned()))?;
        self.map_to_route(latitude, longitude, timestamp)
    }

    pub fn map_to_route(
        &self,
        latitude: f64,
        longitude: f64,
        timestamp: DateTime<Utc>,
    ) -> Result<MappingResult, MappingError> {
        if !geo::is_valid_latitude(latitude) {
            return Err(MappingError::InvalidLatitude(latitude));
        }
        if !geo::is_valid_longitude(longitude) {
            return Err(MappingError::InvalidLongitude(longitude));
        }

        let points = self.route.points();
        let (nearest, min_distance) = points
            .iter()
            .enumerate()
            .map(|(index, point)| {
                let distance =
                    geo::haversine_distance(latitude, longitude, point.latitude, point.longitude);
                (index, distance)
            })
            .fold((0, f64::INFINITY), |best, candidate| {
                if candidate.1 < best.1 {
                    candidate
                } else {
                    best
                }
            });

        if min_distance > self.tolerance_meters {
            log::warn!(
                "rejected fix ({}, {}): {:.0} m from the route, nearest waypoint {}",
                latitude,
                longitude,
                min_distance,
                nearest
            );
            return Ok(MappingResult::Rejected(Rejection {
                nearest_point_index: nearest,
                distance_to_route_meters: min_distance,
            }));
        }

        let last = points.len() - 1;
        let current = &points[nearest];
        // no interpolation at the endpoints, so nothing is extrapolated past the route
        let distance_along_route_meters = if nearest == 0 || nearest == last {
            current.cumulative_distance_meters
        } else {
            let next = &points[nearest + 1];
            let segment_length = geo::haversine_distance(
                current.latitude,
                current.longitude,
                next.latitude,
                next.longitude,
            );
            let distance_to_next =
                geo::haversine_distance(latitude, longitude, next.latitude, next.longitude);
            let fraction = if segment_length > 0.0 {
                (1.0 - distance_to_next / segment_length).clamp(0.0, 1.0)
            } else {
                0.0
            };
            current.cumulative_distance_meters
                + fraction * (next.cumulative_distance_meters - current.cumulative_distance_meters)
        };

        let total = self.route.total_distance();
        let progress_percent = (100.0 * distance_along_route_meters / total).clamp(0.0, 100.0);

        let heading_degrees = if nearest == last {
            0.0
        } else {
            let next = &points[nearest + 1];
            geo::initial_bearing(latitude, longitude, next.latitude, next.longitude)
        };

        Ok(MappingResult::Mapped(MappedPosition {
            latitude,
            longitude,
            distance_along_route_meters,
            progress_percent,
            heading_degrees,
            distance_off_route_meters: min_distance.round(),
            nearest_segment_index: nearest.min(last - 1),
            source_timestamp: timestamp,
        }))
    }
}
