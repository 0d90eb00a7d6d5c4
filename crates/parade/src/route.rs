use std::{fs, path::Path};

use model::route::RoutePoint;
use utility::geo;

#[derive(Debug, thiserror::Error)]
pub enum RouteError {
    #[error("a route needs at least two points, got {0}")]
    TooFewPoints(usize),
    #[error("route point {index} has invalid coordinates ({latitude}, {longitude})")]
    InvalidCoordinate {
        index: usize,
        latitude: f64,
        longitude: f64,
    },
    #[error("cumulative distance decreases at route point {index}")]
    DecreasingDistance { index: usize },
    #[error("the route has no length")]
    ZeroLength,
    #[error("could not read route file: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not parse route file: {0}")]
    Json(#[from] serde_json::Error),
}

/// The parade route through Amsterdam's canals: Westerdok, Prinsengracht,
/// then down the Amstel.
const AMSTERDAM_CANAL_PARADE: [RoutePoint; 14] = [
    RoutePoint::new(52.3851, 4.8947, 0.0),
    RoutePoint::new(52.3836, 4.8902, 350.0),
    RoutePoint::new(52.3812, 4.8872, 690.0),
    RoutePoint::new(52.3781, 4.8851, 1060.0),
    RoutePoint::new(52.3748, 4.8846, 1430.0),
    RoutePoint::new(52.3716, 4.8855, 1790.0),
    RoutePoint::new(52.3690, 4.8880, 2120.0),
    RoutePoint::new(52.3677, 4.8951, 2580.0),
    RoutePoint::new(52.3663, 4.8985, 2860.0),
    RoutePoint::new(52.3650, 4.9012, 3090.0),
    RoutePoint::new(52.3633, 4.9040, 3360.0),
    RoutePoint::new(52.3612, 4.9068, 3660.0),
    RoutePoint::new(52.3590, 4.9098, 3970.0),
    RoutePoint::new(52.3572, 4.9124, 4200.0),
];

/// An ordered, validated list of waypoints. Immutable once built.
#[derive(Debug, Clone)]
pub struct Route {
    points: Vec<RoutePoint>,
}

impl Route {
    pub fn new(points: Vec<RoutePoint>) -> Result<Self, RouteError> {
        if points.len() < 2 {
            return Err(RouteError::TooFewPoints(points.len()));
        }
        for (index, point) in points.iter().enumerate() {
            if !geo::is_valid_coordinate(point.latitude, point.longitude) {
                return Err(RouteError::InvalidCoordinate {
                    index,
                    latitude: point.latitude,
                    longitude: point.longitude,
                });
            }
            let distance = point.cumulative_distance_meters;
            let decreasing = index > 0 && distance < points[index - 1].cumulative_distance_meters;
            if !distance.is_finite() || distance < 0.0 || decreasing {
                return Err(RouteError::DecreasingDistance { index });
            }
        }
        let route = Self { points };
        if route.total_distance() <= 0.0 {
            return Err(RouteError::ZeroLength);
        }
        Ok(route)
    }

    pub fn amsterdam_canal_parade() -> Self {
        Self {
            points: AMSTERDAM_CANAL_PARADE.to_vec(),
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, RouteError> {
        Self::new(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, RouteError> {
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn points(&self) -> &[RoutePoint] {
        &self.points
    }

    /// Length of the route, i.e. the cumulative distance of the last point.
    pub fn total_distance(&self) -> f64 {
        self.points
            .last()
            .map(|point| point.cumulative_distance_meters)
            .unwrap_or(0.0)
    }
}
