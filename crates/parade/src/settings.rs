use std::{env, fs, path::Path, time::Duration};

use serde::{Deserialize, Serialize};

use crate::{
    devices::StaticDeviceDirectory,
    route::{Route, RouteError},
};

/// Tunable thresholds of the tracker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TrackerSettings {
    /// Fixes farther than this from every waypoint are rejected.
    pub mapping_tolerance_meters: f64,
    /// Boats farther than this from the route are outside the safety corridor.
    pub corridor_tolerance_meters: f64,
    pub stopped_below_kmh: f64,
    pub reverse_below_kmh: f64,
    pub speeding_above_kmh: f64,
    pub history_capacity: usize,
    pub incident_capacity: usize,
    pub cache_ttl_seconds: u64,
    pub mailbox_capacity: usize,
}

impl Default for TrackerSettings {
    fn default() -> Self {
        Self {
            mapping_tolerance_meters: 100.0,
            corridor_tolerance_meters: 50.0,
            stopped_below_kmh: 0.5,
            reverse_below_kmh: -1.0,
            speeding_above_kmh: 10.0,
            history_capacity: 100,
            incident_capacity: 50,
            cache_ttl_seconds: 60,
            mailbox_capacity: actors::DEFAULT_MAILBOX_CAPACITY,
        }
    }
}

impl TrackerSettings {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_seconds)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error(transparent)]
    Route(#[from] RouteError),
    #[error("could not read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("could not parse {path}: {source}")]
    Json {
        path: String,
        source: serde_json::Error,
    },
}

/// Everything the service needs at startup.
#[derive(Debug, Clone)]
pub struct ParadeConfig {
    pub route: Route,
    pub devices: StaticDeviceDirectory,
    pub settings: TrackerSettings,
    pub bind_address: String,
}

impl ParadeConfig {
    pub const DEFAULT_BIND_ADDRESS: &'static str = "0.0.0.0:8080";

    /// Reads `PARADE_ROUTE_FILE`, `PARADE_DEVICES_FILE`, `PARADE_SETTINGS_FILE`
    /// and `PARADE_BIND_ADDRESS`. Every variable is optional.
    pub fn from_env() -> Result<Self, ConfigError> {
        let route = match env::var("PARADE_ROUTE_FILE") {
            Ok(path) => Route::from_json_file(path)?,
            Err(_) => Route::amsterdam_canal_parade(),
        };
        let devices = match env::var("PARADE_DEVICES_FILE") {
            Ok(path) => StaticDeviceDirectory::new(read_json(&path)?),
            Err(_) => StaticDeviceDirectory::passthrough(),
        };
        let settings = match env::var("PARADE_SETTINGS_FILE") {
            Ok(path) => read_json(&path)?,
            Err(_) => TrackerSettings::default(),
        };
        let bind_address = env::var("PARADE_BIND_ADDRESS")
            .unwrap_or_else(|_| Self::DEFAULT_BIND_ADDRESS.to_owned());
        Ok(Self {
            route,
            devices,
            settings,
            bind_address,
        })
    }
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &str) -> Result<T, ConfigError> {
    let content = fs::read_to_string(Path::new(path)).map_err(|source| ConfigError::Io {
        path: path.to_owned(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| ConfigError::Json {
        path: path.to_owned(),
        source,
    })
}
