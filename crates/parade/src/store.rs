use std::{
    collections::HashMap,
    error,
    sync::Arc,
    time::{Duration, Instant},
};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use model::{
    boat::{BoatId, BoatState, BoatStatus},
    incident::Incident,
};
use serde::Serialize;
use tokio::sync::Mutex;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store is not reachable: {0}")]
    Unavailable(String),
    #[error("could not serialize value: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error(transparent)]
    Other(Box<dyn error::Error + Send + Sync>),
}

impl StoreError {
    pub fn other<T: error::Error + Send + Sync + 'static>(why: T) -> Self {
        Self::Other(Box::new(why))
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// A position as written to durable storage.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionRecord {
    pub latitude: f64,
    pub longitude: f64,
    pub distance_along_route_meters: f64,
    pub progress_percent: f64,
    pub speed_kmh: f64,
    pub heading_degrees: f64,
    pub distance_off_route_meters: f64,
    pub status: BoatStatus,
    pub timestamp: DateTime<Utc>,
}

impl PositionRecord {
    /// `None` for boats which never reported a position.
    pub fn from_state(state: &BoatState) -> Option<Self> {
        let position = &state.position;
        Some(Self {
            latitude: position.latitude,
            longitude: position.longitude,
            distance_along_route_meters: position.distance_along_route_meters,
            progress_percent: position.progress_percent,
            speed_kmh: position.speed_kmh,
            heading_degrees: position.heading_degrees,
            distance_off_route_meters: position.distance_off_route_meters,
            status: state.status,
            timestamp: position.last_update_timestamp?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentRecord {
    #[serde(flatten)]
    pub incident: Incident,
    pub status: BoatStatus,
}

/// Durable storage for positions and incidents. Returns the id of the
/// stored row.
#[async_trait]
pub trait Persistence: Send + Sync + 'static {
    async fn save_position(&self, boat_id: &BoatId, record: PositionRecord) -> StoreResult<i64>;
    async fn save_incident(&self, boat_id: &BoatId, record: IncidentRecord) -> StoreResult<i64>;
}

/// A short lived key/value cache.
#[async_trait]
pub trait Cache: Send + Sync + 'static {
    async fn set(&self, key: &str, value: String, ttl: Duration) -> StoreResult<()>;
    async fn get(&self, key: &str) -> StoreResult<Option<String>>;
    async fn del(&self, key: &str) -> StoreResult<()>;
}

pub fn boat_state_key(boat_id: &BoatId) -> String {
    format!("boat:{}:state", boat_id)
}

/// The optional outbound dependencies of the tracker. Either may be missing,
/// in which case the tracker works purely in memory.
#[derive(Clone, Default)]
pub struct Stores {
    pub persistence: Option<Arc<dyn Persistence>>,
    pub cache: Option<Arc<dyn Cache>>,
}

impl Stores {
    /// Writes the position in the background. Failures are logged only.
    pub(crate) fn save_position(&self, state: &BoatState) {
        let (Some(persistence), Some(record)) =
            (self.persistence.clone(), PositionRecord::from_state(state))
        else {
            return;
        };
        let boat_id = state.id.clone();
        tokio::spawn(async move {
            if let Err(why) = persistence.save_position(&boat_id, record).await {
                log::error!("could not persist position of boat {}: {}", boat_id, why);
            }
        });
    }

    pub(crate) fn save_incident(&self, state: &BoatState, incident: Incident) {
        let Some(persistence) = self.persistence.clone() else {
            return;
        };
        let boat_id = state.id.clone();
        let record = IncidentRecord {
            incident,
            status: state.status,
        };
        tokio::spawn(async move {
            if let Err(why) = persistence.save_incident(&boat_id, record).await {
                log::error!("could not persist incident of boat {}: {}", boat_id, why);
            }
        });
    }

    pub(crate) fn refresh_cache(&self, state: &BoatState, ttl: Duration) {
        let Some(cache) = self.cache.clone() else {
            return;
        };
        let key = boat_state_key(&state.id);
        let value = match serde_json::to_string(state) {
            Ok(value) => value,
            Err(why) => {
                log::warn!("could not serialize state of boat {}: {}", state.id, why);
                return;
            }
        };
        tokio::spawn(async move {
            if let Err(why) = cache.set(&key, value, ttl).await {
                log::warn!("could not cache {}: {}", key, why);
            }
        });
    }

    pub(crate) fn evict_cache(&self, boat_id: &BoatId) {
        let Some(cache) = self.cache.clone() else {
            return;
        };
        let key = boat_state_key(boat_id);
        tokio::spawn(async move {
            if let Err(why) = cache.del(&key).await {
                log::warn!("could not evict {}: {}", key, why);
            }
        });
    }
}

/// In process cache with lazy expiry.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, (String, Instant)>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Cache for MemoryCache {
    async fn set(&self, key: &str, value: String, ttl: Duration) -> StoreResult<()> {
        let expires_at = Instant::now() + ttl;
        self.entries
            .lock()
            .await
            .insert(key.to_owned(), (value, expires_at));
        Ok(())
    }

    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let mut entries = self.entries.lock().await;
        match entries.get(key) {
            Some((_, expires_at)) if *expires_at <= Instant::now() => {
                entries.remove(key);
                Ok(None)
            }
            Some((value, _)) => Ok(Some(value.clone())),
            None => Ok(None),
        }
    }

    async fn del(&self, key: &str) -> StoreResult<()> {
        self.entries.lock().await.remove(key);
        Ok(())
    }
}
