use std::sync::Arc;

use actors::{
    actor_ref::ActorRef,
    handler::{Handler, Message},
};
use chrono::Utc;
use futures::future;
use indexmap::IndexMap;
use model::{
    boat::{BoatId, BoatState, BoatStatus, CorridorStatus},
    incident::{Incident, IncidentCheckResult},
    position::{MappedPosition, PositionHistoryEntry},
    stats::ParadeStats,
};
use tokio::sync::RwLock;

use crate::{
    boat::{
        BoatActor, CheckCorridor, CheckIncidents, GetCorridor, GetHistory, GetState,
        IngestPosition, TriggerIncident, UpdatePosition, UpdateStatus,
    },
    not_found_to_none,
    settings::TrackerSettings,
    store::{Cache, Persistence, Stores},
    TrackerError, TrackerResult,
};

/// A boat after a fix was ingested, together with the corridor check done
/// on that fix.
#[derive(Debug, Clone, PartialEq)]
pub struct IngestedPosition {
    pub state: BoatState,
    pub corridor: CorridorStatus,
}

/// Keeps the live state of every boat in the parade.
///
/// Each boat is owned by its own actor: updates for one boat are applied one
/// after another, while different boats never wait for each other. The map
/// of actors is only locked to look up or add a boat.
pub struct BoatTracker {
    settings: Arc<TrackerSettings>,
    stores: Stores,
    route_length_meters: f64,
    boats: RwLock<IndexMap<BoatId, ActorRef<BoatActor>>>,
}

impl BoatTracker {
    pub fn new(settings: TrackerSettings, route_length_meters: f64) -> Self {
        Self {
            settings: Arc::new(settings),
            stores: Stores::default(),
            route_length_meters,
            boats: RwLock::new(IndexMap::new()),
        }
    }

    pub fn with_persistence(mut self, persistence: Arc<dyn Persistence>) -> Self {
        self.stores.persistence = Some(persistence);
        self
    }

    pub fn with_cache(mut self, cache: Arc<dyn Cache>) -> Self {
        self.stores.cache = Some(cache);
        self
    }

    pub fn settings(&self) -> &TrackerSettings {
        &self.settings
    }

    pub fn route_length_meters(&self) -> f64 {
        self.route_length_meters
    }

    async fn existing(&self, boat_id: &BoatId) -> TrackerResult<ActorRef<BoatActor>> {
        self.boats
            .read()
            .await
            .get(boat_id)
            .cloned()
            .ok_or_else(|| TrackerError::NotFound(boat_id.clone()))
    }

    async fn existing_or_spawn(
        &self,
        boat_id: &BoatId,
        initial_status: BoatStatus,
    ) -> ActorRef<BoatActor> {
        if let Ok(boat) = self.existing(boat_id).await {
            return boat;
        }
        self.boats
            .write()
            .await
            .entry(boat_id.clone())
            .or_insert_with(|| {
                log::info!("tracking new boat {}", boat_id);
                let actor = BoatActor::new(
                    boat_id.clone(),
                    initial_status,
                    self.settings.clone(),
                    self.stores.clone(),
                );
                actors::run_with_capacity(actor, self.settings.mailbox_capacity)
            })
            .clone()
    }

    async fn ask_boat<M>(
        &self,
        boat: &ActorRef<BoatActor>,
        boat_id: &BoatId,
        message: M,
    ) -> TrackerResult<M::Response>
    where
        M: Message,
        BoatActor: Handler<M>,
    {
        boat.ask(message)
            .await
            .map_err(|why| TrackerError::Unavailable(boat_id.clone(), why))
    }

    async fn ask<M>(&self, boat_id: &BoatId, message: M) -> TrackerResult<M::Response>
    where
        M: Message,
        BoatActor: Handler<M>,
    {
        let boat = self.existing(boat_id).await?;
        self.ask_boat(&boat, boat_id, message).await
    }

    /// Merges a mapped position into the boat's state, creating the boat on
    /// its first fix. Persistence happens in the background and never fails
    /// this call.
    pub async fn update_position(
        &self,
        boat_id: &BoatId,
        mapped: MappedPosition,
    ) -> TrackerResult<BoatState> {
        let boat = self.existing_or_spawn(boat_id, BoatStatus::Active).await;
        self.ask_boat(&boat, boat_id, UpdatePosition(mapped)).await
    }

    /// Like [`BoatTracker::update_position`] followed by
    /// [`BoatTracker::check_corridor`], but no other request for the boat
    /// can run in between. A new excursion records a corridor violation.
    pub async fn ingest_position(
        &self,
        boat_id: &BoatId,
        mapped: MappedPosition,
    ) -> TrackerResult<IngestedPosition> {
        let boat = self.existing_or_spawn(boat_id, BoatStatus::Active).await;
        let message = IngestPosition {
            mapped,
            now: Utc::now(),
        };
        self.ask_boat(&boat, boat_id, message).await
    }

    /// Adds a boat in status `waiting` before its first fix. Known boats are
    /// left untouched.
    pub async fn register_boat(&self, boat_id: &BoatId) -> TrackerResult<BoatState> {
        let boat = self.existing_or_spawn(boat_id, BoatStatus::Waiting).await;
        self.ask_boat(&boat, boat_id, GetState).await
    }

    pub async fn check_corridor(&self, boat_id: &BoatId) -> TrackerResult<Option<CorridorStatus>> {
        not_found_to_none(self.ask(boat_id, CheckCorridor).await)
    }

    /// Reports the corridor for the current position without counting a
    /// new excursion.
    pub async fn corridor_status(&self, boat_id: &BoatId) -> TrackerResult<Option<CorridorStatus>> {
        not_found_to_none(self.ask(boat_id, GetCorridor).await)
    }

    pub async fn check_for_incidents(
        &self,
        boat_id: &BoatId,
    ) -> TrackerResult<Option<IncidentCheckResult>> {
        let message = CheckIncidents { now: Utc::now() };
        not_found_to_none(self.ask(boat_id, message).await)
    }

    /// Records an incident on the boat. Critical incidents put the boat into
    /// emergency.
    pub async fn trigger_incident(
        &self,
        boat_id: &BoatId,
        incident: Incident,
    ) -> TrackerResult<BoatState> {
        self.ask(boat_id, TriggerIncident(incident)).await
    }

    pub async fn update_status(
        &self,
        boat_id: &BoatId,
        status: BoatStatus,
        metadata: Option<String>,
    ) -> TrackerResult<BoatState> {
        let message = UpdateStatus {
            status,
            metadata,
            now: Utc::now(),
        };
        Ok(self.ask(boat_id, message).await??)
    }

    pub async fn get_boat_state(&self, boat_id: &BoatId) -> TrackerResult<Option<BoatState>> {
        not_found_to_none(self.ask(boat_id, GetState).await)
    }

    /// All boats in the order they were first seen.
    pub async fn get_all_boat_states(&self) -> TrackerResult<Vec<BoatState>> {
        let boats = self
            .boats
            .read()
            .await
            .iter()
            .map(|(id, boat)| (id.clone(), boat.clone()))
            .collect::<Vec<_>>();
        future::try_join_all(boats.iter().map(|(id, boat)| self.ask_boat(boat, id, GetState)))
            .await
    }

    /// The newest `limit` history entries, oldest first. Unknown boats have
    /// no history.
    pub async fn get_boat_history(
        &self,
        boat_id: &BoatId,
        limit: usize,
    ) -> TrackerResult<Vec<PositionHistoryEntry>> {
        not_found_to_none(self.ask(boat_id, GetHistory { limit }).await)
            .map(Option::unwrap_or_default)
    }

    pub async fn get_parade_stats(&self) -> TrackerResult<ParadeStats> {
        let states = self.get_all_boat_states().await?;
        Ok(ParadeStats::from_states(&states, self.route_length_meters))
    }

    /// Forgets a boat. Returns false if it was not tracked.
    pub async fn clear_boat(&self, boat_id: &BoatId) -> bool {
        let removed = self.boats.write().await.shift_remove(boat_id).is_some();
        if removed {
            log::info!("stopped tracking boat {}", boat_id);
            self.stores.evict_cache(boat_id);
        }
        removed
    }

    pub async fn clear_all(&self) {
        let boats = std::mem::take(&mut *self.boats.write().await);
        for boat_id in boats.keys() {
            self.stores.evict_cache(boat_id);
        }
        log::info!("stopped tracking {} boats", boats.len());
    }
}
