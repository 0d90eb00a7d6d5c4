use std::{collections::VecDeque, sync::Arc};

use actors::{
    actor::Actor,
    handler::{Handler, Message},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use model::{
    boat::{BoatId, BoatState, BoatStatus, CorridorStatus, IllegalTransition},
    incident::{Incident, IncidentCheckResult, IncidentType, Severity},
    position::{MappedPosition, PositionHistoryEntry},
};
use utility::geo;

use crate::{settings::TrackerSettings, store::Stores, tracker::IngestedPosition};

/// Owns the state of exactly one boat. All changes to a boat go through its
/// actor, so updates for the same boat never interleave.
pub(crate) struct BoatActor {
    state: BoatState,
    history: VecDeque<PositionHistoryEntry>,
    settings: Arc<TrackerSettings>,
    stores: Stores,
}

impl BoatActor {
    pub(crate) fn new(
        id: BoatId,
        status: BoatStatus,
        settings: Arc<TrackerSettings>,
        stores: Stores,
    ) -> Self {
        Self {
            state: BoatState::new(id, status, Utc::now()),
            history: VecDeque::with_capacity(settings.history_capacity),
            settings,
            stores,
        }
    }

    fn apply_position(&mut self, mapped: MappedPosition) {
        let previous = &self.state.position;
        let mut speed_kmh = previous.speed_kmh;

        if let Some(previous_timestamp) = previous.last_update_timestamp {
            let elapsed_seconds =
                (mapped.source_timestamp - previous_timestamp).num_milliseconds() as f64 / 1000.0;
            if elapsed_seconds > 0.0 {
                let delta_meters =
                    mapped.distance_along_route_meters - previous.distance_along_route_meters;
                speed_kmh = geo::round_to(delta_meters / elapsed_seconds * 3.6, 2);
            } else {
                log::debug!(
                    "boat {}: fix at {} is not newer than {}, keeping speed",
                    self.state.id,
                    mapped.source_timestamp,
                    previous_timestamp
                );
            }
        }

        let position = &mut self.state.position;
        position.latitude = mapped.latitude;
        position.longitude = mapped.longitude;
        position.distance_along_route_meters = mapped.distance_along_route_meters;
        position.progress_percent = mapped.progress_percent;
        position.speed_kmh = speed_kmh;
        position.heading_degrees = mapped.heading_degrees;
        position.distance_off_route_meters = mapped.distance_off_route_meters;
        position.last_update_timestamp = Some(mapped.source_timestamp);

        let status = self.state.status.after_progress(mapped.progress_percent);
        if status != self.state.status {
            log::info!("boat {} is now {}", self.state.id, status);
            self.state.status = status;
        }
        self.state.last_update_at = Utc::now();

        self.history.push_back(PositionHistoryEntry {
            timestamp: mapped.source_timestamp,
            latitude: mapped.latitude,
            longitude: mapped.longitude,
            distance_along_route_meters: mapped.distance_along_route_meters,
            progress_percent: mapped.progress_percent,
            speed_kmh,
            status: self.state.status,
        });
        while self.history.len() > self.settings.history_capacity {
            self.history.pop_front();
        }
    }

    fn is_in_corridor(&self) -> bool {
        self.state.position.distance_off_route_meters <= self.settings.corridor_tolerance_meters
    }

    fn corridor_status(&self, excursion_started: bool) -> CorridorStatus {
        let corridor = &self.state.corridor;
        CorridorStatus {
            boat_id: self.state.id.clone(),
            in_corridor: self.is_in_corridor(),
            distance_off_route_meters: self.state.position.distance_off_route_meters,
            tolerance_meters: self.settings.corridor_tolerance_meters,
            warning_count: corridor.warning_count,
            last_warning_timestamp: corridor.last_warning_timestamp,
            excursion_started,
        }
    }

    fn check_corridor(&mut self) -> CorridorStatus {
        let in_corridor = self.is_in_corridor();
        let corridor = &mut self.state.corridor;

        let excursion_started = corridor.in_corridor && !in_corridor;
        if excursion_started {
            corridor.warning_count += 1;
            corridor.last_warning_timestamp =
                Some(self.state.position.last_update_timestamp.unwrap_or_else(Utc::now));
            log::warn!(
                "boat {} left the corridor: {} m off route (warning {})",
                self.state.id,
                self.state.position.distance_off_route_meters,
                corridor.warning_count
            );
        }
        corridor.in_corridor = in_corridor;

        self.corridor_status(excursion_started)
    }

    fn check_for_incidents(&self, now: DateTime<Utc>) -> IncidentCheckResult {
        let settings = &self.settings;
        let speed = self.state.position.speed_kmh;
        let mut candidates = vec![];

        if speed < settings.stopped_below_kmh && self.state.status == BoatStatus::Active {
            candidates.push(Incident::new(
                IncidentType::Stopped,
                Severity::Warning,
                format!("boat {} appears to have stopped ({} km/h)", self.state.id, speed),
                now,
            ));
        }
        if speed < settings.reverse_below_kmh {
            candidates.push(Incident::new(
                IncidentType::Reverse,
                Severity::Warning,
                format!("boat {} is moving backwards ({} km/h)", self.state.id, speed),
                now,
            ));
        }
        if speed > settings.speeding_above_kmh {
            candidates.push(Incident::new(
                IncidentType::Speeding,
                Severity::Warning,
                format!(
                    "boat {} is going {} km/h, limit is {} km/h",
                    self.state.id, speed, settings.speeding_above_kmh
                ),
                now,
            ));
        }

        IncidentCheckResult {
            boat_id: self.state.id.clone(),
            speed_kmh: speed,
            candidates,
        }
    }

    fn record_incident(&mut self, incident: Incident) {
        log::info!(
            "boat {}: {:?} incident ({:?}): {}",
            self.state.id,
            incident.incident_type,
            incident.severity,
            incident.message
        );
        if incident.is_critical() && self.state.status != BoatStatus::Emergency {
            log::warn!("boat {} escalated to emergency", self.state.id);
            self.state.status = BoatStatus::Emergency;
        }
        self.state.incidents.push(incident.clone());
        let overflow = self
            .state
            .incidents
            .len()
            .saturating_sub(self.settings.incident_capacity);
        self.state.incidents.drain(..overflow);
        self.state.last_update_at = Utc::now();
        self.stores.save_incident(&self.state, incident);
    }

    fn update_status(
        &mut self,
        status: BoatStatus,
        metadata: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<(), IllegalTransition> {
        let current = self.state.status;
        let next = current.transition_to(status)?;
        if next == current {
            return Ok(());
        }
        if next == BoatStatus::Emergency {
            let message = metadata.unwrap_or_else(|| "emergency declared by operator".to_owned());
            self.record_incident(Incident::new(
                IncidentType::ManualEmergency,
                Severity::Critical,
                message,
                now,
            ));
        } else {
            log::info!(
                "boat {} changed from {} to {}{}",
                self.state.id,
                current,
                next,
                metadata.map(|m| format!(": {}", m)).unwrap_or_default()
            );
            self.state.status = next;
            self.state.last_update_at = Utc::now();
        }
        Ok(())
    }

    fn history(&self, limit: usize) -> Vec<PositionHistoryEntry> {
        let skip = self.history.len().saturating_sub(limit);
        self.history.iter().skip(skip).cloned().collect()
    }

    fn refresh_cache(&self) {
        self.stores.refresh_cache(&self.state, self.settings.cache_ttl());
    }
}

impl Actor for BoatActor {
    fn name(&self) -> String {
        format!("boat {}", self.state.id)
    }
}

pub(crate) struct UpdatePosition(pub MappedPosition);

impl Message for UpdatePosition {
    type Response = BoatState;
}

#[async_trait]
impl Handler<UpdatePosition> for BoatActor {
    async fn handle(&mut self, message: UpdatePosition) -> BoatState {
        self.apply_position(message.0);
        self.stores.save_position(&self.state);
        self.refresh_cache();
        self.state.clone()
    }
}

/// Applies a fix and checks the corridor in one turn of the actor. A new
/// excursion is recorded as a corridor violation.
pub(crate) struct IngestPosition {
    pub mapped: MappedPosition,
    pub now: DateTime<Utc>,
}

impl Message for IngestPosition {
    type Response = IngestedPosition;
}

#[async_trait]
impl Handler<IngestPosition> for BoatActor {
    async fn handle(&mut self, message: IngestPosition) -> IngestedPosition {
        self.apply_position(message.mapped);
        self.stores.save_position(&self.state);

        let corridor = self.check_corridor();
        if corridor.excursion_started {
            self.record_incident(Incident::new(
                IncidentType::CorridorViolation,
                Severity::Warning,
                format!(
                    "{:.0} m off route, {:.0} m allowed",
                    corridor.distance_off_route_meters, corridor.tolerance_meters
                ),
                message.now,
            ));
        }
        self.refresh_cache();

        IngestedPosition {
            state: self.state.clone(),
            corridor,
        }
    }
}

pub(crate) struct CheckCorridor;

impl Message for CheckCorridor {
    type Response = CorridorStatus;
}

#[async_trait]
impl Handler<CheckCorridor> for BoatActor {
    async fn handle(&mut self, _: CheckCorridor) -> CorridorStatus {
        let status = self.check_corridor();
        if status.excursion_started {
            self.refresh_cache();
        }
        status
    }
}

pub(crate) struct GetCorridor;

impl Message for GetCorridor {
    type Response = CorridorStatus;
}

#[async_trait]
impl Handler<GetCorridor> for BoatActor {
    async fn handle(&mut self, _: GetCorridor) -> CorridorStatus {
        self.corridor_status(false)
    }
}

pub(crate) struct CheckIncidents {
    pub now: DateTime<Utc>,
}

impl Message for CheckIncidents {
    type Response = IncidentCheckResult;
}

#[async_trait]
impl Handler<CheckIncidents> for BoatActor {
    async fn handle(&mut self, message: CheckIncidents) -> IncidentCheckResult {
        self.check_for_incidents(message.now)
    }
}

pub(crate) struct TriggerIncident(pub Incident);

impl Message for TriggerIncident {
    type Response = BoatState;
}

#[async_trait]
impl Handler<TriggerIncident> for BoatActor {
    async fn handle(&mut self, message: TriggerIncident) -> BoatState {
        self.record_incident(message.0);
        self.refresh_cache();
        self.state.clone()
    }
}

pub(crate) struct UpdateStatus {
    pub status: BoatStatus,
    pub metadata: Option<String>,
    pub now: DateTime<Utc>,
}

impl Message for UpdateStatus {
    type Response = Result<BoatState, IllegalTransition>;
}

#[async_trait]
impl Handler<UpdateStatus> for BoatActor {
    async fn handle(&mut self, message: UpdateStatus) -> Result<BoatState, IllegalTransition> {
        self.update_status(message.status, message.metadata, message.now)?;
        self.refresh_cache();
        Ok(self.state.clone())
    }
}

pub(crate) struct GetState;

impl Message for GetState {
    type Response = BoatState;
}

#[async_trait]
impl Handler<GetState> for BoatActor {
    async fn handle(&mut self, _: GetState) -> BoatState {
        self.state.clone()
    }
}

pub(crate) struct GetHistory {
    pub limit: usize,
}

impl Message for GetHistory {
    type Response = Vec<PositionHistoryEntry>;
}

#[async_trait]
impl Handler<GetHistory> for BoatActor {
    async fn handle(&mut self, message: GetHistory) -> Vec<PositionHistoryEntry> {
        self.history(message.limit)
    }
}
