use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::boat::{BoatId, BoatState, BoatStatus};

/// Aggregated view over all tracked boats.
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ParadeStats {
    pub total_boats: usize,
    pub waiting: usize,
    pub active: usize,
    pub finished: usize,
    pub emergency: usize,
    pub out_of_corridor: usize,
    #[serde(serialize_with = "utility::serde::two_decimals::serialize")]
    pub average_progress_percent: f64,
    /// Average over active boats only.
    #[serde(serialize_with = "utility::serde::two_decimals::serialize")]
    pub average_speed_kmh: f64,
    pub leading_boat: Option<BoatId>,
    pub total_incidents: usize,
    pub route_length_meters: f64,
}

impl ParadeStats {
    pub fn from_states(states: &[BoatState], route_length_meters: f64) -> Self {
        let count = |status: BoatStatus| states.iter().filter(|s| s.status == status).count();
        let active = states
            .iter()
            .filter(|s| s.status == BoatStatus::Active)
            .collect::<Vec<_>>();

        let average_progress_percent = average(states.iter().map(|s| s.position.progress_percent));
        let average_speed_kmh = average(active.iter().map(|s| s.position.speed_kmh));

        // nobody leads before the first boat has moved
        let leading_boat = states
            .iter()
            .filter(|s| s.position.distance_along_route_meters > 0.0)
            .max_by(|a, b| {
                a.position
                    .distance_along_route_meters
                    .total_cmp(&b.position.distance_along_route_meters)
            })
            .map(|state| state.id.clone());

        Self {
            total_boats: states.len(),
            waiting: count(BoatStatus::Waiting),
            active: active.len(),
            finished: count(BoatStatus::Finished),
            emergency: count(BoatStatus::Emergency),
            out_of_corridor: states.iter().filter(|s| !s.corridor.in_corridor).count(),
            average_progress_percent,
            average_speed_kmh,
            leading_boat,
            total_incidents: states.iter().map(|s| s.incidents.len()).sum(),
            route_length_meters,
        }
    }
}

fn average(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use utility::id::Id;

    use super::*;

    fn boat(id: &str, status: BoatStatus, distance: f64, speed: f64) -> BoatState {
        let mut state = BoatState::new(Id::from(id), status, Utc::now());
        state.position.distance_along_route_meters = distance;
        state.position.progress_percent = distance / 42.0;
        state.position.speed_kmh = speed;
        state
    }

    #[test]
    fn test_empty_parade() {
        let stats = ParadeStats::from_states(&[], 4200.0);
        assert_eq!(stats.total_boats, 0);
        assert_eq!(stats.average_progress_percent, 0.0);
        assert_eq!(stats.leading_boat, None);
    }

    #[test]
    fn test_counts_and_leader() {
        let states = vec![
            boat("a", BoatStatus::Active, 1000.0, 4.0),
            boat("b", BoatStatus::Active, 2100.0, 6.0),
            boat("c", BoatStatus::Waiting, 0.0, 0.0),
            boat("d", BoatStatus::Emergency, 1500.0, 0.0),
        ];
        let stats = ParadeStats::from_states(&states, 4200.0);
        assert_eq!(stats.total_boats, 4);
        assert_eq!(stats.active, 2);
        assert_eq!(stats.waiting, 1);
        assert_eq!(stats.emergency, 1);
        assert_eq!(stats.average_speed_kmh, 5.0);
        assert_eq!(stats.leading_boat, Some(Id::from("b")));
    }

    #[test]
    fn test_no_leader_before_anyone_moved() {
        let states = vec![
            boat("a", BoatStatus::Waiting, 0.0, 0.0),
            boat("b", BoatStatus::Waiting, 0.0, 0.0),
        ];
        let stats = ParadeStats::from_states(&states, 4200.0);
        assert_eq!(stats.waiting, 2);
        assert_eq!(stats.leading_boat, None);
    }
}
