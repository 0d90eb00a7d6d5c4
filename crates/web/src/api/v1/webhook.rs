use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use model::boat::{BoatState, CorridorStatus};
use parade::{IngestedPosition, MappingResult};
use serde::{Deserialize, Serialize};

use crate::{
    common::{RouteErrorResponse, RouteResult},
    WebState,
};

/// Trackers send either an RFC 3339 string or a unix timestamp, possibly
/// with a fractional part.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum FixTimestamp {
    Unix(serde_json::Number),
    Text(String),
}

impl FixTimestamp {
    fn as_text(&self) -> String {
        match self {
            FixTimestamp::Unix(value) => value.to_string(),
            FixTimestamp::Text(value) => value.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct FixDto {
    #[serde(alias = "imei")]
    device_id: String,
    latitude: f64,
    longitude: f64,
    timestamp: FixTimestamp,
}

#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct IngestResponse {
    accepted: bool,
    reason: Option<&'static str>,
    distance_to_route_meters: Option<f64>,
    boat: Option<BoatState>,
    corridor: Option<CorridorStatus>,
}

pub(crate) async fn ingest(
    State(WebState {
        mapper,
        tracker,
        devices,
    }): State<WebState>,
    payload: Result<Json<FixDto>, JsonRejection>,
) -> RouteResult<Response> {
    let Json(fix) = payload?;
    let Some(boat_id) = devices.resolve(&fix.device_id).await else {
        return Err(RouteErrorResponse::new(StatusCode::NOT_FOUND)
            .with_message(format!("device {} is not assigned to a boat", fix.device_id)));
    };

    let mapped = match mapper.map_fix(fix.latitude, fix.longitude, &fix.timestamp.as_text())? {
        MappingResult::Mapped(mapped) => mapped,
        MappingResult::Rejected(rejection) => {
            log::info!("ignored off-route fix for boat {}", boat_id);
            let response = IngestResponse {
                accepted: false,
                reason: Some("off-route"),
                distance_to_route_meters: Some(rejection.distance_to_route_meters.round()),
                boat: None,
                corridor: None,
            };
            return Ok((StatusCode::ACCEPTED, Json(response)).into_response());
        }
    };

    let IngestedPosition { state, corridor } = tracker.ingest_position(&boat_id, mapped).await?;

    let response = IngestResponse {
        accepted: true,
        reason: None,
        distance_to_route_meters: None,
        boat: Some(state),
        corridor: Some(corridor),
    };
    Ok(Json(response).into_response())
}
