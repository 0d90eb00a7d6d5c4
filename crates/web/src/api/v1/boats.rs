use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, on, post},
    Json, Router,
};
use chrono::Utc;
use model::{
    boat::{BoatId, BoatState, BoatStatus, CorridorStatus},
    incident::{Incident, IncidentCheckResult, IncidentType, Severity},
    position::PositionHistoryEntry,
};
use serde::Deserialize;

use crate::{
    common::{
        route_not_found, schema, JsonResult, RouteErrorResponse, RouteResult, VecResponse,
        METHOD_FILTER_ALL,
    },
    WebState,
};

pub(crate) fn routes(state: WebState) -> Router {
    Router::new()
        .route("/schema", get(schema::<BoatState>))
        .route("/:id/history", get(get_history))
        .route("/:id/corridor", get(get_corridor))
        .route("/:id/incidents/check", get(check_incidents))
        .route("/:id/incidents", post(trigger_incident))
        .route("/:id/status", post(update_status))
        .route("/:id", get(get_boat).put(register_boat).delete(clear_boat))
        .route("/", get(get_boats))
        .with_state(state)
        .fallback_service(on(METHOD_FILTER_ALL, route_not_found))
}

async fn get_boats(
    State(WebState { tracker, .. }): State<WebState>,
) -> JsonResult<VecResponse<BoatState>> {
    let boats = tracker.get_all_boat_states().await?;
    Ok(VecResponse::new(boats).json())
}

async fn get_boat(
    Path(id): Path<String>,
    State(WebState { tracker, .. }): State<WebState>,
) -> JsonResult<BoatState> {
    let boat_id = BoatId::new(id);
    tracker
        .get_boat_state(&boat_id)
        .await?
        .map(Json)
        .ok_or_else(|| RouteErrorResponse::boat_not_found(boat_id))
}

async fn register_boat(
    Path(id): Path<String>,
    State(WebState { tracker, .. }): State<WebState>,
) -> JsonResult<BoatState> {
    Ok(Json(tracker.register_boat(&BoatId::new(id)).await?))
}

async fn clear_boat(
    Path(id): Path<String>,
    State(WebState { tracker, .. }): State<WebState>,
) -> RouteResult<StatusCode> {
    let boat_id = BoatId::new(id);
    if tracker.clear_boat(&boat_id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(RouteErrorResponse::boat_not_found(boat_id))
    }
}

#[derive(Debug, Deserialize)]
struct HistoryQuery {
    limit: Option<usize>,
}

async fn get_history(
    Path(id): Path<String>,
    Query(params): Query<HistoryQuery>,
    State(WebState { tracker, .. }): State<WebState>,
) -> JsonResult<VecResponse<PositionHistoryEntry>> {
    let limit = params.limit.unwrap_or(tracker.settings().history_capacity);
    let history = tracker.get_boat_history(&BoatId::new(id), limit).await?;
    Ok(VecResponse::new(history).json())
}

async fn get_corridor(
    Path(id): Path<String>,
    State(WebState { tracker, .. }): State<WebState>,
) -> JsonResult<CorridorStatus> {
    let boat_id = BoatId::new(id);
    tracker
        .corridor_status(&boat_id)
        .await?
        .map(Json)
        .ok_or_else(|| RouteErrorResponse::boat_not_found(boat_id))
}

async fn check_incidents(
    Path(id): Path<String>,
    State(WebState { tracker, .. }): State<WebState>,
) -> JsonResult<IncidentCheckResult> {
    let boat_id = BoatId::new(id);
    tracker
        .check_for_incidents(&boat_id)
        .await?
        .map(Json)
        .ok_or_else(|| RouteErrorResponse::boat_not_found(boat_id))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IncidentDto {
    #[serde(rename = "type")]
    incident_type: IncidentType,
    severity: Severity,
    message: String,
}

async fn trigger_incident(
    Path(id): Path<String>,
    State(WebState { tracker, .. }): State<WebState>,
    Json(body): Json<IncidentDto>,
) -> JsonResult<BoatState> {
    let incident = Incident::new(body.incident_type, body.severity, body.message, Utc::now());
    Ok(Json(tracker.trigger_incident(&BoatId::new(id), incident).await?))
}

#[derive(Debug, Deserialize)]
struct StatusDto {
    status: BoatStatus,
    metadata: Option<String>,
}

async fn update_status(
    Path(id): Path<String>,
    State(WebState { tracker, .. }): State<WebState>,
    Json(body): Json<StatusDto>,
) -> JsonResult<BoatState> {
    Ok(Json(
        tracker
            .update_status(&BoatId::new(id), body.status, body.metadata)
            .await?,
    ))
}
