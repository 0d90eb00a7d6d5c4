use axum::{
    extract::State,
    routing::{get, on, post},
    Json, Router,
};
use model::{route::RoutePoint, stats::ParadeStats};
use serde::Serialize;
use tower_http::trace::TraceLayer;

use crate::{
    common::{route_not_found, JsonResult, METHOD_FILTER_ALL},
    WebState,
};

mod boats;
mod live;
mod webhook;

pub(crate) fn routes(state: WebState) -> Router {
    Router::new()
        .route("/stats", get(get_stats))
        .route("/route", get(get_route))
        .route("/webhook", post(webhook::ingest))
        .nest_service("/boats", boats::routes(state.clone()))
        .nest_service("/live", live::routes(state.clone()))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .fallback_service(on(METHOD_FILTER_ALL, route_not_found))
}

async fn get_stats(State(WebState { tracker, .. }): State<WebState>) -> JsonResult<ParadeStats> {
    Ok(Json(tracker.get_parade_stats().await?))
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct RouteDto {
    total_distance_meters: f64,
    points: Vec<RoutePoint>,
}

async fn get_route(State(WebState { mapper, .. }): State<WebState>) -> Json<RouteDto> {
    let route = mapper.route();
    Json(RouteDto {
        total_distance_meters: route.total_distance(),
        points: route.points().to_vec(),
    })
}
