use std::{convert::Infallible, time::Duration};

use axum::{
    extract::{Query, State},
    response::sse::{Event, KeepAlive, Sse},
    routing::{get, on},
    Router,
};
use futures::stream::{self, Stream};
use model::{boat::BoatState, stats::ParadeStats};
use serde::{Deserialize, Serialize};
use tokio_stream::StreamExt as _;

use crate::{
    common::{route_not_found, METHOD_FILTER_ALL},
    WebState,
};

const DEFAULT_INTERVAL_SECONDS: u64 = 5;

pub(crate) fn routes(state: WebState) -> Router {
    Router::new()
        .route("/", get(sse_handler))
        .with_state(state)
        .fallback_service(on(METHOD_FILTER_ALL, route_not_found))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LiveQuery {
    interval_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdateEvent {
    boats: Vec<BoatState>,
    stats: ParadeStats,
}

async fn sse_handler(
    State(WebState { tracker, .. }): State<WebState>,
    Query(params): Query<LiveQuery>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let interval = params
        .interval_seconds
        .unwrap_or(DEFAULT_INTERVAL_SECONDS)
        .max(1);
    log::info!("live feed connected, interval {} s", interval);

    let stream = stream::unfold((), move |()| {
        let tracker = tracker.clone();
        async move {
            let event = match tracker.get_all_boat_states().await {
                Ok(boats) => {
                    let stats = ParadeStats::from_states(&boats, tracker.route_length_meters());
                    Event::default()
                        .event("update")
                        .json_data(UpdateEvent { boats, stats })
                        .unwrap_or_else(|why| {
                            log::error!("could not serialize live update: {}", why);
                            Event::default().comment("unavailable")
                        })
                }
                Err(why) => {
                    log::warn!("live update skipped: {}", why);
                    Event::default().comment("unavailable")
                }
            };
            Some((event, ()))
        }
    })
    .map(Ok)
    .throttle(Duration::from_secs(interval));

    Sse::new(stream).keep_alive(KeepAlive::default())
}
