use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use chrono::{DateTime, Utc};
use parade::{
    devices::StaticDeviceDirectory, store::MemoryCache, BoatTracker, Route, RouteMapper,
    TrackerSettings,
};
use serde_json::{json, Value};
use tower::ServiceExt as _;
use web::{router, WebState};

fn app() -> Router {
    let route = Route::amsterdam_canal_parade();
    let tracker = BoatTracker::new(TrackerSettings::default(), route.total_distance())
        .with_cache(Arc::new(MemoryCache::new()));
    let devices = StaticDeviceDirectory::new(
        [("356938035643809".to_owned(), "westerdok-1".to_owned())].into(),
    );
    router(WebState {
        mapper: Arc::new(RouteMapper::new(route)),
        tracker: Arc::new(tracker),
        devices: Arc::new(devices),
    })
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => request
            .header("content-type", "application/json")
            .body(Body::from(body.to_string())),
        None => request.body(Body::empty()),
    }
    .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn fix(app: &Router, latitude: f64, longitude: f64, timestamp: Value) -> (StatusCode, Value) {
    let body = json!({
        "imei": "356938035643809",
        "latitude": latitude,
        "longitude": longitude,
        "timestamp": timestamp,
    });
    send(app, Method::POST, "/api/v1/webhook", Some(body)).await
}

#[tokio::test]
async fn test_ping() {
    let (status, body) = send(&app(), Method::GET, "/api/ping", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "pong!");
}

#[tokio::test]
async fn test_webhook_tracks_boat() {
    let app = app();

    let (status, body) = fix(&app, 52.3851, 4.8947, json!("2024-08-03T12:00:00Z")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["accepted"], true);
    assert_eq!(body["boat"]["id"], "westerdok-1");
    assert_eq!(body["boat"]["status"], "active");
    assert_eq!(body["corridor"]["inCorridor"], true);

    let (status, body) = fix(&app, 52.3677, 4.8951, json!(1722688200)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["boat"]["position"]["speedKmh"], 5.16);

    let (status, body) = send(&app, Method::GET, "/api/v1/boats/westerdok-1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["position"]["distanceAlongRouteMeters"], 2580.0);

    let (_, body) = send(&app, Method::GET, "/api/v1/boats/westerdok-1/history?limit=1", None).await;
    assert_eq!(body["totalItems"], 1);
    assert_eq!(body["data"][0]["distanceAlongRouteMeters"], 2580.0);

    let (_, body) = send(&app, Method::GET, "/api/v1/boats", None).await;
    assert_eq!(body["totalItems"], 1);
}

#[tokio::test]
async fn test_webhook_rejects_off_route_fix() {
    let app = app();
    let (status, body) = fix(&app, 52.0, 5.5, json!("2024-08-03T12:00:00Z")).await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body["accepted"], false);
    assert_eq!(body["reason"], "off-route");

    let (_, body) = send(&app, Method::GET, "/api/v1/boats", None).await;
    assert_eq!(body["totalItems"], 0);
}

#[tokio::test]
async fn test_webhook_unknown_device() {
    let body = json!({
        "deviceId": "000000000000000",
        "latitude": 52.3851,
        "longitude": 4.8947,
        "timestamp": "2024-08-03T12:00:00Z",
    });
    let (status, _) = send(&app(), Method::POST, "/api/v1/webhook", Some(body)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_webhook_invalid_fix() {
    let app = app();
    let (status, _) = fix(&app, 91.0, 4.8947, json!("2024-08-03T12:00:00Z")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = fix(&app, 52.3851, 4.8947, json!("yesterday")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = fix(&app, 52.3851, 4.8947, json!(i64::MIN)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detailedInformation"].is_string());
}

#[tokio::test]
async fn test_webhook_accepts_fractional_unix_time() {
    let app = app();
    let (status, body) = fix(&app, 52.3851, 4.8947, json!(1722686400.5)).await;
    assert_eq!(status, StatusCode::OK);
    let timestamp: DateTime<Utc> =
        serde_json::from_value(body["boat"]["position"]["lastUpdateTimestamp"].clone()).unwrap();
    assert_eq!(timestamp.timestamp(), 1722686400);
    assert_eq!(timestamp.timestamp_subsec_millis(), 500);
}

#[tokio::test]
async fn test_webhook_malformed_body() {
    let body = json!({ "imei": "356938035643809", "latitude": "north" });
    let (status, body) = send(&app(), Method::POST, "/api/v1/webhook", Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "The request body is malformed.");
}

#[tokio::test]
async fn test_webhook_records_corridor_violation() {
    let app = app();
    fix(&app, 52.3851, 4.8947, json!("2024-08-03T12:00:00Z")).await;

    let (status, body) = fix(&app, 52.3858, 4.8947, json!("2024-08-03T12:01:00Z")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["corridor"]["inCorridor"], false);
    assert_eq!(body["corridor"]["warningCount"], 1);
    assert_eq!(body["boat"]["incidents"][0]["type"], "corridor-violation");

    // still outside, no new excursion
    let (_, body) = fix(&app, 52.3858, 4.8947, json!("2024-08-03T12:02:00Z")).await;
    assert_eq!(body["corridor"]["warningCount"], 1);
    assert_eq!(body["boat"]["incidents"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_polling_the_corridor_keeps_violations() {
    let app = app();
    let corridor = "/api/v1/boats/westerdok-1/corridor";
    fix(&app, 52.3851, 4.8947, json!("2024-08-03T12:00:00Z")).await;

    let (status, body) = send(&app, Method::GET, corridor, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["inCorridor"], true);

    let (_, body) = fix(&app, 52.3858, 4.8947, json!("2024-08-03T12:01:00Z")).await;
    assert_eq!(body["corridor"]["excursionStarted"], true);
    assert_eq!(body["boat"]["incidents"][0]["type"], "corridor-violation");

    for _ in 0..3 {
        let (_, body) = send(&app, Method::GET, corridor, None).await;
        assert_eq!(body["inCorridor"], false);
        assert_eq!(body["excursionStarted"], false);
        assert_eq!(body["warningCount"], 1);
    }

    fix(&app, 52.3851, 4.8947, json!("2024-08-03T12:02:00Z")).await;
    send(&app, Method::GET, corridor, None).await;
    let (_, body) = fix(&app, 52.3858, 4.8947, json!("2024-08-03T12:03:00Z")).await;
    assert_eq!(body["corridor"]["warningCount"], 2);
    assert_eq!(body["boat"]["incidents"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_status_commands() {
    let app = app();
    let (status, body) = send(&app, Method::PUT, "/api/v1/boats/amstel-7", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "waiting");

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/v1/boats/amstel-7/status",
        Some(json!({ "status": "finished" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/boats/amstel-7/status",
        Some(json!({ "status": "emergency", "metadata": "engine fire" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "emergency");
    assert_eq!(body["incidents"][0]["type"], "manual-emergency");
    assert_eq!(body["incidents"][0]["severity"], "critical");
}

#[tokio::test]
async fn test_critical_incident_escalates() {
    let app = app();
    send(&app, Method::PUT, "/api/v1/boats/amstel-7", None).await;

    let incident = json!({
        "type": "manual-emergency",
        "severity": "critical",
        "message": "man overboard",
    });
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/boats/amstel-7/incidents",
        Some(incident),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "emergency");

    let (_, body) = send(&app, Method::GET, "/api/v1/stats", None).await;
    assert_eq!(body["emergency"], 1);
    assert_eq!(body["totalIncidents"], 1);
}

#[tokio::test]
async fn test_unknown_boat() {
    let app = app();
    for uri in [
        "/api/v1/boats/ghost",
        "/api/v1/boats/ghost/corridor",
        "/api/v1/boats/ghost/incidents/check",
    ] {
        let (status, _) = send(&app, Method::GET, uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{}", uri);
    }

    let (status, body) = send(&app, Method::GET, "/api/v1/boats/ghost/history", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalItems"], 0);

    let (status, _) = send(&app, Method::DELETE, "/api/v1/boats/ghost", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_clear_boat() {
    let app = app();
    send(&app, Method::PUT, "/api/v1/boats/amstel-7", None).await;

    let (status, _) = send(&app, Method::DELETE, "/api/v1/boats/amstel-7", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, Method::GET, "/api/v1/boats/amstel-7", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_route_and_schema() {
    let app = app();
    let (status, body) = send(&app, Method::GET, "/api/v1/route", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalDistanceMeters"], 4200.0);
    assert_eq!(body["points"].as_array().unwrap().len(), 14);

    let (status, _) = send(&app, Method::GET, "/api/v1/boats/schema", None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_unknown_route() {
    let (status, body) = send(&app(), Method::GET, "/api/v1/nothing", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["requestedUri"], "/api/v1/nothing");
}
