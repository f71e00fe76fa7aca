use std::sync::Arc;

use airbot_core::normalize::{Drift, round1};
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use mock_rooms::{build_router, handlers::AppState};
use serde_json::Value;
use tower::util::ServiceExt; // for `oneshot`

fn app(drift: Drift) -> Router {
    build_router(Arc::new(AppState::new(drift)))
}

async fn get_rooms(app: &Router) -> Value {
    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/rooms")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = to_bytes(resp.into_body(), 256 * 1024).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn healthz_ok() {
    let app = app(Drift::default());
    let resp = app
        .oneshot(
            Request::builder()
                .uri("/healthz")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn index_serves_dashboard_page() {
    let app = app(Drift::default());
    let resp = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let content_type = resp
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();
    assert!(content_type.starts_with("text/html"));
    let body = to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
    let page = String::from_utf8(body.to_vec()).unwrap();
    assert!(page.contains("room-grid"));
    assert!(page.contains("/api/rooms"));
}

#[tokio::test]
async fn rooms_returns_every_seeded_room_normalized() {
    let app = app(Drift::default());
    let rooms = get_rooms(&app).await;
    let rooms = rooms.as_object().unwrap();

    assert_eq!(rooms.len(), 4);
    for id in ["ROOM1", "ROOM2", "ROOM3", "LIVING"] {
        assert!(rooms.contains_key(id), "missing {id}");
    }
    assert_eq!(rooms["LIVING"]["name"], "거실");

    for (id, room) in rooms {
        let air = room["air"].as_str().unwrap();
        assert!(
            ["좋음", "보통", "나쁨"].contains(&air),
            "{id} has unexpected air label {air}"
        );
        for field in ["temp", "humidity"] {
            let value = room[field].as_f64().unwrap();
            assert_eq!(value, round1(value), "{id}.{field} not one-decimal");
        }
        assert!(room["updated_at"].as_i64().unwrap() > 0);
    }
}

#[tokio::test]
async fn zero_drift_keeps_numeric_fields_stable() {
    let zero = Drift {
        temp: 0.0,
        humidity: 0.0,
        score: 0.0,
    };
    let app = app(zero);

    let first = get_rooms(&app).await;
    let second = get_rooms(&app).await;

    assert_eq!(first["ROOM1"]["temp"], second["ROOM1"]["temp"]);
    assert_eq!(second["ROOM1"]["temp"].as_f64().unwrap(), 24.0);
    assert_eq!(second["ROOM3"]["temp"].as_f64().unwrap(), 23.5);
    assert_eq!(second["LIVING"]["humidity"].as_f64().unwrap(), 45.0);
    // category is pinned too, since the synthetic score cannot move
    assert_eq!(second["LIVING"]["air"], "나쁨");
}
