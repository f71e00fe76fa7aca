use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use airbot_core::model::RoomMap;
use airbot_core::normalize::normalize_sensor;
use airbot_core::store::RoomStore;
use axum::Json;
use axum::extract::State;
use axum::response::Html;
use serde_json::json;

use crate::relay::RelayConnector;
use crate::upstream::UpstreamClient;

pub struct AppState {
    pub store: RoomStore,
    pub upstream: UpstreamClient,
    pub relay: Arc<dyn RelayConnector>,
    pub upstream_failures: AtomicU64,
}

pub type SharedState = Arc<AppState>;

static PAGE: &str = include_str!("../static/index.html");

pub async fn index() -> Html<&'static str> {
    Html(PAGE)
}

/// Rebuild the store from whatever the upstream currently reports and
/// return the fresh snapshot. Rooms absent from the upstream response do
/// not appear. Any upstream failure degrades to an empty map; this call
/// never fails toward the browser.
pub async fn rooms(State(state): State<SharedState>) -> Json<RoomMap> {
    match state.upstream.fetch_sensors().await {
        Ok(records) => {
            let rooms: RoomMap = records.into_iter().map(normalize_sensor).collect();
            state.store.replace_all(rooms.clone()).await;
            Json(rooms)
        }
        Err(e) => {
            let failures = state.upstream_failures.fetch_add(1, Ordering::Relaxed) + 1;
            tracing::warn!(error = ?e, failures, "upstream fetch failed; serving empty room map");
            Json(RoomMap::new())
        }
    }
}

pub async fn healthz(State(state): State<SharedState>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "upstream_failures": state.upstream_failures.load(Ordering::Relaxed),
    }))
}
