use std::collections::HashMap;
use std::sync::Arc;

use airbot_core::model::{RoomMap, seed_rooms};
use airbot_core::normalize::{Drift, initial_score, perturb};
use airbot_core::store::RoomStore;
use axum::Json;
use axum::extract::State;
use axum::response::Html;
use chrono::Utc;
use tokio::sync::Mutex;

pub struct AppState {
    pub store: RoomStore,
    /// Synthetic air-quality score per room, drifting alongside the
    /// numeric fields so the category tracks a signal.
    scores: Mutex<HashMap<String, f64>>,
    drift: Drift,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(drift: Drift) -> Self {
        let rooms = seed_rooms();
        let scores = rooms
            .iter()
            .map(|(id, reading)| (id.clone(), initial_score(reading.air)))
            .collect();
        Self {
            store: RoomStore::new(rooms),
            scores: Mutex::new(scores),
            drift,
        }
    }
}

static PAGE: &str = include_str!("../static/index.html");

pub async fn index() -> Html<&'static str> {
    Html(PAGE)
}

/// Run the mock drift pass over every room, then return the whole map.
/// No sensors back this variant; the drift keeps the dashboard alive.
pub async fn rooms(State(state): State<SharedState>) -> Json<RoomMap> {
    let now = Utc::now().timestamp();
    let mut scores = state.scores.lock().await;
    state
        .store
        .update_with(|rooms| {
            let mut rng = rand::thread_rng();
            for (id, reading) in rooms.iter_mut() {
                let score = scores.get(id).copied().unwrap_or(0.0);
                let (next, next_score) = perturb(reading, score, &mut rng, &state.drift, now);
                *reading = next;
                scores.insert(id.clone(), next_score);
            }
        })
        .await;
    Json(state.store.get_all().await)
}
