use axum::{Router, routing::get};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

pub mod handlers;
pub mod relay;
pub mod types;
pub mod upstream;

use handlers::SharedState;

pub fn build_router(state: SharedState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/api/rooms", get(handlers::rooms))
        .route("/healthz", get(handlers::healthz))
        .route("/ws/video", get(relay::video))
        .route("/ws/control", get(relay::control))
        .with_state(state)
        .layer(
            TraceLayer::new_for_http().make_span_with(|req: &axum::http::Request<_>| {
                let request_id = req
                    .headers()
                    .get("x-request-id")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("-");
                tracing::info_span!(
                    "http",
                    %request_id,
                    method = %req.method(),
                    uri = %req.uri(),
                )
            }),
        )
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}
