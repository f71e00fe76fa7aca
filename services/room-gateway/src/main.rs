use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::AtomicU64;
use std::time::Duration;

use airbot_core::model::RoomMap;
use airbot_core::store::RoomStore;
use anyhow::{Context, Result};
use room_gateway::build_router;
use room_gateway::handlers::AppState;
use room_gateway::relay::UpstreamRelay;
use room_gateway::upstream::UpstreamClient;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn read_env(key: &str, default: &str) -> String {
    match std::env::var(key) {
        Ok(value) if !value.trim().is_empty() => value.trim().to_string(),
        _ => default.to_string(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into());
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(filter))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let host = read_env("GATEWAY_HOST", "0.0.0.0");
    let port: u16 = std::env::var("GATEWAY_PORT")
        .or_else(|_| std::env::var("PORT"))
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(8090);
    let upstream_base = read_env("UPSTREAM_BASE", "http://raspberrypi:5000");
    let timeout_ms: u64 = read_env("UPSTREAM_TIMEOUT_MS", "2000").parse().unwrap_or(2000);

    let upstream = UpstreamClient::new(&upstream_base, Duration::from_millis(timeout_ms))
        .context("configure upstream client")?;
    let relay = UpstreamRelay::new(&upstream_base);
    tracing::info!("upstream -> {upstream_base} (timeout {timeout_ms}ms)");

    let state = Arc::new(AppState {
        store: RoomStore::new(RoomMap::new()),
        upstream,
        relay: Arc::new(relay),
        upstream_failures: AtomicU64::new(0),
    });
    let app = build_router(state);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    tracing::info!("room-gateway listening on http://{addr}");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("room-gateway shutdown complete");
    Ok(())
}

#[cfg(unix)]
async fn shutdown_signal() {
    use tokio::signal::unix::{SignalKind, signal};
    let mut sigint = signal(SignalKind::interrupt()).expect("listen SIGINT");
    let mut sigterm = signal(SignalKind::terminate()).expect("listen SIGTERM");
    tokio::select! {
        _ = sigint.recv() => {},
        _ = sigterm.recv() => {},
    }
    tracing::info!("shutdown signal received");
}

#[cfg(not(unix))]
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to install Ctrl+C handler");
    tracing::info!("shutdown signal received");
}
