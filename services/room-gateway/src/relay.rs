//! Pass-through relays for the vehicle's real-time channels.
//!
//! The gateway interprets neither channel: video frames flow from the
//! upstream device to the browser, control tokens the other way, one
//! message at a time, fire-and-forget. The capability traits keep the
//! transports swappable; tests substitute channel-backed fakes for the
//! WebSocket client.

use anyhow::{Context, Result};
use async_trait::async_trait;
use axum::extract::{State, WebSocketUpgrade};
use axum::extract::ws::{Message, WebSocket};
use axum::response::Response;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use crate::handlers::SharedState;

/// One opaque frame from the video channel. The gateway never decodes it.
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    Text(String),
    Binary(Vec<u8>),
}

/// Delivers opaque frames for display.
#[async_trait]
pub trait FrameSource: Send {
    /// Next frame, or `None` once the channel is closed.
    async fn next_frame(&mut self) -> Option<Frame>;
}

/// Accepts single-token commands for forwarding. At-most-once: a failed
/// send is reported, never buffered or retried.
#[async_trait]
pub trait CommandSink: Send {
    async fn send_command(&mut self, token: String) -> Result<()>;
}

/// Opens the two relay channels toward the upstream device.
#[async_trait]
pub trait RelayConnector: Send + Sync {
    async fn open_video(&self) -> Result<Box<dyn FrameSource>>;
    async fn open_control(&self) -> Result<Box<dyn CommandSink>>;
}

/// Production connector: dials the upstream WebSocket endpoints derived
/// from the service base URL.
pub struct UpstreamRelay {
    video_url: String,
    control_url: String,
}

impl UpstreamRelay {
    pub fn new(base: &str) -> Self {
        let ws_base = ws_base(base);
        Self {
            video_url: format!("{ws_base}/ws/video"),
            control_url: format!("{ws_base}/ws/control"),
        }
    }
}

fn ws_base(base: &str) -> String {
    let trimmed = base.trim_end_matches('/');
    if let Some(rest) = trimmed.strip_prefix("https://") {
        format!("wss://{rest}")
    } else if let Some(rest) = trimmed.strip_prefix("http://") {
        format!("ws://{rest}")
    } else if trimmed.starts_with("ws://") || trimmed.starts_with("wss://") {
        trimmed.to_string()
    } else {
        format!("ws://{trimmed}")
    }
}

type UpstreamSocket = WebSocketStream<MaybeTlsStream<TcpStream>>;

struct WsFrameSource {
    stream: UpstreamSocket,
}

#[async_trait]
impl FrameSource for WsFrameSource {
    async fn next_frame(&mut self) -> Option<Frame> {
        while let Some(message) = self.stream.next().await {
            match message {
                Ok(WsMessage::Text(text)) => return Some(Frame::Text(text.to_string())),
                Ok(WsMessage::Binary(data)) => return Some(Frame::Binary(data.to_vec())),
                Ok(WsMessage::Close(_)) | Err(_) => return None,
                // ping/pong handled by tungstenite itself
                Ok(_) => continue,
            }
        }
        None
    }
}

struct WsCommandSink {
    stream: UpstreamSocket,
}

#[async_trait]
impl CommandSink for WsCommandSink {
    async fn send_command(&mut self, token: String) -> Result<()> {
        self.stream
            .send(WsMessage::Text(token.into()))
            .await
            .context("forward command to device channel")
    }
}

#[async_trait]
impl RelayConnector for UpstreamRelay {
    async fn open_video(&self) -> Result<Box<dyn FrameSource>> {
        let (stream, _) = connect_async(self.video_url.as_str())
            .await
            .with_context(|| format!("connect video channel at {}", self.video_url))?;
        Ok(Box::new(WsFrameSource { stream }))
    }

    async fn open_control(&self) -> Result<Box<dyn CommandSink>> {
        let (stream, _) = connect_async(self.control_url.as_str())
            .await
            .with_context(|| format!("connect control channel at {}", self.control_url))?;
        Ok(Box::new(WsCommandSink { stream }))
    }
}

pub async fn video(State(state): State<SharedState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| forward_video(socket, state))
}

pub async fn control(State(state): State<SharedState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| forward_control(socket, state))
}

/// Pump frames from the upstream channel to the browser until either
/// side closes.
async fn forward_video(mut socket: WebSocket, state: SharedState) {
    let mut source = match state.relay.open_video().await {
        Ok(source) => source,
        Err(e) => {
            tracing::warn!(error = ?e, "video channel unavailable");
            let _ = socket.send(Message::Close(None)).await;
            return;
        }
    };

    while let Some(frame) = source.next_frame().await {
        let message = match frame {
            Frame::Text(text) => Message::Text(text.into()),
            Frame::Binary(data) => Message::Binary(data.into()),
        };
        if socket.send(message).await.is_err() {
            // viewer went away; drop the upstream connection with it
            break;
        }
    }
    let _ = socket.send(Message::Close(None)).await;
}

/// Pump command tokens from the browser to the device channel, no
/// validation, no ack.
async fn forward_control(mut socket: WebSocket, state: SharedState) {
    let mut sink = match state.relay.open_control().await {
        Ok(sink) => sink,
        Err(e) => {
            tracing::warn!(error = ?e, "control channel unavailable");
            let _ = socket.send(Message::Close(None)).await;
            return;
        }
    };

    while let Some(Ok(message)) = socket.recv().await {
        match message {
            Message::Text(token) => {
                if let Err(e) = sink.send_command(token.to_string()).await {
                    tracing::warn!(error = ?e, "device channel dropped");
                    break;
                }
            }
            Message::Close(_) => break,
            _ => {}
        }
    }
}
