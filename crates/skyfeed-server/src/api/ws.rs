//! WebSocket streaming of snapshots and routes.
//!
//! Viewers never touch the window. In snapshot modes they forward the
//! latest published payload whenever it changes; in routes mode they
//! send the route set once and then keep the link alive with pings.

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use skyfeed_core::{SkyfeedError, StreamMessage};
use thiserror::Error;
use tokio::time::{interval_at, Instant};

use crate::state::AppState;

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("send failed: {0}")]
    Send(#[from] axum::Error),
    #[error("encode failed: {0}")]
    Encode(#[from] SkyfeedError),
}

/// Handler for WebSocket connections.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> axum::response::Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
        .into_response()
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let viewer_id = state.register_viewer();
    tracing::info!(
        "Viewer {} connected ({} active)",
        viewer_id,
        state.viewer_count()
    );

    let result = match state.routes_payload() {
        Some(payload) => stream_routes(socket, &state, payload).await,
        None => stream_snapshots(socket, &state).await,
    };
    if let Err(e) = result {
        tracing::debug!("Viewer {} stream ended: {}", viewer_id, e);
    }

    state.unregister_viewer(&viewer_id);
    tracing::info!(
        "Viewer {} disconnected ({} active)",
        viewer_id,
        state.viewer_count()
    );
}

async fn stream_snapshots(mut socket: WebSocket, state: &AppState) -> Result<(), DeliveryError> {
    let mut rx = state.subscribe_snapshots();
    let mut shutdown = state.shutdown_receiver();

    let current = rx.borrow_and_update().clone();
    socket.send(Message::Text(current.as_ref().to_owned())).await?;

    loop {
        tokio::select! {
            incoming = socket.recv() => {
                if !handle_incoming(&mut socket, incoming).await? {
                    break;
                }
            }
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let payload = rx.borrow_and_update().clone();
                socket.send(Message::Text(payload.as_ref().to_owned())).await?;
            }
            _ = shutdown.recv() => {
                let _ = socket.send(Message::Close(None)).await;
                break;
            }
        }
    }
    Ok(())
}

async fn stream_routes(
    mut socket: WebSocket,
    state: &AppState,
    payload: Arc<str>,
) -> Result<(), DeliveryError> {
    let mut shutdown = state.shutdown_receiver();
    let ping = StreamMessage::Ping.to_json()?;

    socket.send(Message::Text(payload.as_ref().to_owned())).await?;

    let period = state.config().ping_interval();
    let mut ticker = interval_at(Instant::now() + period, period);

    loop {
        tokio::select! {
            incoming = socket.recv() => {
                if !handle_incoming(&mut socket, incoming).await? {
                    break;
                }
            }
            _ = ticker.tick() => {
                socket.send(Message::Text(ping.clone())).await?;
            }
            _ = shutdown.recv() => {
                let _ = socket.send(Message::Close(None)).await;
                break;
            }
        }
    }
    Ok(())
}

/// Returns false once the client has gone away.
async fn handle_incoming(
    socket: &mut WebSocket,
    incoming: Option<Result<Message, axum::Error>>,
) -> Result<bool, DeliveryError> {
    match incoming {
        Some(Ok(Message::Ping(payload))) => {
            socket.send(Message::Pong(payload)).await?;
            Ok(true)
        }
        Some(Ok(Message::Close(_))) => Ok(false),
        // Viewers are receive-only; anything else is ignored.
        Some(Ok(_)) => Ok(true),
        Some(Err(_)) | None => Ok(false),
    }
}
