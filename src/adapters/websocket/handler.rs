//! WebSocket upgrade handler for gateway connections.
//!
//! Handles the HTTP → WebSocket upgrade and manages the connection lifecycle:
//! 1. Create the outbound queue and open an unauthenticated session
//! 2. Spawn the writer task (queued frames plus periodic pings)
//! 3. Feed inbound text frames to the gateway until disconnect or idle timeout
//! 4. Close the session, releasing its registry entry, then stop the writer

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{
        ws::{close_code, CloseFrame, Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::{IntoResponse, Json, Response},
};
use futures::{
    stream::{SplitSink, StreamExt},
    SinkExt,
};
use serde_json::json;
use tokio::time::{interval, timeout, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::application::Gateway;
use crate::config::GatewayConfig;
use crate::ports::{ConnectionHandle, ConnectionId};

use super::connection::{OutboundCommand, OutboundQueue, WsConnection};

/// State shared by every connection.
#[derive(Clone)]
pub struct GatewayState {
    pub gateway: Arc<Gateway>,
    pub config: Arc<GatewayConfig>,
}

impl GatewayState {
    pub fn new(gateway: Arc<Gateway>, config: GatewayConfig) -> Self {
        Self {
            gateway,
            config: Arc::new(config),
        }
    }
}

/// Handle WebSocket upgrade requests.
///
/// Route: `GET {gateway.path}`. No authentication happens at upgrade time;
/// clients identify themselves with `LOGIN_USER` afterwards.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<GatewayState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Liveness check reporting the number of logged-in users.
pub async fn health(State(state): State<GatewayState>) -> impl IntoResponse {
    let online = state.gateway.connections().online_count().await;
    Json(json!({ "status": "ok", "online": online }))
}

/// Handle an established WebSocket connection until it ends.
async fn handle_socket(socket: WebSocket, state: GatewayState) {
    let (sink, mut stream) = socket.split();

    let (connection, queue) = WsConnection::channel(state.config.outbound_buffer);
    let connection_id = connection.id();
    let session = state.gateway.open_session(Arc::new(connection));
    info!(connection_id = %connection_id, "WebSocket connected");

    let mut writer = tokio::spawn(writer_task(
        sink,
        queue,
        state.config.ping_interval(),
        connection_id,
    ));

    let idle_timeout = state.config.idle_timeout();
    loop {
        let next = tokio::select! {
            _ = &mut writer => {
                debug!(connection_id = %connection_id, "Writer finished, dropping reader");
                break;
            }
            next = timeout(idle_timeout, stream.next()) => next,
        };

        let message = match next {
            Ok(Some(Ok(message))) => message,
            Ok(Some(Err(e))) => {
                debug!(connection_id = %connection_id, error = %e, "Receive error");
                break;
            }
            Ok(None) => {
                debug!(connection_id = %connection_id, "Stream ended");
                break;
            }
            Err(_) => {
                info!(
                    connection_id = %connection_id,
                    idle_secs = idle_timeout.as_secs(),
                    "Idle timeout, closing connection"
                );
                session.connection().close("idle timeout").await;
                break;
            }
        };

        match message {
            Message::Text(text) => {
                if let Err(e) = state.gateway.handle_and_reply(&session, &text).await {
                    warn!(connection_id = %connection_id, error = %e, "Frame rejected");
                }
            }
            Message::Binary(_) => {
                warn!(connection_id = %connection_id, "Received unsupported binary message");
            }
            Message::Ping(_) | Message::Pong(_) => {
                // Protocol keepalives; axum answers pings itself.
            }
            Message::Close(frame) => {
                debug!(connection_id = %connection_id, frame = ?frame, "Client sent close frame");
                break;
            }
        }
    }

    session.close().await;
    writer.abort();
    info!(connection_id = %connection_id, "WebSocket disconnected");
}

/// Drain the outbound queue into the socket, pinging on a fixed interval.
async fn writer_task(
    mut sink: SplitSink<WebSocket, Message>,
    mut queue: OutboundQueue,
    ping_every: Duration,
    connection_id: ConnectionId,
) {
    let mut ping = interval(ping_every);
    ping.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately.
    ping.tick().await;

    loop {
        tokio::select! {
            command = queue.next() => match command {
                Some(OutboundCommand::Frame(text)) => {
                    if let Err(e) = sink.send(Message::Text(text)).await {
                        debug!(connection_id = %connection_id, error = %e, "Send error");
                        break;
                    }
                }
                Some(OutboundCommand::Close(reason)) => {
                    debug!(connection_id = %connection_id, reason = %reason, "Closing connection");
                    let frame = CloseFrame {
                        code: close_code::NORMAL,
                        reason: reason.into(),
                    };
                    let _ = sink.send(Message::Close(Some(frame))).await;
                    break;
                }
                None => break,
            },
            _ = ping.tick() => {
                if let Err(e) = sink.send(Message::Ping(Vec::new())).await {
                    debug!(connection_id = %connection_id, error = %e, "Ping failed");
                    break;
                }
            }
        }
    }

    let _ = sink.close().await;
}
