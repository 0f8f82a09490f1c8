//! WebSocket handler
//!
//! Upgrades connections and pumps frames between the socket and the bus.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Query, State, WebSocketUpgrade};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use blog_bus::{outbound_queue, ConnectionId};
use blog_common::ErrorResponse;
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::time::interval;

use crate::connection::{Connection, ConnectionState};
use crate::handlers::MessageDispatcher;
use crate::identity::{resolve_identity, token_from_headers};
use crate::protocol::{comment_error, events, node_info};
use crate::server::GatewayState;

/// Upgrade query parameters
#[derive(Debug, Default, Deserialize)]
pub struct ConnectQuery {
    /// Identity token for clients that cannot set headers
    pub token: Option<String>,
}

/// WebSocket gateway handler
///
/// The identity is resolved once, before the upgrade. A present but invalid
/// token is refused; no token connects anonymously.
pub async fn gateway_handler(
    State(state): State<GatewayState>,
    Query(query): Query<ConnectQuery>,
    headers: HeaderMap,
    ws: WebSocketUpgrade,
) -> Response {
    let token = query
        .token
        .filter(|t| !t.trim().is_empty())
        .or_else(|| token_from_headers(&headers));

    let identity = match resolve_identity(state.jwt_service(), token.as_deref()) {
        Ok(identity) => identity,
        Err(e) => {
            tracing::debug!(error = %e, "Refusing realtime connection");
            let status =
                StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::UNAUTHORIZED);
            return (status, Json(ErrorResponse::from(&e))).into_response();
        }
    };

    ws.on_upgrade(move |socket| {
        handle_socket(state, Connection::new(ConnectionId::generate(), identity), socket)
    })
}

/// Drive an upgraded connection until either side goes away
async fn handle_socket(state: GatewayState, connection: Arc<Connection>, socket: WebSocket) {
    let connection_id = connection.id();
    let (tx, mut rx) = outbound_queue();
    state.bus().register(connection_id, tx);

    tracing::info!(
        connection_id = %connection_id,
        authenticated = connection.identity().is_authenticated(),
        "Realtime connection established"
    );

    let (mut ws_sink, mut ws_stream) = socket.split();

    // node_info is always the first frame
    let hello = node_info(state.bus().node_id().as_str(), &state.settings().version);
    match serde_json::to_string(&hello) {
        Ok(json) => {
            if ws_sink.send(Message::Text(json)).await.is_err() {
                tracing::warn!(connection_id = %connection_id, "Failed to send node_info");
                cleanup_connection(&state, &connection).await;
                return;
            }
        }
        Err(e) => tracing::warn!(error = %e, "Failed to serialize node_info"),
    }

    let state_recv = state.clone();
    let connection_recv = connection.clone();

    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = ws_stream.next().await {
            match msg {
                Ok(Message::Text(text)) => {
                    connection_recv.touch();
                    if let Err(e) =
                        MessageDispatcher::dispatch_text(&state_recv, &connection_recv, &text).await
                    {
                        state_recv
                            .bus()
                            .send_to(connection_recv.id(), e.into_event());
                    }
                }
                Ok(Message::Binary(_)) => {
                    connection_recv.touch();
                    state_recv.bus().send_to(
                        connection_recv.id(),
                        comment_error("Binary frames are not supported", events::INVALID_MESSAGE),
                    );
                }
                Ok(Message::Ping(_) | Message::Pong(_)) => connection_recv.touch(),
                Ok(Message::Close(_)) => {
                    tracing::info!(connection_id = %connection_recv.id(), "Client closed connection");
                    break;
                }
                Err(e) => {
                    tracing::debug!(connection_id = %connection_recv.id(), error = %e, "WebSocket error");
                    break;
                }
            }
        }
    });

    let ping_interval = state.settings().ping_period();

    let mut send_task = tokio::spawn(async move {
        let mut ping = interval(ping_interval);
        ping.tick().await;

        loop {
            tokio::select! {
                event = rx.recv() => {
                    let Some(event) = event else { break };
                    let json = match serde_json::to_string(&*event) {
                        Ok(json) => json,
                        Err(e) => {
                            tracing::warn!(event = %event.event, error = %e, "Failed to serialize event");
                            continue;
                        }
                    };
                    if ws_sink.send(Message::Text(json)).await.is_err() {
                        break;
                    }
                }
                _ = ping.tick() => {
                    if ws_sink.send(Message::Ping(Vec::new())).await.is_err() {
                        break;
                    }
                }
            }
        }

        let _ = ws_sink.close().await;
    });

    let connection_idle = connection.clone();
    let idle_timeout = state.settings().idle_timeout;
    let idle_check = state.settings().idle_check_period();

    let mut idle_task = tokio::spawn(async move {
        let mut check = interval(idle_check);
        loop {
            check.tick().await;
            let idle = connection_idle.idle_for();
            if idle > idle_timeout {
                tracing::info!(
                    connection_id = %connection_idle.id(),
                    idle_ms = idle.as_millis(),
                    "Connection idle, closing"
                );
                break;
            }
        }
    });

    tokio::select! {
        _ = &mut recv_task => {
            tracing::debug!(connection_id = %connection_id, "Receive task ended");
        }
        _ = &mut send_task => {
            tracing::debug!(connection_id = %connection_id, "Send task ended");
        }
        _ = &mut idle_task => {
            tracing::debug!(connection_id = %connection_id, "Idle task ended");
        }
    }

    recv_task.abort();
    send_task.abort();
    idle_task.abort();

    cleanup_connection(&state, &connection).await;
}

/// Leave every room and drop the outbound queue
async fn cleanup_connection(state: &GatewayState, connection: &Arc<Connection>) {
    connection.set_state(ConnectionState::Disconnected);

    let rooms = state.bus().disconnect(connection.id()).await;

    tracing::info!(
        connection_id = %connection.id(),
        rooms = rooms.len(),
        duration_ms = connection.age().as_millis(),
        "Realtime connection closed"
    );
}
