//! WebSocket upgrade handler and per-connection socket loop.

use std::time::Duration;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::Response;
use futures::{SinkExt, StreamExt};
use tracing::{debug, info, warn};

use nightingale_core::error::AppError;
use nightingale_entity::student::Student;
use nightingale_entity::user::UserRole;
use nightingale_realtime::message::{InboundMessage, OutboundMessage};

use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::SharedState;

/// GET /ws?token={jwt} — authenticate, then upgrade.
///
/// The bearer token travels as a query parameter because browsers
/// cannot set headers on WebSocket handshakes.
pub async fn ws_handler(
    State(state): State<SharedState>,
    auth: AuthUser,
    ws: WebSocketUpgrade,
) -> Result<Response, ApiError> {
    // Student sessions auto-join their course and batch rooms.
    let student = if auth.role == UserRole::Student {
        state.students.find_by_user(auth.user_id).await?
    } else {
        None
    };

    Ok(ws.on_upgrade(move |socket| handle_connection(state, auth, student, socket)))
}

async fn handle_connection(
    state: SharedState,
    auth: AuthUser,
    student: Option<Student>,
    socket: WebSocket,
) {
    let (handle, mut outbound_rx) =
        match state.realtime.connect(auth.user_id, auth.role, student.as_ref()) {
            Ok(pair) => pair,
            Err(e) => {
                warn!(user_id = %auth.user_id, error = %e, "rejecting WebSocket session");
                let _ = close_with_error(socket, &e.message).await;
                return;
            }
        };

    let conn_id = handle.id;
    info!(connection_id = %conn_id, user_id = %auth.user_id, "WebSocket session established");

    let (mut ws_tx, mut ws_rx) = socket.split();
    let ping_interval = Duration::from_secs(state.realtime.config().ping_interval_seconds);
    let mut ping = tokio::time::interval(ping_interval);
    ping.tick().await; // first tick fires immediately
    let mut shutdown = state.realtime.shutdown_receiver();

    loop {
        tokio::select! {
            outbound = outbound_rx.recv() => {
                let Some(msg) = outbound else { break };
                if let Err(e) = send_json(&mut ws_tx, &msg).await {
                    debug!(connection_id = %conn_id, error = %e, "outbound push failed");
                    break;
                }
            }
            inbound = ws_rx.next() => {
                match inbound {
                    Some(Ok(Message::Text(text))) => {
                        if let Some(reply) = handle_inbound(&state, &handle, text.as_str()) {
                            if let Err(e) = send_json(&mut ws_tx, &reply).await {
                                debug!(connection_id = %conn_id, error = %e, "reply push failed");
                                break;
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        warn!(connection_id = %conn_id, error = %e, "WebSocket error");
                        break;
                    }
                }
            }
            _ = ping.tick() => {
                let msg = OutboundMessage::Ping { timestamp: chrono::Utc::now().timestamp() };
                if let Err(e) = send_json(&mut ws_tx, &msg).await {
                    debug!(connection_id = %conn_id, error = %e, "ping push failed");
                    break;
                }
            }
            _ = shutdown.recv() => break,
        }
    }

    state.realtime.disconnect(conn_id);
    info!(connection_id = %conn_id, user_id = %auth.user_id, "WebSocket session closed");
}

/// Process one inbound client message, returning an optional reply.
fn handle_inbound(
    state: &SharedState,
    handle: &nightingale_realtime::connection::ConnectionHandle,
    text: &str,
) -> Option<OutboundMessage> {
    let msg: InboundMessage = match serde_json::from_str(text) {
        Ok(msg) => msg,
        Err(_) => {
            return Some(OutboundMessage::Error {
                code: "BAD_MESSAGE".to_string(),
                message: "Unrecognized message".to_string(),
            });
        }
    };

    match msg {
        InboundMessage::Subscribe { room } => match state.realtime.subscribe(handle, &room) {
            Ok(()) => Some(OutboundMessage::Subscribed { room }),
            Err(e) => Some(OutboundMessage::Error {
                code: "FORBIDDEN".to_string(),
                message: e.message,
            }),
        },
        InboundMessage::Unsubscribe { room } => {
            state.realtime.unsubscribe(handle, &room);
            Some(OutboundMessage::Unsubscribed { room })
        }
        InboundMessage::Pong { timestamp } => {
            debug!(connection_id = %handle.id, timestamp, "pong received");
            None
        }
    }
}

/// Serialize and push one outbound message. A failed push is a
/// transport error the caller logs and swallows; the persisted record
/// remains the source of truth for the recipient.
async fn send_json<S>(ws_tx: &mut S, msg: &OutboundMessage) -> Result<(), AppError>
where
    S: SinkExt<Message> + Unpin,
{
    let text = serde_json::to_string(msg)?;
    ws_tx
        .send(Message::Text(text.into()))
        .await
        .map_err(|_| AppError::transport("WebSocket send failed"))
}

async fn close_with_error(mut socket: WebSocket, message: &str) -> Result<(), axum::Error> {
    let payload = OutboundMessage::Error {
        code: "CONNECTION_REJECTED".to_string(),
        message: message.to_string(),
    };
    if let Ok(text) = serde_json::to_string(&payload) {
        socket.send(Message::Text(text.into())).await?;
    }
    socket.close().await
}
