use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use dashmap::DashMap;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use uuid::Uuid;

use crate::protocol::{parse_inbound, ServerEvent};
use crate::session::{run_session, INBOUND_QUEUE_DEPTH};
use crate::state::{ConnectedSession, RelayState, SessionId};

/// Largest chat message accepted from a client, in bytes.
pub const MAX_MESSAGE_BYTES: usize = 16 * 1024;

/// Registers a socket in the connection map and tears it down on drop,
/// even if the handler panics or the task is cancelled at shutdown.
/// Dropping also cancels the session token, which discards any pending
/// clear and abandons an in-flight classifier call.
struct ConnectionGuard {
    session_id: SessionId,
    connections: Arc<DashMap<SessionId, ConnectedSession>>,
    cancel: CancellationToken,
}

impl ConnectionGuard {
    fn register(state: &RelayState, session_id: SessionId, cancel: CancellationToken) -> Self {
        state.connections.insert(
            session_id,
            ConnectedSession {
                session_id,
                connected_at: Instant::now(),
            },
        );
        Self {
            session_id,
            connections: state.connections.clone(),
            cancel,
        }
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.cancel.cancel();
        if let Some((_, conn)) = self.connections.remove(&self.session_id) {
            info!(
                session_id = %conn.session_id,
                connected_secs = conn.connected_at.elapsed().as_secs(),
                "user disconnected"
            );
        }
    }
}

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<RelayState>,
) -> impl IntoResponse {
    ws.max_message_size(MAX_MESSAGE_BYTES)
        .max_frame_size(MAX_MESSAGE_BYTES)
        .on_upgrade(|socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: RelayState) {
    let session_id = Uuid::new_v4();
    let cancel = CancellationToken::new();
    let _guard = ConnectionGuard::register(&state, session_id, cancel.clone());
    info!(%session_id, "user connected");

    let (mut sink, mut stream) = socket.split();

    // Outbound: serialize queued events onto the socket
    let (out_tx, mut out_rx) = mpsc::unbounded_channel::<ServerEvent>();
    let out_cancel = cancel.clone();
    let forward_task = tokio::spawn(async move {
        while let Some(event) = out_rx.recv().await {
            let json = match serde_json::to_string(&event) {
                Ok(json) => json,
                Err(e) => {
                    warn!(%session_id, error = %e, "failed to encode server event");
                    continue;
                }
            };
            if sink.send(Message::Text(json.into())).await.is_err() {
                break;
            }
        }
        out_cancel.cancel();
    });

    // Inbound: decode frames, hand messages to the session in order.
    // A full queue stops socket reads until the session catches up.
    let (in_tx, in_rx) = mpsc::channel::<String>(INBOUND_QUEUE_DEPTH);
    let in_cancel = cancel.clone();
    let read_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = stream.next().await {
            match msg {
                Message::Text(raw) => {
                    if in_tx.send(parse_inbound(raw.as_str())).await.is_err() {
                        break;
                    }
                }
                Message::Ping(_) => {
                    // Pong is handled automatically by axum
                }
                Message::Close(_) => break,
                _ => {}
            }
        }
        in_cancel.cancel();
    });

    run_session(state, session_id, in_rx, out_tx, cancel).await;

    read_task.abort();
    forward_task.abort();
}
