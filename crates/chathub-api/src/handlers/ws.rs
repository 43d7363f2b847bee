//! WebSocket upgrade handler.

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Query, State, WebSocketUpgrade};
use axum::response::Response;
use futures::{SinkExt, StreamExt};
use tracing::{info, warn};

use chathub_core::AppError;
use chathub_realtime::OutboundEvent;

use crate::error::ApiError;
use crate::state::AppState;

/// Query parameters for WebSocket authentication.
#[derive(Debug, serde::Deserialize)]
pub struct WsQuery {
    /// Connection token (the user's identifier).
    pub token: String,
}

/// GET /ws?token={token} — WebSocket upgrade
///
/// Obviously bad tokens are rejected before the upgrade; full token
/// resolution happens during connection setup, which reports failures
/// with a `setup-error` frame.
pub async fn ws_upgrade(
    State(state): State<AppState>,
    ws: WebSocketUpgrade,
    Query(query): Query<WsQuery>,
) -> Result<Response, ApiError> {
    if query.token.trim().is_empty() {
        return Err(AppError::authentication("Missing connection token").into());
    }
    Ok(ws.on_upgrade(move |socket| handle_ws_connection(state, query.token, socket)))
}

/// Drives one established WebSocket connection.
///
/// Registers the connection with the engine, forwards queued outbound
/// events onto the wire, and feeds inbound text frames back into the
/// engine until the socket closes.
async fn handle_ws_connection(state: AppState, token: String, socket: WebSocket) {
    let (mut ws_tx, mut ws_rx) = socket.split();

    let (handle, mut outbound_rx) = match state.engine.connect(&token).await {
        Ok(pair) => pair,
        Err(err) => {
            warn!(error = %err, "WebSocket setup rejected");
            let frame = OutboundEvent::SetupError {
                message: err.message,
            };
            if let Ok(json) = serde_json::to_string(&frame) {
                let _ = ws_tx.send(Message::Text(json.into())).await;
            }
            let _ = ws_tx.close().await;
            return;
        }
    };

    let conn_id = handle.id;
    info!(
        conn_id = %conn_id,
        user_id = %handle.user_id,
        "WebSocket connection established"
    );

    // Forward queued outbound events onto the wire.
    let outbound_task = tokio::spawn(async move {
        while let Some(event) = outbound_rx.recv().await {
            let json = match serde_json::to_string(&event) {
                Ok(json) => json,
                Err(err) => {
                    warn!(conn_id = %conn_id, error = %err, "Failed to encode outbound event");
                    continue;
                }
            };
            if ws_tx.send(Message::Text(json.into())).await.is_err() {
                break;
            }
        }
        // The engine closed the queue (e.g. this connection was evicted):
        // shut the socket down after the final events were flushed.
        let _ = ws_tx.close().await;
    });

    // Process inbound frames.
    while let Some(result) = ws_rx.next().await {
        match result {
            Ok(Message::Text(text)) => {
                state.engine.handle_raw(&handle, &text).await;
            }
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(err) => {
                warn!(conn_id = %conn_id, error = %err, "WebSocket error");
                break;
            }
        }
    }

    outbound_task.abort();
    state.engine.disconnect(&conn_id);

    info!(
        conn_id = %conn_id,
        user_id = %handle.user_id,
        "WebSocket connection closed"
    );
}
