use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::response::Response;
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::api::response::ApiError;
use crate::realtime::{self, Change};
use crate::AppState;

/// Subscribe to the change feed for one table.
/// Route: GET /subscribe/:table (WebSocket)
///
/// Each connection gets its own broadcast receiver; closing the socket drops
/// the receiver, so a page navigating away cannot leak a subscription.
pub async fn subscribe(
    State(state): State<Arc<AppState>>,
    Path(table): Path<String>,
    ws: WebSocketUpgrade,
) -> Result<Response, ApiError> {
    if !realtime::TABLES.contains(&table.as_str()) {
        return Err(ApiError::not_found(format!("unknown table '{table}'")));
    }

    let rx = state.feed.subscribe();
    Ok(ws.on_upgrade(move |socket| stream_changes(socket, rx, table)))
}

async fn stream_changes(
    mut socket: WebSocket,
    mut rx: broadcast::Receiver<Change>,
    table: String,
) {
    loop {
        tokio::select! {
            change = rx.recv() => match change {
                Ok(change) if change.table == table => {
                    let Ok(payload) = serde_json::to_string(&change) else {
                        break;
                    };
                    if socket.send(Message::Text(payload)).await.is_err() {
                        // Client gone
                        break;
                    }
                }
                Ok(_) => {
                    // Change on another table
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::debug!(table = %table, skipped, "subscriber lagged");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
            msg = socket.recv() => match msg {
                // Inbound frames are ignored; the feed is one-way
                Some(Ok(_)) => {}
                Some(Err(_)) | None => break,
            },
        }
    }
}
