//! WebSocket viewer endpoint.
//!
//! Each connection subscribes to one room's hub channel and receives every
//! payload published to that room as a text frame.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, State,
    },
    http::StatusCode,
    response::IntoResponse,
};
use futures::{sink::SinkExt, stream::StreamExt};
use tracing::{debug, info};

use crate::routes::api_error;
use crate::state::AppState;

/// WebSocket upgrade handler for `/api/ws/{room_id}`.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Path(room_id): Path<String>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    parley_core::room::get_room(&state.db, &room_id)
        .await
        .map_err(api_error)?;

    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, room_id)))
}

/// Pump one viewer until either side goes away.
async fn handle_socket(socket: WebSocket, state: AppState, room_id: String) {
    let (mut sender, mut receiver) = socket.split();
    let mut subscriber = state.hub.subscribe(&room_id).await;
    let key = subscriber.key();

    let viewers = state.hub.subscriber_count(&room_id).await;
    info!(room_id = %room_id, subscriber_id = key.id, viewers, "Viewer connected");

    // Forward hub payloads to this client
    let mut send_task = tokio::spawn(async move {
        while let Some(payload) = subscriber.recv().await {
            let text = String::from_utf8_lossy(&payload).into_owned();
            if sender.send(Message::Text(text.into())).await.is_err() {
                debug!("WebSocket send failed, client disconnected");
                break;
            }
        }
        let _ = sender.close().await;
    });

    // Viewers only listen; drain until the client closes
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            match msg {
                Message::Close(_) => {
                    debug!("WebSocket client sent close frame");
                    break;
                }
                Message::Text(text) => debug!(len = text.len(), "Ignoring viewer text frame"),
                _ => {}
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    state.hub.unsubscribe(&key).await;
    info!(room_id = %room_id, subscriber_id = key.id, "Viewer disconnected");
}
