//! WebSocket endpoint feeding the notification hub

use crate::hub::ClientHandle;
use crate::AppState;
use axum::{
    extract::ws::{Message, WebSocket, WebSocketUpgrade},
    extract::State,
    response::IntoResponse,
};
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::debug;
use uuid::Uuid;

const OUTBOUND_QUEUE: usize = 16;

pub async fn ws_handler(
    State(state): State<Arc<AppState>>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| client_session(state, socket))
}

/// One session per connected client: register with the hub, pump queued
/// notifications to the socket, unregister on any exit path.
async fn client_session(state: Arc<AppState>, socket: WebSocket) {
    let id = Uuid::new_v4();
    let (sender, mut outbound) = mpsc::channel::<String>(OUTBOUND_QUEUE);
    state.hub.register(ClientHandle { id, sender }).await;

    let (mut sink, mut stream) = socket.split();

    loop {
        tokio::select! {
            queued = outbound.recv() => {
                match queued {
                    Some(payload) => {
                        if sink.send(Message::Text(payload)).await.is_err() {
                            break;
                        }
                    }
                    // Hub dropped us (failed delivery)
                    None => break,
                }
            }
            incoming = stream.next() => {
                match incoming {
                    // Clients only ping; payloads are ignored
                    Some(Ok(_)) => {}
                    Some(Err(_)) | None => break,
                }
            }
        }
    }

    state.hub.unregister(id).await;
    debug!("WebSocket session {} closed", id);
}
