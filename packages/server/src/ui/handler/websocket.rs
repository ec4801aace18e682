//! WebSocket connection handlers.

use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use tokio::sync::mpsc;

use crate::{
    domain::ConnectionId,
    ui::{session::Session, state::AppState},
};

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Spawns a task that receives messages from the rx channel and pushes them to the WebSocket sender.
///
/// Replies to this connection and broadcasts from other connections both arrive through `rx`.
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: futures_util::stream::SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(Message::Text(msg.into())).await.is_err() {
                break;
            }
        }
    })
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let connection_id = ConnectionId::generate();
    let (sender, mut receiver) = socket.split();
    let (tx, rx) = mpsc::unbounded_channel();

    let mut send_task = pusher_loop(rx, sender);
    let mut session = Session::new(connection_id.clone(), tx, state);
    tracing::info!("Connection '{}' opened", connection_id);

    // 受信したフレームはこのループで 1 つずつ処理する（接続内の順序を保つ）
    loop {
        tokio::select! {
            msg = receiver.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => session.handle_text(text.as_str()).await,
                    Some(Ok(Message::Close(_))) | None => {
                        tracing::debug!("Connection '{}' requested close", connection_id);
                        break;
                    }
                    Some(Ok(Message::Ping(_))) => {
                        // Ping/pong is handled automatically by the WebSocket protocol
                        tracing::trace!("Received ping from '{}'", connection_id);
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        tracing::warn!("WebSocket error on '{}': {}", connection_id, e);
                        break;
                    }
                }
            }
            _ = &mut send_task => break,
        }
    }

    session.close().await;
    drop(session);
    send_task.abort();
    tracing::info!("Connection '{}' closed", connection_id);
}
