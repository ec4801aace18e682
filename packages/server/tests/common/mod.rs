//! Helpers shared by the integration tests.

#![allow(dead_code)]

use std::{sync::Arc, time::Duration};

use futures_util::{SinkExt, StreamExt};
use rakugaki_server::{
    domain::{RoomIdGenerator, RoomRepository},
    infrastructure::{registry::ChannelRoomRegistry, repository::InMemoryRoomRepository},
    ui::{AppState, Server},
};
use rakugaki_shared::time::SystemClock;
use serde_json::Value;
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};

/// Server running in a background task on an ephemeral port
pub struct TestServer {
    pub port: u16,
    pub repository: Arc<InMemoryRoomRepository>,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    pub async fn start() -> Self {
        let clock = Arc::new(SystemClock);
        let repository = Arc::new(InMemoryRoomRepository::new(clock.clone()));
        let repository_port: Arc<dyn RoomRepository> = repository.clone();
        let state = Arc::new(AppState::new(
            repository_port,
            Arc::new(ChannelRoomRegistry::new()),
            RoomIdGenerator::new(),
            clock,
        ));

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let port = listener.local_addr().unwrap().port();
        let handle = tokio::spawn(async move {
            Server::new(state).serve(listener).await.unwrap();
        });

        TestServer {
            port,
            repository,
            handle,
        }
    }

    pub fn ws_url(&self) -> String {
        format!("ws://127.0.0.1:{}/ws", self.port)
    }

    pub fn http_url(&self, path: &str) -> String {
        format!("http://127.0.0.1:{}{}", self.port, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// WebSocket client speaking the JSON protocol
pub struct TestClient {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl TestClient {
    pub async fn connect(server: &TestServer) -> Self {
        let (stream, _response) = connect_async(server.ws_url())
            .await
            .expect("Failed to connect");
        TestClient { stream }
    }

    pub async fn send(&mut self, frame: Value) {
        self.stream
            .send(Message::text(frame.to_string()))
            .await
            .expect("Failed to send frame");
    }

    /// Next JSON frame, failing the test after 5 seconds
    pub async fn recv(&mut self) -> Value {
        self.try_recv(Duration::from_secs(5))
            .await
            .expect("Timed out waiting for a frame")
    }

    /// Next JSON frame within `wait`, or `None`
    pub async fn try_recv(&mut self, wait: Duration) -> Option<Value> {
        loop {
            let msg = tokio::time::timeout(wait, self.stream.next()).await.ok()??;
            let msg = msg.expect("WebSocket error");
            if msg.is_text() {
                let text = msg.to_text().expect("Non-UTF8 text frame");
                return Some(serde_json::from_str(text).expect("Invalid JSON frame"));
            }
        }
    }

    /// Join and return the ack
    pub async fn join(&mut self, room_id: &str, ack_id: u64) -> Value {
        self.send(serde_json::json!({"type": "join", "roomId": room_id, "ackId": ack_id}))
            .await;
        let ack = self.recv().await;
        assert_eq!(ack["type"], "ack");
        assert_eq!(ack["ackId"], ack_id);
        ack
    }

    pub async fn close(mut self) {
        let _ = self.stream.close(None).await;
    }
}
