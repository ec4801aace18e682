//! Server execution logic.

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::{
    handler::{fallback, health_check, list_rooms, open_room, room_detail, websocket_handler},
    signal::shutdown_signal,
    state::AppState,
};

/// Collaborative drawing server
///
/// # Example
///
/// ```ignore
/// let state = Arc::new(AppState::new(repository, registry, RoomIdGenerator::new(), clock));
/// Server::new(state).run("127.0.0.1".to_string(), 3001).await?;
/// ```
pub struct Server {
    state: Arc<AppState>,
}

impl Server {
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }

    /// Build the router with all endpoints
    pub fn router(&self) -> Router {
        Router::new()
            // WebSocket エンドポイント
            .route("/ws", get(websocket_handler))
            // HTTP エンドポイント
            .route("/health", get(health_check))
            .route("/api/health", get(health_check))
            .route("/api/room/join", post(open_room))
            .route("/api/rooms", get(list_rooms))
            .route("/api/rooms/{room_id}", get(room_detail))
            .fallback(fallback)
            .layer(CorsLayer::permissive())
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Serve on an already bound listener until a shutdown signal arrives
    pub async fn serve(self, listener: TcpListener) -> std::io::Result<()> {
        let app = self.router();
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
    }

    /// Run the server
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the specified address or
    /// if there's an error during server execution.
    pub async fn run(self, host: String, port: u16) -> Result<(), Box<dyn std::error::Error>> {
        let bind_addr = format!("{}:{}", host, port);
        let listener = TcpListener::bind(&bind_addr).await?;

        tracing::info!("Drawing server listening on {}", listener.local_addr()?);
        tracing::info!("Connect to: ws://{}/ws", bind_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        self.serve(listener).await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}
