//! UseCase: カーソル移動
//!
//! カーソル位置は best-effort で保存し（失敗はログのみ）、送信者以外へ中継します。

use std::sync::Arc;

use crate::domain::{ConnectionId, RoomId, RoomRegistry, RoomRepository};

pub struct MoveCursorUseCase {
    repository: Arc<dyn RoomRepository>,
    registry: Arc<dyn RoomRegistry>,
}

impl MoveCursorUseCase {
    pub fn new(repository: Arc<dyn RoomRepository>, registry: Arc<dyn RoomRegistry>) -> Self {
        Self {
            repository,
            registry,
        }
    }

    pub async fn execute(
        &self,
        room_id: &RoomId,
        connection_id: &ConnectionId,
        x: f64,
        y: f64,
        message: &str,
    ) -> usize {
        if let Err(e) = self
            .repository
            .update_cursor(room_id, connection_id, x, y)
            .await
        {
            tracing::warn!(
                "Failed to update cursor of '{}' in room '{}': {}",
                connection_id,
                room_id,
                e
            );
        }

        self.registry
            .broadcast_except(room_id, connection_id, message)
            .await
    }
}
