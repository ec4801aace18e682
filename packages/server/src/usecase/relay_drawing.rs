//! UseCase: 描画イベントの中継
//!
//! - `draw-start` / `draw-move`: 永続化せずに中継（プレビュー）
//! - `draw-end`: stroke として履歴に追記してから中継
//! - `clear-canvas`: clear として履歴に追記してから中継
//!
//! 追記と中継は独立した結果です。追記に失敗しても中継は必ず行います。

use std::sync::Arc;

use rakugaki_shared::time::Clock;

use crate::domain::{
    ConnectionId, DrawingCommand, RoomId, RoomRegistry, RoomRepository, Stroke, Timestamp,
};

/// 描画中継のユースケース
pub struct RelayDrawingUseCase {
    repository: Arc<dyn RoomRepository>,
    registry: Arc<dyn RoomRegistry>,
    clock: Arc<dyn Clock>,
}

impl RelayDrawingUseCase {
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        registry: Arc<dyn RoomRegistry>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            registry,
            clock,
        }
    }

    /// 描画途中のプレビューを中継する（永続化しない）
    pub async fn relay_preview(
        &self,
        room_id: &RoomId,
        author: &ConnectionId,
        message: &str,
    ) -> usize {
        self.registry
            .broadcast_except(room_id, author, message)
            .await
    }

    /// 確定した stroke を追記して中継する
    ///
    /// # Returns
    ///
    /// 中継できた接続数
    pub async fn commit_stroke(
        &self,
        room_id: &RoomId,
        author: &ConnectionId,
        stroke: Stroke,
        message: &str,
    ) -> usize {
        let command = DrawingCommand::stroke(author.clone(), stroke, self.now());
        self.persist(room_id, command).await;
        self.registry
            .broadcast_except(room_id, author, message)
            .await
    }

    /// clear を追記して中継する
    pub async fn clear_canvas(
        &self,
        room_id: &RoomId,
        author: &ConnectionId,
        message: &str,
    ) -> usize {
        let command = DrawingCommand::clear(author.clone(), self.now());
        self.persist(room_id, command).await;
        self.registry
            .broadcast_except(room_id, author, message)
            .await
    }

    async fn persist(&self, room_id: &RoomId, command: DrawingCommand) {
        let kind = command.kind().as_str();
        if let Err(e) = self
            .repository
            .append_drawing_command(room_id, command)
            .await
        {
            tracing::warn!(
                "Failed to persist {} command for room '{}': {}",
                kind,
                room_id,
                e
            );
        }
    }

    fn now(&self) -> Timestamp {
        Timestamp::new(self.clock.now_millis())
    }
}
